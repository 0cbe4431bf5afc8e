pub mod meals;
pub mod prediction;
pub mod questionnaire;
pub mod vitamins;
