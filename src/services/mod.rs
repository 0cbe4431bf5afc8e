pub mod mailer;
pub mod nutrition;
