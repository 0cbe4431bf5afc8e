//! Questionnaire schema, validation and follow-up activation.
//!
//! The wire format is camelCase and mirrors what the SPA builder sends:
//! questions carry options, an optional legacy single follow-up, a list
//! of trigger-based follow-ups, and sub-questions for `group` questions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "radio")]
    Radio,
    #[serde(rename = "checkbox")]
    Checkbox,
    #[serde(rename = "radio|text")]
    RadioText,
    #[serde(rename = "group")]
    Group,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Number => "number",
            QuestionType::Radio => "radio",
            QuestionType::Checkbox => "checkbox",
            QuestionType::RadioText => "radio|text",
            QuestionType::Group => "group",
        }
    }

    /// Choice types must carry at least one option.
    pub fn needs_options(&self) -> bool {
        matches!(
            self,
            QuestionType::Radio | QuestionType::Checkbox | QuestionType::RadioText
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub option: String,
    #[serde(rename = "type", default = "default_option_type")]
    pub kind: String,
}

fn default_option_type() -> String {
    "radio".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub trigger_answer: String,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

/// Sub-question inside a `group` question; text and number only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    /// Legacy single follow-up kept for old questionnaires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_question: Option<FollowUpQuestion>,
    #[serde(default)]
    pub follow_up_questions: Vec<FollowUpQuestion>,
    #[serde(default)]
    pub questions: Vec<SubQuestion>,
}

/// One recorded answer. `question_index` is mixed on the wire: a number
/// for main questions, `"{i}_followUp_{j}"` for follow-up answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub question_index: Value,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    pub answer: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_follow_up: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_question_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_question_id: Option<String>,
}

impl AnswerRecord {
    pub fn is_follow_up(&self) -> bool {
        self.is_follow_up.unwrap_or(false)
    }
}

/// A main answer with its follow-up answers attached by parent index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedAnswer {
    #[serde(flatten)]
    pub main: AnswerRecord,
    pub follow_ups: Vec<AnswerRecord>,
}

/// Validates a questionnaire body the way the SPA builder does before
/// submit; returns every problem found rather than the first one.
pub fn validate_questions(name: &str, questions: &[Question]) -> Vec<String> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push("Questionnaire name is required".to_string());
    }

    if questions.is_empty() {
        errors.push("At least one question is required".to_string());
        return errors;
    }

    for (index, question) in questions.iter().enumerate() {
        let qnum = index + 1;
        if question.question.trim().is_empty() {
            errors.push(format!("Question {qnum} text is required"));
        }

        if question.kind.needs_options() {
            if question.options.is_empty() {
                errors.push(format!("Question {qnum} requires at least one option"));
            } else {
                for (oi, option) in question.options.iter().enumerate() {
                    if option.option.trim().is_empty() {
                        errors.push(format!(
                            "Question {qnum}, Option {} text is required",
                            oi + 1
                        ));
                    }
                }
            }
        }

        for (fi, follow_up) in question.follow_up_questions.iter().enumerate() {
            let fnum = fi + 1;
            if follow_up.question.trim().is_empty() {
                errors.push(format!("Question {qnum}, Follow-up {fnum} text is required"));
            }
            if follow_up.trigger_answer.trim().is_empty() {
                errors.push(format!(
                    "Question {qnum}, Follow-up {fnum} trigger answer is required"
                ));
            }
            if follow_up.kind.needs_options() {
                if follow_up.options.is_empty() {
                    errors.push(format!(
                        "Question {qnum}, Follow-up {fnum} requires at least one option"
                    ));
                } else {
                    for (oi, option) in follow_up.options.iter().enumerate() {
                        if option.option.trim().is_empty() {
                            errors.push(format!(
                                "Question {qnum}, Follow-up {fnum}, Option {} text is required",
                                oi + 1
                            ));
                        }
                    }
                }
            }
        }
    }

    errors
}

/// Whether an answer to `question` activates a follow-up with the given
/// trigger value. Matching depends on the question type:
/// radio / radio|text compare the selected option, checkbox checks
/// membership, text compares strings, number compares numerically.
pub fn follow_up_active(question: &Question, answer: &Value, trigger: &str) -> bool {
    match question.kind {
        QuestionType::Radio => answer.as_str() == Some(trigger),
        QuestionType::RadioText => answer
            .get("option")
            .and_then(Value::as_str)
            .map(|selected| selected == trigger)
            .unwrap_or(false),
        QuestionType::Checkbox => answer
            .as_array()
            .map(|selected| selected.iter().any(|v| v.as_str() == Some(trigger)))
            .unwrap_or(false),
        QuestionType::Text => match answer {
            Value::String(s) => s == trigger,
            other => other.to_string() == trigger,
        },
        QuestionType::Number => {
            let value = match answer {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            match (value, trigger.parse::<f64>().ok()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        QuestionType::Group => false,
    }
}

/// Indices of the follow-up questions activated by `answer`.
pub fn active_follow_ups(question: &Question, answer: &Value) -> Vec<usize> {
    question
        .follow_up_questions
        .iter()
        .enumerate()
        .filter(|(_, follow_up)| follow_up_active(question, answer, &follow_up.trigger_answer))
        .map(|(index, _)| index)
        .collect()
}

/// Groups follow-up answers under their parent answer by
/// `parentQuestionIndex`. Follow-ups without a recorded parent are kept
/// as top-level entries rather than dropped.
pub fn group_by_parent(records: &[AnswerRecord]) -> Vec<GroupedAnswer> {
    let mut grouped: Vec<GroupedAnswer> = Vec::new();

    for record in records {
        if record.is_follow_up() {
            let parent = record.parent_question_index.and_then(|parent_index| {
                grouped
                    .iter_mut()
                    .find(|g| g.main.question_index.as_i64() == Some(parent_index))
            });
            match parent {
                Some(parent) => parent.follow_ups.push(record.clone()),
                None => grouped.push(GroupedAnswer {
                    main: record.clone(),
                    follow_ups: Vec::new(),
                }),
            }
        } else {
            grouped.push(GroupedAnswer {
                main: record.clone(),
                follow_ups: Vec::new(),
            });
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn radio_question(trigger: &str) -> Question {
        Question {
            question: "Do you smoke?".to_string(),
            kind: QuestionType::Radio,
            options: vec![
                AnswerOption {
                    option: "Yes".to_string(),
                    kind: "radio".to_string(),
                },
                AnswerOption {
                    option: "No".to_string(),
                    kind: "radio".to_string(),
                },
            ],
            follow_up_question: None,
            follow_up_questions: vec![FollowUpQuestion {
                question: "How many per day?".to_string(),
                kind: QuestionType::Number,
                trigger_answer: trigger.to_string(),
                options: vec![],
            }],
            questions: vec![],
        }
    }

    #[test]
    fn question_type_round_trips_pipe_variant() {
        let kind: QuestionType = serde_json::from_str(r#""radio|text""#).unwrap();
        assert_eq!(kind, QuestionType::RadioText);
        assert_eq!(serde_json::to_string(&kind).unwrap(), r#""radio|text""#);
    }

    #[test]
    fn radio_follow_up_activates_on_trigger() {
        let question = radio_question("Yes");
        assert_eq!(active_follow_ups(&question, &json!("Yes")), vec![0]);
        assert!(active_follow_ups(&question, &json!("No")).is_empty());
    }

    #[test]
    fn checkbox_follow_up_checks_membership() {
        let mut question = radio_question("Headache");
        question.kind = QuestionType::Checkbox;
        assert!(follow_up_active(
            &question,
            &json!(["Nausea", "Headache"]),
            "Headache"
        ));
        assert!(!follow_up_active(&question, &json!(["Nausea"]), "Headache"));
    }

    #[test]
    fn radio_text_follow_up_reads_selected_option() {
        let mut question = radio_question("Other");
        question.kind = QuestionType::RadioText;
        let answer = json!({"option": "Other", "text": "twice a week"});
        assert!(follow_up_active(&question, &answer, "Other"));
        assert!(!follow_up_active(&question, &answer, "Never"));
    }

    #[test]
    fn number_follow_up_compares_numerically() {
        let mut question = radio_question("3");
        question.kind = QuestionType::Number;
        assert!(follow_up_active(&question, &json!(3), "3"));
        assert!(follow_up_active(&question, &json!("3.0"), "3"));
        assert!(!follow_up_active(&question, &json!(4), "3"));
    }

    #[test]
    fn validation_flags_missing_options_and_triggers() {
        let mut question = radio_question("Yes");
        question.options.clear();
        question.follow_up_questions[0].trigger_answer = " ".to_string();

        let errors = validate_questions("Intake", &[question]);
        assert!(errors.iter().any(|e| e.contains("requires at least one option")));
        assert!(errors.iter().any(|e| e.contains("trigger answer is required")));
    }

    #[test]
    fn validation_accepts_well_formed_questionnaire() {
        let errors = validate_questions("Intake", &[radio_question("Yes")]);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn grouping_attaches_follow_ups_to_parent() {
        let records = vec![
            AnswerRecord {
                question_id: None,
                question_index: json!(0),
                question: "Do you smoke?".to_string(),
                question_type: Some("radio".to_string()),
                answer: json!("Yes"),
                is_follow_up: None,
                parent_question_index: None,
                parent_question_id: None,
            },
            AnswerRecord {
                question_id: None,
                question_index: json!("0_followUp_0"),
                question: "How many per day?".to_string(),
                question_type: Some("number".to_string()),
                answer: json!(5),
                is_follow_up: Some(true),
                parent_question_index: Some(0),
                parent_question_id: None,
            },
            AnswerRecord {
                question_id: None,
                question_index: json!(1),
                question: "Age".to_string(),
                question_type: Some("number".to_string()),
                answer: json!(34),
                is_follow_up: None,
                parent_question_index: None,
                parent_question_id: None,
            },
        ];

        let grouped = group_by_parent(&records);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].follow_ups.len(), 1);
        assert_eq!(grouped[0].follow_ups[0].answer, json!(5));
        assert!(grouped[1].follow_ups.is_empty());
    }
}
