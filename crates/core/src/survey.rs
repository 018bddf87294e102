//! Survey rules: question definitions, answer checking and result tallies.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Timestamp;
use crate::validation::{check_transition, validate_one_of};

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_CLOSED: &str = "closed";

pub const VALID_STATUSES: &[&str] = &[STATUS_DRAFT, STATUS_ACTIVE, STATUS_CLOSED];

pub const QUESTION_SINGLE_CHOICE: &str = "single_choice";
pub const QUESTION_MULTIPLE_CHOICE: &str = "multiple_choice";
pub const QUESTION_RATING: &str = "rating";
pub const QUESTION_YES_NO: &str = "yes_no";
pub const QUESTION_TEXT: &str = "text";

pub const VALID_QUESTION_KINDS: &[&str] = &[
    QUESTION_SINGLE_CHOICE,
    QUESTION_MULTIPLE_CHOICE,
    QUESTION_RATING,
    QUESTION_YES_NO,
    QUESTION_TEXT,
];

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
pub const MAX_QUESTION_TEXT: usize = 500;
pub const MAX_TEXT_ANSWER: usize = 2000;

/// A question embedded in a survey's `questions` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier used as the key in answer maps.
    pub key: String,
    pub text: String,
    pub kind: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl Question {
    fn is_choice(&self) -> bool {
        matches!(
            self.kind.as_str(),
            QUESTION_SINGLE_CHOICE | QUESTION_MULTIPLE_CHOICE
        )
    }
}

/// One respondent's answers, keyed by question key.
pub type Answers = BTreeMap<String, Value>;

/// Validate a survey's question list.
pub fn validate_questions(questions: &[Question]) -> Result<(), String> {
    let mut keys = HashSet::new();
    for q in questions {
        if q.key.trim().is_empty() {
            return Err("Question keys must not be empty".to_string());
        }
        if !keys.insert(q.key.as_str()) {
            return Err(format!("Duplicate question key '{}'", q.key));
        }
        let text_len = q.text.trim().chars().count();
        if text_len == 0 || text_len > MAX_QUESTION_TEXT {
            return Err(format!(
                "Question '{}' text must be 1..={MAX_QUESTION_TEXT} characters",
                q.key
            ));
        }
        validate_one_of("question kind", &q.kind, VALID_QUESTION_KINDS)?;

        if q.is_choice() {
            let distinct: HashSet<&str> = q.options.iter().map(String::as_str).collect();
            if distinct.len() < 2 || distinct.len() != q.options.len() {
                return Err(format!(
                    "Question '{}' needs at least two distinct options",
                    q.key
                ));
            }
            if q.options.iter().any(|o| o.trim().is_empty()) {
                return Err(format!("Question '{}' has an empty option", q.key));
            }
        } else if !q.options.is_empty() {
            return Err(format!(
                "Question '{}' of kind {} does not take options",
                q.key, q.kind
            ));
        }
    }
    Ok(())
}

fn check_answer(q: &Question, value: &Value) -> Result<(), String> {
    let bad = || format!("Invalid answer for question '{}' ({})", q.key, q.kind);
    match q.kind.as_str() {
        QUESTION_SINGLE_CHOICE => {
            let choice = value.as_str().ok_or_else(bad)?;
            if !q.options.iter().any(|o| o == choice) {
                return Err(bad());
            }
        }
        QUESTION_MULTIPLE_CHOICE => {
            let items = value.as_array().ok_or_else(bad)?;
            if items.is_empty() {
                return Err(bad());
            }
            let mut seen = HashSet::new();
            for item in items {
                let choice = item.as_str().ok_or_else(bad)?;
                if !q.options.iter().any(|o| o == choice) || !seen.insert(choice) {
                    return Err(bad());
                }
            }
        }
        QUESTION_RATING => {
            let rating = value.as_i64().ok_or_else(bad)?;
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(bad());
            }
        }
        QUESTION_YES_NO => {
            value.as_bool().ok_or_else(bad)?;
        }
        QUESTION_TEXT => {
            let text = value.as_str().ok_or_else(bad)?;
            let len = text.trim().chars().count();
            if len == 0 || len > MAX_TEXT_ANSWER {
                return Err(bad());
            }
        }
        _ => return Err(bad()),
    }
    Ok(())
}

/// Validate a response against the survey's questions.
pub fn validate_answers(questions: &[Question], answers: &Answers) -> Result<(), String> {
    if let Some(unknown) = answers
        .keys()
        .find(|key| !questions.iter().any(|q| &q.key == *key))
    {
        return Err(format!("Unknown question key '{unknown}'"));
    }
    for q in questions {
        match answers.get(&q.key) {
            None | Some(Value::Null) => {
                if q.required {
                    return Err(format!("Question '{}' is required", q.key));
                }
            }
            Some(value) => check_answer(q, value)?,
        }
    }
    Ok(())
}

/// Whether a survey takes responses at `now`.
pub fn accepts_responses(
    status: &str,
    starts_at: Timestamp,
    ends_at: Timestamp,
    now: Timestamp,
) -> Result<(), String> {
    if status != STATUS_ACTIVE {
        return Err(format!("Survey is {status}, not active"));
    }
    if now < starts_at {
        return Err("Survey has not started yet".to_string());
    }
    if now > ends_at {
        return Err("Survey has already ended".to_string());
    }
    Ok(())
}

/// Validate the response window.
pub fn validate_window(starts_at: Timestamp, ends_at: Timestamp) -> Result<(), String> {
    if ends_at <= starts_at {
        return Err("Survey must end after it starts".to_string());
    }
    Ok(())
}

pub mod state_machine {
    use super::*;

    pub fn valid_transitions(from: &str) -> &'static [&'static str] {
        match from {
            STATUS_DRAFT => &[STATUS_ACTIVE],
            STATUS_ACTIVE => &[STATUS_CLOSED],
            _ => &[],
        }
    }

    pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
        check_transition("survey", valid_transitions(from), from, to)
    }
}

/// Publishing a survey needs at least one question.
pub fn validate_publish(questions: &[Question]) -> Result<(), String> {
    if questions.is_empty() {
        return Err("A survey needs at least one question before publishing".to_string());
    }
    validate_questions(questions)
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Aggregated answers for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub key: String,
    pub text: String,
    pub kind: String,
    /// Number of responses that answered this question.
    pub answered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_counts: Option<BTreeMap<String, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyResults {
    pub total_responses: usize,
    pub questions: Vec<QuestionResult>,
}

/// Tally stored responses per question.
///
/// Answers that no longer match their question are skipped rather than
/// failing the whole report.
pub fn tally(questions: &[Question], responses: &[Answers]) -> SurveyResults {
    let results = questions
        .iter()
        .map(|q| {
            let values: Vec<&Value> = responses
                .iter()
                .filter_map(|r| r.get(&q.key))
                .filter(|v| !v.is_null() && check_answer(q, v).is_ok())
                .collect();

            let mut option_counts = None;
            let mut average = None;
            match q.kind.as_str() {
                QUESTION_SINGLE_CHOICE | QUESTION_MULTIPLE_CHOICE => {
                    let mut counts: BTreeMap<String, usize> =
                        q.options.iter().map(|o| (o.clone(), 0)).collect();
                    for v in &values {
                        let chosen: Vec<&str> = match v {
                            Value::String(s) => vec![s.as_str()],
                            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                            _ => Vec::new(),
                        };
                        for c in chosen {
                            if let Some(n) = counts.get_mut(c) {
                                *n += 1;
                            }
                        }
                    }
                    option_counts = Some(counts);
                }
                QUESTION_YES_NO => {
                    let yes = values.iter().filter(|v| v.as_bool() == Some(true)).count();
                    let counts =
                        BTreeMap::from([("yes".to_string(), yes), ("no".to_string(), values.len() - yes)]);
                    option_counts = Some(counts);
                }
                QUESTION_RATING => {
                    let ratings: Vec<i64> = values.iter().filter_map(|v| v.as_i64()).collect();
                    if !ratings.is_empty() {
                        let sum: i64 = ratings.iter().sum();
                        average = Some(sum as f64 / ratings.len() as f64);
                    }
                }
                _ => {}
            }

            QuestionResult {
                key: q.key.clone(),
                text: q.text.clone(),
                kind: q.kind.clone(),
                answered: values.len(),
                option_counts,
                average,
            }
        })
        .collect();

    SurveyResults {
        total_responses: responses.len(),
        questions: results,
    }
}
