use std::collections::BTreeSet;

use serde::Deserialize;

use crate::names;

/// Quiz upload payload, as produced by the admin quiz editor.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizImport {
    pub name: String,
    /// Minutes; absent means the quiz is untimed.
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub shuffle_questions: bool,
    #[serde(default)]
    pub shuffle_answers: bool,
    pub questions: Vec<QuestionImport>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionImport {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: AnswerValue,
}

/// The `answer` field is a single string for single-answer kinds and a list
/// of strings for checkbox questions.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    One(String),
    Many(Vec<String>),
}

impl QuestionImport {
    pub fn validate(&self) -> Result<(), &'static str> {
        match self.kind.as_str() {
            names::KIND_MULTIPLE_CHOICE => match &self.answer {
                AnswerValue::One(a) if self.options.contains(a) => Ok(()),
                AnswerValue::One(_) => Err("multiple-choice answer is not one of the options"),
                AnswerValue::Many(_) => Err("multiple-choice answer must be a single string"),
            },
            names::KIND_CHECKBOX => match &self.answer {
                AnswerValue::Many(list) if !list.is_empty() => {
                    if list.iter().all(|a| self.options.contains(a)) {
                        Ok(())
                    } else {
                        Err("checkbox answer contains an unknown option")
                    }
                }
                AnswerValue::Many(_) => Err("checkbox answer must not be empty"),
                AnswerValue::One(_) => Err("checkbox answer must be a list"),
            },
            names::KIND_SHORT_ANSWER => match &self.answer {
                AnswerValue::One(a) if !a.trim().is_empty() => Ok(()),
                AnswerValue::One(_) => Err("short-answer key must not be blank"),
                AnswerValue::Many(_) => Err("short-answer key must be a single string"),
            },
            _ => Err("unknown question type"),
        }
    }

    /// The correct answers as a set, regardless of shape.
    pub fn answer_set(&self) -> BTreeSet<String> {
        match &self.answer {
            AnswerValue::One(a) => BTreeSet::from([a.clone()]),
            AnswerValue::Many(list) => list.iter().cloned().collect(),
        }
    }
}
