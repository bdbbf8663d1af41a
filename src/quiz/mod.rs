// Quiz attempt core: answer store, countdown, scoring, attempt runner.

pub mod answers;
pub mod runner;
pub mod score;
pub mod timer;

use std::collections::BTreeSet;

use crate::names;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QuestionKind {
    MultipleChoice,
    Checkbox,
    ShortAnswer,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => names::KIND_MULTIPLE_CHOICE,
            QuestionKind::Checkbox => names::KIND_CHECKBOX,
            QuestionKind::ShortAnswer => names::KIND_SHORT_ANSWER,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            names::KIND_MULTIPLE_CHOICE => Some(QuestionKind::MultipleChoice),
            names::KIND_CHECKBOX => Some(QuestionKind::Checkbox),
            names::KIND_SHORT_ANSWER => Some(QuestionKind::ShortAnswer),
            _ => None,
        }
    }
}

/// The correct answer, tagged by shape so the scoring engine can switch
/// deterministically instead of guessing from an untyped value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerKey {
    Single(String),
    Multi(BTreeSet<String>),
}

impl AnswerKey {
    pub fn display(&self) -> String {
        match self {
            AnswerKey::Single(s) => s.clone(),
            AnswerKey::Multi(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Question {
    pub id: i64,
    pub prompt: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub key: AnswerKey,
}

#[derive(Clone, Debug)]
pub struct QuizData {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub time_limit_minutes: Option<u32>,
    pub shuffle_questions: bool,
    pub shuffle_answers: bool,
    pub questions: Vec<Question>,
}

impl QuizData {
    pub fn question(&self, id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}
