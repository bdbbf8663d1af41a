use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answers::{Answer, AnswerSnapshot};
use super::{AnswerKey, Question, QuestionKind};

/// Comparison policy for typed answers. The original behavior was ambiguous
/// here, so it is configuration rather than a hard-coded rule.
#[derive(Clone, Copy, Debug)]
pub struct ScorePolicy {
    pub short_answer_case_insensitive: bool,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            short_answer_case_insensitive: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug)]
pub struct Scored {
    pub score: u32,
    pub total: u32,
    pub answered: Vec<AnsweredQuestion>,
}

/// One finished attempt, as persisted. Practice results carry the flag but
/// are produced by the same path as graded ones.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub taken_at: DateTime<Utc>,
    pub score: u32,
    pub total: u32,
    pub is_practice: bool,
    pub answered: Vec<AnsweredQuestion>,
}

/// Scores a completed answer map against the question set. Pure: no hidden
/// state, identical inputs give identical output. Unanswered questions and
/// answers of the wrong shape count as incorrect; checkbox questions get no
/// partial credit.
pub fn score(questions: &[Question], answers: &AnswerSnapshot, policy: ScorePolicy) -> Scored {
    let answered: Vec<AnsweredQuestion> = questions
        .iter()
        .map(|q| {
            let user = answers.get(q.id);
            AnsweredQuestion {
                question: q.prompt.clone(),
                user_answer: user.map(Answer::display).unwrap_or_default(),
                correct_answer: q.key.display(),
                is_correct: user.is_some_and(|a| is_correct(q, a, policy)),
            }
        })
        .collect();

    Scored {
        score: answered.iter().filter(|a| a.is_correct).count() as u32,
        total: questions.len() as u32,
        answered,
    }
}

fn is_correct(question: &Question, answer: &Answer, policy: ScorePolicy) -> bool {
    match (question.kind, &question.key, answer) {
        // Options are chosen, not typed, so the match is exact.
        (QuestionKind::MultipleChoice, AnswerKey::Single(key), Answer::Single(given)) => {
            given == key
        }
        (QuestionKind::ShortAnswer, AnswerKey::Single(key), Answer::Single(given)) => {
            let given = given.trim();
            let key = key.trim();
            if policy.short_answer_case_insensitive {
                given.eq_ignore_ascii_case(key)
            } else {
                given == key
            }
        }
        // Exact set equality; a subset of the correct options is wrong.
        (QuestionKind::Checkbox, AnswerKey::Multi(key), Answer::Multi(given)) => given == key,
        _ => false,
    }
}
