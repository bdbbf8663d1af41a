// Database model structs, deserialized from rows via `libsql::de`.

use color_eyre::Result;
use serde::Deserialize;

use crate::names;
use crate::quiz::score::{AnsweredQuestion, QuizResult};

#[derive(Clone, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == names::ROLE_ADMIN
    }
}

#[derive(Deserialize)]
pub struct StudentRow {
    pub id: i64,
    pub email: String,
    pub display_name: String,
}

#[derive(Deserialize)]
pub struct QuizRow {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub time_limit_minutes: Option<i64>,
    pub shuffle_questions: i64,
    pub shuffle_answers: i64,
}

#[derive(Deserialize)]
pub struct QuizListRow {
    pub public_id: String,
    pub name: String,
    pub question_count: i64,
    pub time_limit_minutes: Option<i64>,
}

#[derive(Deserialize)]
pub struct QuestionRow {
    pub id: i64,
    pub kind: String,
    pub question: String,
    pub short_answer: Option<String>,
}

#[derive(Deserialize)]
pub struct OptionRow {
    pub question_id: i64,
    pub option: String,
    pub is_answer: i64,
}

#[derive(Deserialize)]
pub struct ResultRow {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub taken_at: String,
    pub score: i64,
    pub total: i64,
    pub is_practice: i64,
    pub details: String,
}

impl ResultRow {
    pub fn into_quiz_result(self) -> Result<QuizResult> {
        let answered: Vec<AnsweredQuestion> = serde_json::from_str(&self.details)?;
        Ok(QuizResult {
            taken_at: self.taken_at.parse()?,
            score: self.score as u32,
            total: self.total as u32,
            is_practice: self.is_practice != 0,
            answered,
        })
    }
}

#[derive(Deserialize)]
pub struct ResultSummaryRow {
    pub id: i64,
    pub taken_at: String,
    pub score: i64,
    pub total: i64,
    pub is_practice: i64,
}

#[derive(Deserialize)]
pub struct EvaluationRow {
    pub id: i64,
    pub student_id: i64,
    pub author_id: i64,
    pub created_at: String,
    pub overall_rating: Option<i64>,
}

#[derive(Deserialize)]
pub struct CriterionRow {
    pub name: String,
    pub score: Option<i64>,
    pub note: String,
    pub note_owner: String,
}
