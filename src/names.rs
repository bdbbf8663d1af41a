pub const LOGIN_URL: &str = "/login";
pub const LOGOUT_URL: &str = "/logout";

pub const USER_SESSION_COOKIE_NAME: &str = "user_session";

pub fn quiz_page_url(public_id: &str) -> String {
    format!("/quiz/{public_id}")
}

pub fn delete_quiz_url(public_id: &str) -> String {
    format!("/delete-quiz/{public_id}")
}

pub fn start_attempt_url(public_id: &str) -> String {
    format!("/start-attempt/{public_id}")
}

pub fn attempt_answer_url(token: &str) -> String {
    format!("/attempt/{token}/answer")
}

pub fn attempt_goto_url(token: &str, idx: usize) -> String {
    format!("/attempt/{token}/goto/{idx}")
}

pub fn attempt_submit_url(token: &str) -> String {
    format!("/attempt/{token}/submit")
}

pub fn attempt_remaining_url(token: &str) -> String {
    format!("/attempt/{token}/remaining")
}

pub fn attempt_abandon_url(token: &str) -> String {
    format!("/attempt/{token}/abandon")
}

pub fn results_url(public_id: &str) -> String {
    format!("/results/{public_id}")
}

pub fn result_detail_url(result_id: i64) -> String {
    format!("/result/{result_id}")
}

pub fn new_evaluation_url(student_id: i64) -> String {
    format!("/evaluation/new/{student_id}")
}

pub fn evaluation_draft_url(token: &str) -> String {
    format!("/evaluation/draft/{token}")
}

pub fn evaluation_score_url(token: &str) -> String {
    format!("/evaluation/draft/{token}/score")
}

pub fn evaluation_note_url(token: &str) -> String {
    format!("/evaluation/draft/{token}/note")
}

pub fn evaluation_rating_url(token: &str) -> String {
    format!("/evaluation/draft/{token}/rating")
}

pub fn evaluation_save_url(token: &str) -> String {
    format!("/evaluation/draft/{token}/save")
}

pub fn evaluation_view_url(evaluation_id: i64) -> String {
    format!("/evaluation/{evaluation_id}")
}

// Roles stored on the users table.
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";

// Question kinds as stored in the questions table.
pub const KIND_MULTIPLE_CHOICE: &str = "multiple-choice";
pub const KIND_CHECKBOX: &str = "checkbox";
pub const KIND_SHORT_ANSWER: &str = "short-answer";

// Evaluation criteria every new draft starts with.
pub const DEFAULT_CRITERIA: &[&str] = &[
    "Participation",
    "Technical skills",
    "Communication",
    "Autonomy",
];

pub const MIN_CRITERION_SCORE: i64 = 1;
pub const MAX_CRITERION_SCORE: i64 = 5;

/// Debounce window between a score change and the AI note request.
pub const NOTE_SUGGEST_DEBOUNCE_MS: u64 = 500;
