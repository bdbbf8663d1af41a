mod attempt;
mod crud;
mod results;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    db::{models::AuthUser, Db},
    quiz::runner::AttemptRunner,
    rejections::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create-quiz", post(crud::create_quiz))
        .route("/delete-quiz/{public_id}", post(crud::delete_quiz))
        .route("/quiz/{public_id}", get(attempt::quiz_page))
        .route("/start-attempt/{public_id}", post(attempt::start_attempt))
        .route("/attempt/{token}", get(attempt::question_page))
        .route("/attempt/{token}/answer", post(attempt::submit_answer))
        .route("/attempt/{token}/goto/{idx}", get(attempt::goto_question))
        .route("/attempt/{token}/submit", post(attempt::submit_attempt))
        .route("/attempt/{token}/remaining", get(attempt::remaining))
        .route("/attempt/{token}/abandon", post(attempt::abandon))
        .route("/results/{public_id}", get(results::results_list))
        .route("/result/{result_id}", get(results::result_detail))
}

/// Look up a live attempt and make sure it belongs to the caller.
fn find_attempt(
    state: &AppState,
    user: &AuthUser,
    token: &str,
) -> Result<Arc<AttemptRunner<Db>>, AppError> {
    let attempts = state.attempts.lock().unwrap();
    let runner = attempts.get(token).cloned().ok_or(AppError::NotFound)?;
    if runner.user_id() != user.id {
        return Err(AppError::Unauthorized);
    }
    Ok(runner)
}

fn remove_attempt(state: &AppState, token: &str) {
    state.attempts.lock().unwrap().remove(token);
}
