use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    extractors::AdminGuard,
    handlers::hx_redirect,
    models::QuizImport,
    rejections::{AppError, ResultExt},
    AppState,
};

/// Admin quiz upload. The payload is the editor's JSON export: questions
/// with type, options, and answer key.
pub(crate) async fn create_quiz(
    AdminGuard(_user): AdminGuard,
    State(state): State<AppState>,
    Json(import): Json<QuizImport>,
) -> Result<axum::response::Response, AppError> {
    if import.name.trim().is_empty() {
        return Err(AppError::Input("quiz name must not be empty"));
    }

    let public_id = state
        .db
        .load_quiz(import)
        .await
        .reject_input("could not create quiz")?;

    Ok(hx_redirect(&crate::names::quiz_page_url(&public_id)))
}

pub(crate) async fn delete_quiz(
    AdminGuard(_user): AdminGuard,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    state
        .db
        .delete_quiz(&public_id)
        .await
        .reject("could not delete quiz")?;

    Ok(hx_redirect("/"))
}
