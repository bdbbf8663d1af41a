use axum::extract::{Path, State};
use maud::Markup;

use crate::{
    extractors::{AuthGuard, IsHtmx},
    rejections::{AppError, OptionExt, ResultExt},
    views,
    views::quiz as quiz_views,
    AppState,
};

pub(crate) async fn results_list(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Path(public_id): Path<String>,
) -> Result<Markup, AppError> {
    let header = state
        .db
        .quiz_header(&public_id)
        .await
        .reject("could not get quiz")?
        .or_not_found()?;

    let results = state
        .db
        .results_for(header.id, user.id)
        .await
        .reject("could not get results")?;

    let body = quiz_views::results_list(quiz_views::ResultsListData {
        quiz_name: header.name,
        public_id,
        results,
    });

    Ok(views::render(is_htmx, "Results", body))
}

pub(crate) async fn result_detail(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Path(result_id): Path<i64>,
) -> Result<Markup, AppError> {
    let row = state
        .db
        .get_result(result_id)
        .await
        .reject("could not get result")?
        .or_not_found()?;

    // Students only see their own results.
    if row.user_id != user.id && !user.is_admin() {
        return Err(AppError::Unauthorized);
    }

    let header = state
        .db
        .quiz_header_by_id(row.quiz_id)
        .await
        .reject("could not get quiz")?
        .or_not_found()?;

    let result = row
        .into_quiz_result()
        .reject("could not decode stored result")?;

    let body = quiz_views::result_detail(quiz_views::ResultDetailData {
        quiz_name: header.name,
        public_id: header.public_id,
        result,
    });

    Ok(views::render(is_htmx, "Result", body))
}
