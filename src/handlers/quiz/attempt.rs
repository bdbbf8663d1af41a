use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use maud::Markup;

use super::{find_attempt, remove_attempt};
use crate::{
    db::Db,
    extractors::{AuthGuard, IsHtmx},
    handlers::hx_redirect,
    names,
    quiz::answers::Answer,
    quiz::runner::{AttemptRunner, Phase, SubmitOutcome, SubmitTrigger},
    quiz::score::ScorePolicy,
    quiz::QuestionKind,
    rejections::{AppError, OptionExt, ResultExt},
    views,
    views::quiz as quiz_views,
    AppState,
};

pub(crate) async fn quiz_page(
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

    let total_questions = state
        .db
        .questions_count(&public_id)
        .await
        .reject("could not get question count")?;

    let prior = state
        .db
        .prior_graded_result(header.id, user.id)
        .await
        .reject("could not check prior attempts")?;

    let body = quiz_views::start_page(quiz_views::StartPageData {
        quiz_name: header.name,
        public_id,
        total_questions,
        time_limit_minutes: header.time_limit_minutes,
        graded_done: prior.is_some(),
        is_admin: user.is_admin(),
    });

    Ok(views::render(is_htmx, "Quiz", body))
}

pub(crate) async fn start_attempt(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    body: axum::body::Bytes,
) -> Result<Markup, AppError> {
    let fields = parse_form(&body)?;
    let mut practice = fields.iter().any(|(k, v)| k == "practice" && !v.is_empty());

    let quiz = state
        .db
        .get_quiz(&public_id)
        .await
        .reject("could not get quiz")?
        .or_not_found()?;

    if quiz.questions.is_empty() {
        return Err(AppError::Input("quiz has no questions"));
    }

    // One graded attempt per student; later runs fall back to practice.
    // Admins may redo graded attempts.
    if !practice && !user.is_admin() {
        let prior = state
            .db
            .prior_graded_result(quiz.id, user.id)
            .await
            .reject("could not check prior attempts")?;
        if prior.is_some() {
            tracing::info!(
                "graded attempt already exists for quiz={public_id} user={}; running as practice",
                user.id
            );
            practice = true;
        }
    }

    let runner = AttemptRunner::start(
        quiz,
        user.id,
        practice,
        ScorePolicy::default(),
        state.db.clone(),
    );
    let token = runner.token().to_string();
    state
        .attempts
        .lock()
        .unwrap()
        .insert(token.clone(), Arc::clone(&runner));

    Ok(views::titled("Quiz", question_markup(&runner)))
}

pub(crate) async fn question_page(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Path(token): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let runner = find_attempt(&state, &user, &token)?;

    if let Some(page) = settled_response(&state, &runner) {
        return Ok(page);
    }

    Ok(views::render(is_htmx, "Quiz", question_markup(&runner)).into_response())
}

pub(crate) async fn goto_question(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path((token, idx)): Path<(String, usize)>,
) -> Result<axum::response::Response, AppError> {
    let runner = find_attempt(&state, &user, &token)?;

    if let Some(page) = settled_response(&state, &runner) {
        return Ok(page);
    }

    runner.goto(idx);
    Ok(views::titled("Quiz", question_markup(&runner)).into_response())
}

/// Form-encoded answer body. Radio buttons send `option`, checkboxes repeat
/// `options`, short answers send `text`; serde form decoding cannot express
/// the repeated key, so the body is parsed by hand.
pub(crate) async fn submit_answer(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: axum::body::Bytes,
) -> Result<axum::response::Response, AppError> {
    let runner = find_attempt(&state, &user, &token)?;

    if let Some(page) = settled_response(&state, &runner) {
        return Ok(page);
    }

    let fields = parse_form(&body)?;
    let (_, question, _) = runner.current_question();

    let answer = match question.kind {
        QuestionKind::MultipleChoice => fields
            .iter()
            .find(|(k, _)| k == "option")
            .map(|(_, v)| Answer::Single(v.clone())),
        QuestionKind::ShortAnswer => fields
            .iter()
            .find(|(k, _)| k == "text")
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(_, v)| Answer::Single(v.clone())),
        QuestionKind::Checkbox => {
            let selected: BTreeSet<String> = fields
                .iter()
                .filter(|(k, _)| k == "options")
                .map(|(_, v)| v.clone())
                .collect();
            if selected.is_empty() {
                None
            } else {
                Some(Answer::Multi(selected))
            }
        }
    };

    let Some(answer) = answer else {
        // Nothing selected; just re-render the question.
        return Ok(views::titled("Quiz", question_markup(&runner)).into_response());
    };

    runner
        .set_answer(question.id, answer)
        .reject_input("could not record answer")?;

    Ok(views::titled("Quiz", question_markup(&runner)).into_response())
}

pub(crate) async fn submit_attempt(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let runner = find_attempt(&state, &user, &token)?;

    match runner.submit(SubmitTrigger::Manual).await {
        Ok(SubmitOutcome::Submitted(result)) => {
            remove_attempt(&state, &token);
            let page = quiz_views::submitted(runner.quiz_name(), runner.quiz_public_id(), &result);
            Ok(views::titled("Results", page).into_response())
        }
        Ok(SubmitOutcome::AlreadySettled) => {
            Ok(settled_response(&state, &runner)
                .unwrap_or_else(|| views::titled("Quiz", question_markup(&runner)).into_response()))
        }
        Err(_) => {
            // Persistence failed; the attempt stays retryable.
            let page = quiz_views::submit_failed(runner.token());
            Ok(views::titled("Quiz", page).into_response())
        }
    }
}

/// Countdown poll target. Once the attempt settles, redirect the poller to
/// the results page instead of another fragment.
pub(crate) async fn remaining(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let runner = find_attempt(&state, &user, &token)?;

    match runner.phase() {
        Phase::Active => {
            let remaining = runner.remaining_seconds().unwrap_or(0);
            Ok(quiz_views::countdown_fragment(&token, remaining).into_response())
        }
        Phase::Failed => Ok(views::titled("Quiz", quiz_views::submit_failed(&token)).into_response()),
        Phase::Submitting | Phase::Submitted => {
            Ok(hx_redirect(&names::results_url(runner.quiz_public_id())))
        }
    }
}

pub(crate) async fn abandon(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let runner = find_attempt(&state, &user, &token)?;

    runner.abandon();
    remove_attempt(&state, &token);

    Ok(hx_redirect(&names::quiz_page_url(runner.quiz_public_id())))
}

// --- Helpers ---

fn question_markup(runner: &AttemptRunner<Db>) -> Markup {
    let (question_idx, question, current_answer) = runner.current_question();
    quiz_views::question(quiz_views::QuestionData {
        quiz_name: runner.quiz_name().to_string(),
        token: runner.token().to_string(),
        question,
        question_idx,
        questions_count: runner.question_count(),
        answered_count: runner.answered_count(),
        current_answer,
        remaining_seconds: runner.remaining_seconds(),
        is_practice: runner.is_practice(),
    })
}

/// A terminal attempt answers every further page request the same way: the
/// submitted result, or the retry page after a failed save.
fn settled_response(
    state: &AppState,
    runner: &Arc<AttemptRunner<Db>>,
) -> Option<axum::response::Response> {
    match runner.phase() {
        Phase::Active | Phase::Submitting => None,
        Phase::Submitted => {
            let result = runner.result()?;
            remove_attempt(state, runner.token());
            let page = quiz_views::submitted(runner.quiz_name(), runner.quiz_public_id(), &result);
            Some(views::titled("Results", page).into_response())
        }
        Phase::Failed => {
            Some(views::titled("Quiz", quiz_views::submit_failed(runner.token())).into_response())
        }
    }
}

fn parse_form(body: &[u8]) -> Result<Vec<(String, String)>, AppError> {
    let body_str =
        std::str::from_utf8(body).map_err(|_| AppError::Input("body is not valid UTF-8"))?;

    let mut fields = Vec::new();
    for pair in body_str.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(&value.replace('+', " "))
            .map_err(|e| {
                tracing::error!("failed to decode form value: {e}");
                AppError::Input("failed to decode form value")
            })?
            .to_string();
        fields.push((key.to_string(), value));
    }

    Ok(fields)
}
