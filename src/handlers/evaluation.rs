use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Form, Path, State},
    routing::{get, post},
    Router,
};
use maud::Markup;
use serde::Deserialize;
use ulid::Ulid;

use crate::{
    db::SavedCriterion,
    extractors::{AdminGuard, IsHtmx},
    handlers::hx_redirect,
    names,
    notes::{CriterionScore, NoteBoard, SuggestionScheduler},
    rejections::{AppError, OptionExt, ResultExt},
    views,
    views::evaluation as evaluation_views,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/evaluation/new/{student_id}", post(new_draft))
        .route("/evaluation/draft/{token}", get(draft_page))
        .route("/evaluation/draft/{token}/score", post(set_score))
        .route("/evaluation/draft/{token}/rating", post(set_rating))
        .route("/evaluation/draft/{token}/note", post(set_note))
        .route("/evaluation/draft/{token}/save", post(save_draft))
        .route("/evaluation/{evaluation_id}", get(saved_page))
}

/// An evaluation being written. Lives in memory until saved; the note board
/// is shared with the suggestion scheduler's background tasks.
pub struct EvaluationDraft {
    pub token: String,
    pub student_id: i64,
    pub student_name: String,
    pub author_id: i64,
    /// (criterion id, display name), in form order.
    criteria: Vec<(String, String)>,
    scores: Mutex<BTreeMap<String, i64>>,
    overall_rating: Mutex<Option<i64>>,
    board: Arc<Mutex<NoteBoard>>,
    scheduler: SuggestionScheduler,
}

impl EvaluationDraft {
    fn new(state: &AppState, student_id: i64, student_name: String, author_id: i64) -> Self {
        let criteria: Vec<(String, String)> = names::DEFAULT_CRITERIA
            .iter()
            .map(|name| (criterion_id(name), name.to_string()))
            .collect();

        let board = Arc::new(Mutex::new(NoteBoard::with_fields(
            criteria.iter().map(|(id, _)| id.clone()),
        )));
        let scheduler = SuggestionScheduler::new(
            Arc::clone(&state.suggester),
            Arc::clone(&board),
            Duration::from_millis(names::NOTE_SUGGEST_DEBOUNCE_MS),
        );

        Self {
            token: Ulid::new().to_string(),
            student_id,
            student_name,
            author_id,
            criteria,
            scores: Mutex::new(BTreeMap::new()),
            overall_rating: Mutex::new(None),
            board,
            scheduler,
        }
    }

    /// Every scored criterion, as the suggester sees them.
    fn scored_criteria(&self) -> Vec<CriterionScore> {
        let scores = self.scores.lock().unwrap();
        self.criteria
            .iter()
            .filter_map(|(id, name)| {
                scores.get(id).map(|&score| CriterionScore {
                    id: id.clone(),
                    name: name.clone(),
                    score,
                })
            })
            .collect()
    }

    fn view_data(&self) -> evaluation_views::DraftData {
        let scores = self.scores.lock().unwrap();
        let board = self.board.lock().unwrap();

        let criteria = self
            .criteria
            .iter()
            .map(|(id, name)| {
                let field = board.field(id);
                evaluation_views::DraftCriterion {
                    id: id.clone(),
                    name: name.clone(),
                    score: scores.get(id).copied(),
                    note: field.map(|f| f.text.clone()).unwrap_or_default(),
                    note_owner: field
                        .map(|f| f.owner)
                        .unwrap_or(crate::notes::Ownership::Empty),
                }
            })
            .collect();

        evaluation_views::DraftData {
            token: self.token.clone(),
            student_name: self.student_name.clone(),
            overall_rating: *self.overall_rating.lock().unwrap(),
            criteria,
        }
    }
}

fn criterion_id(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

fn find_draft(
    state: &AppState,
    user_id: i64,
    token: &str,
) -> Result<Arc<EvaluationDraft>, AppError> {
    let drafts = state.drafts.lock().unwrap();
    let draft = drafts.get(token).cloned().ok_or(AppError::NotFound)?;
    if draft.author_id != user_id {
        return Err(AppError::Unauthorized);
    }
    Ok(draft)
}

async fn new_draft(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<axum::response::Response, AppError> {
    let student = state
        .db
        .get_student(student_id)
        .await
        .reject("could not get student")?
        .or_not_found()?;

    let draft = Arc::new(EvaluationDraft::new(
        &state,
        student.id,
        student.display_name,
        user.id,
    ));
    let url = names::evaluation_draft_url(&draft.token);
    state
        .drafts
        .lock()
        .unwrap()
        .insert(draft.token.clone(), draft);

    Ok(hx_redirect(&url))
}

async fn draft_page(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Path(token): Path<String>,
) -> Result<Markup, AppError> {
    let draft = find_draft(&state, user.id, &token)?;
    Ok(views::render(
        is_htmx,
        "Evaluation",
        evaluation_views::draft_form(draft.view_data()),
    ))
}

#[derive(Deserialize)]
struct ScoreBody {
    criterion: String,
    /// Empty string when the score is set back to "-".
    score: String,
}

async fn set_score(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(body): Form<ScoreBody>,
) -> Result<Markup, AppError> {
    let draft = find_draft(&state, user.id, &token)?;

    if !draft.criteria.iter().any(|(id, _)| *id == body.criterion) {
        return Err(AppError::Input("unknown criterion"));
    }

    {
        let mut scores = draft.scores.lock().unwrap();
        match body.score.parse::<i64>() {
            Ok(score)
                if (names::MIN_CRITERION_SCORE..=names::MAX_CRITERION_SCORE)
                    .contains(&score) =>
            {
                scores.insert(body.criterion.clone(), score);
            }
            _ => {
                scores.remove(&body.criterion);
            }
        }
    }

    draft.scheduler.request(draft.scored_criteria());

    Ok(views::titled(
        "Evaluation",
        evaluation_views::draft_form(draft.view_data()),
    ))
}

#[derive(Deserialize)]
struct RatingBody {
    rating: String,
}

async fn set_rating(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(body): Form<RatingBody>,
) -> Result<Markup, AppError> {
    let draft = find_draft(&state, user.id, &token)?;

    *draft.overall_rating.lock().unwrap() = body
        .rating
        .parse::<i64>()
        .ok()
        .filter(|r| (names::MIN_CRITERION_SCORE..=names::MAX_CRITERION_SCORE).contains(r));

    Ok(views::titled(
        "Evaluation",
        evaluation_views::draft_form(draft.view_data()),
    ))
}

#[derive(Deserialize)]
struct NoteBody {
    criterion: String,
    #[serde(default)]
    note: String,
}

async fn set_note(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(body): Form<NoteBody>,
) -> Result<Markup, AppError> {
    let draft = find_draft(&state, user.id, &token)?;

    if !draft.criteria.iter().any(|(id, _)| *id == body.criterion) {
        return Err(AppError::Input("unknown criterion"));
    }

    draft
        .board
        .lock()
        .unwrap()
        .on_user_edit(&body.criterion, body.note.trim());

    Ok(views::titled(
        "Evaluation",
        evaluation_views::draft_form(draft.view_data()),
    ))
}

async fn save_draft(
    AdminGuard(user): AdminGuard,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let draft = find_draft(&state, user.id, &token)?;

    let criteria: Vec<SavedCriterion> = {
        let scores = draft.scores.lock().unwrap();
        let board = draft.board.lock().unwrap();
        draft
            .criteria
            .iter()
            .map(|(id, name)| {
                let field = board.field(id);
                SavedCriterion {
                    name: name.clone(),
                    score: scores.get(id).copied(),
                    note: field.map(|f| f.text.clone()).unwrap_or_default(),
                    note_owner: field
                        .map(|f| f.owner)
                        .unwrap_or(crate::notes::Ownership::Empty)
                        .as_str(),
                }
            })
            .collect()
    };

    // Copied out so no guard is held across the await.
    let overall_rating = *draft.overall_rating.lock().unwrap();

    let evaluation_id = state
        .db
        .save_evaluation(draft.student_id, draft.author_id, overall_rating, &criteria)
        .await
        .reject("could not save evaluation")?;

    state.drafts.lock().unwrap().remove(&token);

    Ok(hx_redirect(&names::evaluation_view_url(evaluation_id)))
}

async fn saved_page(
    AdminGuard(_user): AdminGuard,
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Path(evaluation_id): Path<i64>,
) -> Result<Markup, AppError> {
    let (evaluation, criteria) = state
        .db
        .get_evaluation(evaluation_id)
        .await
        .reject("could not get evaluation")?
        .or_not_found()?;

    let student_name = state
        .db
        .get_student(evaluation.student_id)
        .await
        .reject("could not get student")?
        .map(|s| s.display_name)
        .unwrap_or_else(|| format!("student #{}", evaluation.student_id));

    Ok(views::render(
        is_htmx,
        "Evaluation",
        evaluation_views::saved_view(evaluation_views::SavedData {
            student_name,
            evaluation,
            criteria,
        }),
    ))
}
