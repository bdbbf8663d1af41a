pub mod ai;
pub mod db;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod names;
pub mod notes;
pub mod quiz;
pub mod rejections;
pub mod statics;
pub mod utils;
pub mod views;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{middleware, Router};

use db::Db;
use handlers::evaluation::EvaluationDraft;
use notes::NoteSuggester;
use quiz::runner::{AttemptRunner, Phase, ResultSink};

/// Live quiz attempts, keyed by attempt token. An attempt exists here from
/// start until it is submitted or abandoned; submitted attempts nobody came
/// back for are swept out periodically.
pub type AttemptRegistry = Arc<Mutex<HashMap<String, Arc<AttemptRunner<Db>>>>>;

/// Evaluation drafts being written, keyed by draft token.
pub type DraftRegistry = Arc<Mutex<HashMap<String, Arc<EvaluationDraft>>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub secure_cookies: bool,
    pub suggester: Arc<dyn NoteSuggester>,
    pub attempts: AttemptRegistry,
    pub drafts: DraftRegistry,
}

impl AppState {
    /// Must run inside a tokio runtime: spawns the registry sweeper.
    pub fn new(db: Db, secure_cookies: bool, suggester: Arc<dyn NoteSuggester>) -> Self {
        let attempts: AttemptRegistry = Arc::new(Mutex::new(HashMap::new()));
        spawn_settled_sweeper(Arc::clone(&attempts));

        Self {
            db,
            secure_cookies,
            suggester,
            attempts,
            drafts: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

const SETTLED_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Drops submitted attempts from the registry. The request paths evict on
/// sight, but a timeout auto-submit in a closed browser has no request
/// coming back for it; without the sweep the registry only grows. Failed
/// attempts stay: they are still retryable.
pub fn spawn_settled_sweeper<S: ResultSink>(
    attempts: Arc<Mutex<HashMap<String, Arc<AttemptRunner<S>>>>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SETTLED_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            attempts
                .lock()
                .unwrap()
                .retain(|_, runner| runner.phase() != Phase::Submitted);
        }
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::homepage::routes())
        .merge(handlers::quiz::routes())
        .merge(handlers::evaluation::routes())
        .layer(middleware::from_fn(csrf_check))
        .nest("/static", statics::routes())
        .with_state(state)
}

/// State-changing requests must come from htmx; the header cannot be set
/// cross-origin by a plain form post.
async fn csrf_check(
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    use axum::http::{Method, StatusCode};
    use axum::response::IntoResponse;

    let state_changing = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

    if state_changing.contains(req.method()) {
        let has_hx_request = req
            .headers()
            .get("HX-Request")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "true");

        if !has_hx_request {
            return (StatusCode::FORBIDDEN, "CSRF check failed").into_response();
        }
    }

    next.run(req).await
}
