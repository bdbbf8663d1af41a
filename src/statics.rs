use axum::{
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
    Router,
};

const INDEX_CSS: &str = include_str!("../static/index.css");
const STATIC_CACHE_CONTROL: &str = "max-age=3600, must-revalidate";

pub fn routes<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/index.css", get(index_css))
}

async fn index_css() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, STATIC_CACHE_CONTROL),
        ],
        INDEX_CSS,
    )
}
