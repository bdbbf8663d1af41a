pub mod evaluation;
pub mod homepage;
pub mod quiz;

use axum::{
    body::Body,
    http::Response,
    response::IntoResponse,
};

/// Tell htmx to navigate. The swap target is irrelevant; the browser loads
/// the new location.
pub(crate) fn hx_redirect(url: &str) -> axum::response::Response {
    Response::builder()
        .header("HX-Redirect", url)
        .body(Body::empty())
        .unwrap_or_else(|_| ().into_response())
}
