use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::html;

use crate::views;

/// Application-level handler errors. Database and collaborator failures are
/// logged at the point of conversion and surfaced as one of these.
#[derive(Debug)]
pub enum AppError {
    NotFound,
    Unauthorized,
    Input(&'static str),
    Internal(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Input(_) => (StatusCode::BAD_REQUEST, "INPUT_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        };

        let page = views::page(
            "Error",
            html! {
                h1 { (message) }
            },
        );

        (code, page).into_response()
    }
}

pub trait ResultExt<T> {
    /// Log the error and convert it to an internal server error.
    fn reject(self, context: &'static str) -> Result<T, AppError>;

    /// Log the error and convert it to a bad-request error.
    fn reject_input(self, context: &'static str) -> Result<T, AppError>;

    /// Log the error and convert it to a not-found error.
    fn reject_not_found(self, context: &'static str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn reject(self, context: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{context}: {e}");
            AppError::Internal(context)
        })
    }

    fn reject_input(self, context: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{context}: {e}");
            AppError::Input(context)
        })
    }

    fn reject_not_found(self, context: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::warn!("{context}: {e}");
            AppError::NotFound
        })
    }
}

pub trait OptionExt<T> {
    /// Convert a missing value to a not-found error.
    fn or_not_found(self) -> Result<T, AppError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self) -> Result<T, AppError> {
        self.ok_or(AppError::NotFound)
    }
}
