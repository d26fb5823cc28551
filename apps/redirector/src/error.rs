use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use domain::CoreError;
use thiserror::Error;
use tracing::error;

use crate::pages;

/// Errors returned by the HTML handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown code, malformed code, or an invalid step in the path.
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound
            | AppError::Core(CoreError::NotFound)
            | AppError::Core(CoreError::InvalidCode(_)) => {
                (StatusCode::NOT_FOUND, Html(pages::not_found())).into_response()
            }
            AppError::Core(CoreError::InvalidUrl(msg)) => {
                (StatusCode::BAD_REQUEST, Html(pages::server_error(&msg))).into_response()
            }
            AppError::Core(e) => {
                error!(err = ?e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(pages::server_error("Something went wrong. Please try again later.")),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(CoreError::InvalidCode("x".into())).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(CoreError::InvalidUrl("x".into())).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CoreError::Repository("down".into())).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
