use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use crate::pages;

/// User-visible failure taxonomy. Every variant maps to a notice plus a
/// return to the page the user came from; nothing here is retried and
/// nothing is fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Username already exists!")]
    DuplicateUsername,
    #[error("Invalid credentials!")]
    InvalidCredentials,
    #[error("Please log in to generate QR codes.")]
    Unauthenticated,
    #[error("Could not encode the submitted text: {0}")]
    Encoding(String),
    #[error("Could not store the generated image")]
    StorageWrite(#[source] anyhow::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let notice = self.to_string();
        match self {
            AppError::DuplicateUsername => (
                StatusCode::CONFLICT,
                Html(pages::register_page(Some(&notice))),
            )
                .into_response(),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Html(pages::login_page(Some(&notice))),
            )
                .into_response(),
            AppError::Unauthenticated => Redirect::to("/login").into_response(),
            AppError::Encoding(_) => {
                (StatusCode::BAD_REQUEST, Html(pages::error_page(&notice))).into_response()
            }
            AppError::StorageWrite(ref e) => {
                error!(error = %e, "artifact write failed");
                internal_notice()
            }
            AppError::Database(ref e) => {
                error!(error = %e, "database error");
                internal_notice()
            }
            AppError::Internal(ref e) => {
                error!(error = %e, "internal error");
                internal_notice()
            }
        }
    }
}

fn internal_notice() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(pages::error_page("Something went wrong. Please try again.")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_username_renders_conflict() {
        let resp = AppError::DuplicateUsername.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unauthenticated_redirects_to_login() {
        let resp = AppError::Unauthenticated.into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], "/login");
    }

    #[test]
    fn storage_failure_hides_details_from_user() {
        let resp = AppError::StorageWrite(anyhow::anyhow!("disk full at /secret/path"))
            .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
