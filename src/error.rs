use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Every variant maps 1:1 to an HTTP status in [`IntoResponse`].
/// "Not authenticated" is never an error here: the resolver returns
/// anonymous as a value and the gate decides what to do with it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed input with a human-readable message.
    #[error("{0}")]
    Validation(String),

    #[error("email already in use")]
    DuplicateEmail,

    #[error("user not found")]
    UserNotFound,

    /// A missing or other-owned resource.
    #[error("{0}")]
    NotFound(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    /// Structural malformation, bad signature or elapsed expiry.
    /// Deliberately one variant: callers never learn which check failed.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The external provider exchange failed. Rendered as a redirect
    /// with a generic indicator, never the provider's error detail.
    #[error("external authentication failed")]
    ExternalAuthFailure,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::DuplicateEmail => (StatusCode::CONFLICT, "Email already in use".into()),
            ApiError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "User not found. Please sign up first.".into(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
            }
            ApiError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token".into())
            }
            ApiError::ExternalAuthFailure => {
                return Redirect::temporary("/login?error=google_oauth_failed").into_response();
            }
            ApiError::Database(err) => classify_sqlx_error(err),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".into(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

/// Unique-constraint violations on the users email index surface as
/// 409 so a concurrent-registration loser gets `DuplicateEmail`
/// semantics; everything else is an opaque 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, String) {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint().map_or(false, |c| c.contains("email"))
        {
            return (StatusCode::CONFLICT, "Email already in use".into());
        }
    }
    tracing::error!(error = %err, "database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error".into(),
    )
}
