// src/error.rs
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("database migration error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("template render error: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("password processing failed")]
    PasswordHashingError,

    #[error("session error: {0}")]
    SessionError(String),

    // Malformed or missing input. Reported inline, nothing is mutated.
    #[error("{0}")]
    Validation(String),

    // Uniqueness violations (duplicate class name, duplicate username).
    #[error("{0}")]
    Conflict(String),

    // Refused referential-integrity mutations, e.g. deleting a class that
    // still has students or attendance history pointing at it.
    #[error("{0}")]
    InUse(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("unexpected internal error")]
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Request failed: {:?}", self);

        let (status, user_message) = match &self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error accessing data.".to_string())
            }
            AppError::EnvVarError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error.".to_string())
            }
            AppError::TemplateError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error rendering the page.".to_string())
            }
            AppError::PasswordHashingError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error processing credentials.".to_string())
            }
            AppError::SessionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error managing your session.".to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) | AppError::InUse(msg) => {
                (StatusCode::CONFLICT, msg.clone())
            }
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found.", what)),
            AppError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.".to_string())
            }
        };

        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Error</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Error {status_code}</h1><p>{message}</p><a href="javascript:history.back()">Back</a></body></html>
         "#, status_code = status.as_u16(), message = user_message))).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;
