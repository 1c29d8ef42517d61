use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Signup input rejected before anything is written.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username must be between 4 and 20 characters")]
    UsernameLength,
    #[error("Password must be at least 8 characters")]
    PasswordLength,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Username is already taken")]
    UsernameTaken,
}

/// The user table could not be read or decoded.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("user table unreadable: {0:#}")]
    Unavailable(#[source] anyhow::Error),
    #[error("user table corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PriceDataError {
    #[error("no price data stored under {0}")]
    Missing(String),
    #[error("price data unreadable: {0:#}")]
    Unavailable(#[source] anyhow::Error),
    #[error("price data undecodable: {0:#}")]
    Decode(#[source] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Login required")]
    LoginRequired,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Saving the user table failed")]
    SaveFailed,
    #[error(transparent)]
    PriceData(#[from] PriceDataError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(ValidationError::UsernameTaken) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::LoginRequired => StatusCode::UNAUTHORIZED,
            AppError::Store(_) | AppError::SaveFailed | AppError::PriceData(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Validation(e) => {
                tracing::debug!(reason = %e, "signup rejected");
                e.to_string()
            }
            AppError::InvalidCredentials => {
                tracing::debug!("authentication failed");
                self.to_string()
            }
            AppError::LoginRequired => {
                tracing::debug!("anonymous session hit a protected route");
                self.to_string()
            }
            AppError::BadRequest(msg) => {
                tracing::debug!(message = %msg, "bad request");
                msg.clone()
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "user table unavailable");
                "Something went wrong, please try again".to_string()
            }
            AppError::SaveFailed => "Something went wrong, please try again".to_string(),
            AppError::PriceData(e) => {
                tracing::error!(error = %e, "price data unavailable");
                "Price data is unavailable, please try again".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
