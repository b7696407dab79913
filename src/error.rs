//! Error kinds surfaced by the service and their HTTP rendering.

use poem::{
    IntoResponse, Response,
    error::ResponseError,
    http::StatusCode,
    web::Json,
};
use sea_orm::DbErr;
use serde_json::{Value, json};
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T, E = BlogError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Ownership or staff guard rejected the viewer.
    #[error("you may not modify this {0}")]
    Forbidden(&'static str),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl BlogError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }

    fn fields(&self) -> Option<Value> {
        match self {
            Self::Validation(errors) => serde_json::to_value(errors).ok(),
            Self::Invalid { field, message } => {
                let mut map = serde_json::Map::new();
                map.insert((*field).to_owned(), json!([{ "message": message }]));
                Some(Value::Object(map))
            }
            _ => None,
        }
    }
}

impl ResponseError for BlogError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::Invalid { .. } => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Token(_) | Self::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn as_response(&self) -> Response
    where
        Self: std::error::Error + Send + Sync + 'static,
    {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            return error_body(status, "internal server error", None);
        }
        error_body(status, &self.to_string(), self.fields())
    }
}

fn error_body(status: StatusCode, message: &str, fields: Option<Value>) -> Response {
    let mut body = json!({
        "error": message,
        "status": status.as_u16(),
    });
    if let Some(fields) = fields {
        body["fields"] = fields;
    }
    (status, Json(body)).into_response()
}

/// Renders every error that escapes the router as the JSON error document,
/// including unknown routes and rejected credentials.
pub async fn render_error(err: poem::Error) -> Response {
    if err.is::<BlogError>() {
        return err.into_response();
    }
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(error = %err, "unhandled error");
        return error_body(status, "internal server error", None);
    }
    error_body(status, &err.to_string(), None)
}
