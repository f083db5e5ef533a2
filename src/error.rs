use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Error taxonomy of the HTTP layer. Repositories return plain
/// `anyhow::Error`s; handlers decide which variant they become.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("user error: {0}")]
    User(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error: {source}")]
    Server {
        source: anyhow::Error,
        context: Option<Value>,
    },
}

impl ApiError {
    pub fn server(source: impl Into<anyhow::Error>) -> Self {
        ApiError::Server {
            source: source.into(),
            context: None,
        }
    }

    /// Server error that keeps the offending payload for the logs.
    pub fn server_with<C: serde::Serialize>(source: impl Into<anyhow::Error>, context: &C) -> Self {
        ApiError::Server {
            source: source.into(),
            context: serde_json::to_value(context).ok(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::User(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Validation(msg)
            | ApiError::User(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::Server { source, context } => {
                match context {
                    Some(ctx) => tracing::error!(error = %source, context = %ctx, "server error"),
                    None => tracing::error!(error = %source, "server error"),
                }
                "Internal server error".to_string()
            }
        };

        let body = json!({ "success": false, "message": message });
        (status, Json(body)).into_response()
    }
}
