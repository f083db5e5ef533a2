use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::jwt::TokenIssuer;
use crate::error::ApiError;

/// Pulls a token out of `X-Auth`, `Auth` or `Authorization: Bearer`.
fn bearer(headers: &HeaderMap) -> Option<&str> {
    for name in ["x-auth", "auth"] {
        if let Some(v) = headers.get(name).and_then(|v| v.to_str().ok()) {
            return Some(v);
        }
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
}

pub async fn require_token(
    State(tokens): State<TokenIssuer>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Error: missing auth token".into()))?;

    if let Err(e) = tokens.verify(token) {
        warn!(error = %e, "invalid or expired token");
        return Err(ApiError::Unauthorized("Error: invalid or expired token".into()));
    }

    Ok(next.run(req).await)
}
