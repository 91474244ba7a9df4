use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::{
    error::{AppError, ErrorResponse},
    state::AppState,
};

/// Extracts the bearer token and yields the raw role literal it carries.
pub struct CallerRole(pub String);

#[async_trait]
impl FromRequestParts<AppState> for CallerRole {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AccessDenied.into_response())?;

        let role = state.tokens.claims(extract_token(header)).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            let body = ErrorResponse {
                message: AppError::AccessDenied.to_string(),
            };
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        })?;

        Ok(CallerRole(role))
    }
}

/// Accepts `Bearer <token>` and tolerates a token still wrapped in the JSON
/// quotes the login endpoints return it with.
fn extract_token(header: &str) -> &str {
    let token = header.strip_prefix("Bearer ").unwrap_or(header);
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
}
