use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error kinds returned by the use cases. `Display` is the stable message
/// shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid request. Probably missing required fields or using wrong field values")]
    InvalidRequest,
    #[error("missing or invalid PVZ ID")]
    InvalidPickupPointId,
    #[error("no active reception")]
    NoActiveReception,
    #[error("reception already opened")]
    ReceptionAlreadyOpened,
    #[error("email or password is wrong")]
    EmailOrPasswordIsWrong,
    #[error("no items left to delete")]
    NoItemsLeftToDelete,
    #[error("access denied")]
    AccessDenied,
    #[error("password should be 8 to 50 characters long")]
    InvalidPassword,
    #[error("email should be *@*.*")]
    InvalidEmail,
    #[error("invalid or missing role")]
    InvalidRole,
    #[error("missing or invalid city name")]
    InvalidCityName,
    #[error("missing or invalid item type")]
    InvalidItemType,
    #[error("internal server error")]
    Internal,
    #[error("user with email already exists")]
    UserWithEmailAlreadyExists,
}

impl AppError {
    pub fn status(self) -> StatusCode {
        match self {
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::EmailOrPasswordIsWrong => StatusCode::UNAUTHORIZED,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Logs a collaborator failure and collapses it into `AppError::Internal`.
pub(crate) fn internal<E: Display>(op: &'static str) -> impl FnOnce(E) -> AppError {
    move |e| {
        error!(error = %e, op, "collaborator call failed");
        AppError::Internal
    }
}
