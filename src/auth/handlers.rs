use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::dto::{DummyLoginRequest, LoginRequest, RegisterRequest, UserResponse},
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/dummyLogin", post(dummy_login))
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Collapses any body decoding failure into `InvalidRequest`.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(v)| v).map_err(|e| {
        warn!(error = %e, "bad request body");
        AppError::InvalidRequest
    })
}

#[instrument(skip(state, payload))]
pub async fn dummy_login(
    State(state): State<AppState>,
    payload: Result<Json<DummyLoginRequest>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let req = body(payload)?;
    let token = state.usecases.auth.dummy_login(&req.role)?;
    Ok(Json(token))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let req = body(payload)?;
    let auth = &state.usecases.auth;
    let user = state
        .run(auth.register(&req.email, &req.password, &req.role))
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<String>, AppError> {
    let req = body(payload)?;
    let auth = &state.usecases.auth;
    let token = state.run(auth.login(&req.email, &req.password)).await?;
    Ok(Json(token))
}
