use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{extractors::CallerRole, handlers::body},
    error::AppError,
    receptions::dto::{CreateReceptionRequest, ReceptionResponse},
    state::AppState,
};

pub fn reception_routes() -> Router<AppState> {
    Router::new()
        .route("/receptions", post(open_reception))
        .route("/pvz/:pvz_id/close_last_reception", post(close_last_reception))
}

#[instrument(skip(state, payload, role))]
pub async fn open_reception(
    State(state): State<AppState>,
    CallerRole(role): CallerRole,
    payload: Result<Json<CreateReceptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReceptionResponse>), AppError> {
    let req = body(payload)?;
    let uc = &state.usecases.open_reception;
    let reception = state.run(uc.execute(&req.pvz_id, &role)).await?;
    Ok((StatusCode::CREATED, Json(reception)))
}

#[instrument(skip(state, role))]
pub async fn close_last_reception(
    State(state): State<AppState>,
    CallerRole(role): CallerRole,
    Path(pvz_id): Path<String>,
) -> Result<Json<ReceptionResponse>, AppError> {
    let uc = &state.usecases.close_reception;
    let reception = state.run(uc.execute(&pvz_id, &role)).await?;
    Ok(Json(reception))
}
