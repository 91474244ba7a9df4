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
    items::dto::{CreateItemRequest, ItemResponse},
    state::AppState,
};

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/items", post(add_item))
        .route("/pvz/:pvz_id/delete_last_item", post(delete_last_item))
}

#[instrument(skip(state, payload, role))]
pub async fn add_item(
    State(state): State<AppState>,
    CallerRole(role): CallerRole,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemResponse>), AppError> {
    let req = body(payload)?;
    let uc = &state.usecases.add_item;
    let item = state
        .run(uc.execute(&req.pvz_id, &req.item_type, &role))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, role))]
pub async fn delete_last_item(
    State(state): State<AppState>,
    CallerRole(role): CallerRole,
    Path(pvz_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let uc = &state.usecases.delete_last_item;
    state.run(uc.execute(&pvz_id, &role)).await?;
    Ok(StatusCode::OK)
}
