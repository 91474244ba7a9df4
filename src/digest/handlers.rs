use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{digest::PvzListResponse, error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/pvz/list", get(list_all))
}

#[instrument(skip(state))]
pub async fn list_all(State(state): State<AppState>) -> Result<Json<PvzListResponse>, AppError> {
    let uc = &state.usecases.list_all;
    let list = state.run(uc.execute()).await?;
    Ok(Json(list))
}
