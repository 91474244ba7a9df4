use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{extractors::CallerRole, handlers::body},
    error::AppError,
    pvz::{
        dto::{CreatePvzRequest, ListQuery, PvzResponse, PvzWithReceptions},
        services::ListParams,
    },
    state::AppState,
};

pub fn pvz_routes() -> Router<AppState> {
    Router::new().route("/pvz", post(create_pvz).get(list_pvz))
}

#[instrument(skip(state, payload, role))]
pub async fn create_pvz(
    State(state): State<AppState>,
    CallerRole(role): CallerRole,
    payload: Result<Json<CreatePvzRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PvzResponse>), AppError> {
    let req = body(payload)?;
    let uc = &state.usecases.create_pvz;
    let pvz = state.run(uc.execute(&req.city, &role)).await?;
    Ok((StatusCode::CREATED, Json(pvz)))
}

#[instrument(skip(state, query, role))]
pub async fn list_pvz(
    State(state): State<AppState>,
    CallerRole(role): CallerRole,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<PvzWithReceptions>>, AppError> {
    let Query(q) = query.map_err(|e| {
        warn!(error = %e, "bad query string");
        AppError::InvalidRequest
    })?;
    let params = ListParams {
        start_date: q.start_date,
        end_date: q.end_date,
        page: q.page,
        limit: q.limit,
    };
    let uc = &state.usecases.list_pvz;
    let list = state.run(uc.execute(params, &role)).await?;
    Ok(Json(list))
}
