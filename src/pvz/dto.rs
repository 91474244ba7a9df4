use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    items::dto::ItemResponse,
    model::{City, PickupPoint},
    pvz::aggregate::{PickupPointReport, ReceptionReport},
    receptions::dto::ReceptionResponse,
};

#[derive(Debug, Deserialize)]
pub struct CreatePvzRequest {
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PvzResponse {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub registration_date: OffsetDateTime,
    pub city: City,
}

impl From<PickupPoint> for PvzResponse {
    fn from(p: PickupPoint) -> Self {
        Self {
            id: p.id,
            registration_date: p.registration_date,
            city: p.city,
        }
    }
}

/// Query of `GET /pvz`. Dates are `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PvzWithReceptions {
    pub pvz: PvzResponse,
    pub receptions: Vec<ReceptionWithItems>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceptionWithItems {
    pub reception: ReceptionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemResponse>>,
}

impl From<PickupPointReport> for PvzWithReceptions {
    fn from(r: PickupPointReport) -> Self {
        Self {
            pvz: r.pickup_point.into(),
            receptions: r.receptions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ReceptionReport> for ReceptionWithItems {
    fn from(r: ReceptionReport) -> Self {
        Self {
            reception: r.reception.into(),
            items: r
                .items
                .map(|items| items.into_iter().map(Into::into).collect()),
        }
    }
}
