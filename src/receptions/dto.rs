use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::{Reception, ReceptionStatus};

/// `pvzId` stays a raw string so a malformed id reaches the identifier check.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceptionRequest {
    #[serde(default)]
    pub pvz_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionResponse {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date_time: OffsetDateTime,
    pub pvz_id: Uuid,
    pub status: ReceptionStatus,
}

impl From<Reception> for ReceptionResponse {
    fn from(r: Reception) -> Self {
        Self {
            id: r.id,
            date_time: r.date_time,
            pvz_id: r.pvz_id,
            status: r.status,
        }
    }
}
