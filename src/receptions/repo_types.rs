use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    db::RepoError,
    model::{Reception, ReceptionStatus},
};

#[derive(Debug, Clone, FromRow)]
pub struct ReceptionRow {
    pub id: Uuid,
    pub pvz_id: Uuid,
    pub date_time: OffsetDateTime,
    pub status: i16,
}

impl TryFrom<ReceptionRow> for Reception {
    type Error = RepoError;

    fn try_from(r: ReceptionRow) -> Result<Self, Self::Error> {
        let status = ReceptionStatus::from_code(r.status)
            .ok_or_else(|| RepoError::Corrupt(format!("receptions.status = {}", r.status)))?;
        Ok(Self {
            id: r.id,
            pvz_id: r.pvz_id,
            date_time: r.date_time,
            status,
        })
    }
}
