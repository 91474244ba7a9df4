use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    db::RepoError,
    model::{City, PickupPoint},
};

#[derive(Debug, Clone, FromRow)]
pub struct PvzRow {
    pub id: Uuid,
    pub registration_date: OffsetDateTime,
    pub city: i16,
}

impl TryFrom<PvzRow> for PickupPoint {
    type Error = RepoError;

    fn try_from(r: PvzRow) -> Result<Self, Self::Error> {
        let city = City::from_code(r.city)
            .ok_or_else(|| RepoError::Corrupt(format!("pvz.city = {}", r.city)))?;
        Ok(Self {
            id: r.id,
            registration_date: r.registration_date,
            city,
        })
    }
}

/// One row of the filtered report: a (pickup point, reception, item)
/// combination. Item columns are null for a reception without items.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PvzListRow {
    pub pvz_id: Uuid,
    pub registration_date: OffsetDateTime,
    pub city: i16,
    pub reception_id: Uuid,
    pub reception_date_time: OffsetDateTime,
    pub status: i16,
    pub item_id: Option<Uuid>,
    pub item_date_time: Option<OffsetDateTime>,
    pub item_type: Option<i16>,
}

/// Inclusive reception-time window plus the page of pickup points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
    pub page: i64,
    pub limit: i64,
}

impl ListFilter {
    /// Rows to skip. Saturates at `i64::MAX`, which simply yields an empty
    /// page.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit.max(0))
    }
}
