use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::{internal, AppError},
    telemetry,
    model::{City, PickupPoint, Role},
    pvz::{
        aggregate::aggregate,
        dto::{PvzResponse, PvzWithReceptions},
        repo::PickupPointRepo,
        repo_types::ListFilter,
    },
    validation::{end_of_day, require_role, start_of_day, validate_role},
};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 30;

#[derive(Clone)]
pub struct CreatePickupPoint {
    pvz_repo: Arc<dyn PickupPointRepo>,
    clock: Arc<dyn Clock>,
}

impl CreatePickupPoint {
    pub fn new(pvz_repo: Arc<dyn PickupPointRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { pvz_repo, clock }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, city: &str, role: &str) -> Result<PvzResponse, AppError> {
        let role = validate_role(role).map_err(|e| {
            warn!(user_role = %role, "invalid user role");
            e
        })?;
        let city = City::parse(city).ok_or_else(|| {
            warn!(%city, "invalid city name");
            AppError::InvalidCityName
        })?;
        require_role(role, Role::Moderator)?;

        let pvz = PickupPoint {
            id: Uuid::new_v4(),
            registration_date: self.clock.now(),
            city,
        };
        self.pvz_repo
            .create(&pvz)
            .await
            .map_err(internal("pvz_repo.create"))?;

        telemetry::pvz_created();
        info!(pvz_id = %pvz.id, city = city.as_str(), "pvz created");
        Ok(pvz.into())
    }
}

/// Raw, unvalidated listing parameters.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: i64,
    pub limit: i64,
}

#[derive(Clone)]
pub struct ListPickupPoints {
    pvz_repo: Arc<dyn PickupPointRepo>,
}

impl ListPickupPoints {
    pub fn new(pvz_repo: Arc<dyn PickupPointRepo>) -> Self {
        Self { pvz_repo }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        params: ListParams,
        role: &str,
    ) -> Result<Vec<PvzWithReceptions>, AppError> {
        // both roles may read; only the literal is checked
        validate_role(role).map_err(|e| {
            warn!(user_role = %role, "invalid user role");
            e
        })?;

        let filter = ListFilter {
            start: bound(params.start_date.as_deref(), start_of_day, "start_date")?,
            end: bound(params.end_date.as_deref(), end_of_day, "end_date")?,
            page: params.page.max(DEFAULT_PAGE),
            limit: if (1..=MAX_LIMIT).contains(&params.limit) {
                params.limit
            } else {
                DEFAULT_LIMIT
            },
        };

        let rows = self
            .pvz_repo
            .list_with_filter(&filter)
            .await
            .map_err(internal("pvz_repo.list_with_filter"))?;

        let report = aggregate(rows).map_err(|e| {
            error!(error = %e, "failed to aggregate pvz list");
            AppError::Internal
        })?;

        info!(
            page = filter.page,
            limit = filter.limit,
            pvz_count = report.len(),
            "filtered pvz list retrieved"
        );
        Ok(report.into_iter().map(Into::into).collect())
    }
}

/// An absent or empty date means no bound.
fn bound<F>(
    raw: Option<&str>,
    parse: F,
    field: &'static str,
) -> Result<Option<time::OffsetDateTime>, AppError>
where
    F: Fn(&str) -> Result<time::OffsetDateTime, AppError>,
{
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => parse(raw).map(Some).map_err(|e| {
            warn!(field, value = %raw, "invalid date");
            e
        }),
    }
}
