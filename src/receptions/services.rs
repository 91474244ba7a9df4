use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    clock::Clock,
    db::RepoError,
    error::{internal, AppError},
    model::{Reception, ReceptionStatus, Role},
    pvz::repo::PickupPointRepo,
    receptions::{dto::ReceptionResponse, repo::ReceptionRepo},
    telemetry,
    validation::{require_role, validate_identifier, validate_role},
};

/// Validates the pickup point id and the caller role, then requires an
/// employee.
pub(crate) fn employee_call(pvz_id: &str, role: &str) -> Result<Uuid, AppError> {
    let id = validate_identifier(pvz_id).map_err(|e| {
        warn!(%pvz_id, "invalid pvz id");
        e
    })?;
    let role = validate_role(role).map_err(|e| {
        warn!(user_role = %role, "invalid user role");
        e
    })?;
    require_role(role, Role::Employee)?;
    Ok(id)
}

/// Resolves the open reception of an existing pickup point.
pub(crate) async fn active_reception(
    pvz_repo: &dyn PickupPointRepo,
    receptions: &dyn ReceptionRepo,
    pvz_id: Uuid,
) -> Result<Reception, AppError> {
    ensure_pickup_point(pvz_repo, pvz_id).await?;
    receptions
        .find_open(pvz_id)
        .await
        .map_err(internal("reception_repo.find_open"))?
        .ok_or_else(|| {
            warn!(%pvz_id, "no active reception");
            AppError::NoActiveReception
        })
}

async fn ensure_pickup_point(pvz_repo: &dyn PickupPointRepo, pvz_id: Uuid) -> Result<(), AppError> {
    let exists = pvz_repo
        .exists(pvz_id)
        .await
        .map_err(internal("pvz_repo.exists"))?;
    if !exists {
        warn!(%pvz_id, "unknown pvz");
        return Err(AppError::InvalidPickupPointId);
    }
    Ok(())
}

#[derive(Clone)]
pub struct OpenReception {
    pvz_repo: Arc<dyn PickupPointRepo>,
    receptions: Arc<dyn ReceptionRepo>,
    clock: Arc<dyn Clock>,
}

impl OpenReception {
    pub fn new(
        pvz_repo: Arc<dyn PickupPointRepo>,
        receptions: Arc<dyn ReceptionRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pvz_repo,
            receptions,
            clock,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, pvz_id: &str, role: &str) -> Result<ReceptionResponse, AppError> {
        let pvz_id = employee_call(pvz_id, role)?;
        ensure_pickup_point(self.pvz_repo.as_ref(), pvz_id).await?;

        let open = self
            .receptions
            .find_open(pvz_id)
            .await
            .map_err(internal("reception_repo.find_open"))?;
        if let Some(open) = open {
            warn!(%pvz_id, reception_id = %open.id, "reception already opened");
            return Err(AppError::ReceptionAlreadyOpened);
        }

        let reception = Reception {
            id: Uuid::new_v4(),
            pvz_id,
            date_time: self.clock.now(),
            status: ReceptionStatus::Open,
        };
        match self.receptions.create(&reception).await {
            Ok(()) => {}
            // lost the race against a concurrent open
            Err(RepoError::Conflict) => {
                warn!(%pvz_id, "reception already opened");
                return Err(AppError::ReceptionAlreadyOpened);
            }
            Err(e) => return Err(internal("reception_repo.create")(e)),
        }

        telemetry::reception_created();
        info!(%pvz_id, reception_id = %reception.id, "reception opened");
        Ok(reception.into())
    }
}

#[derive(Clone)]
pub struct CloseReception {
    pvz_repo: Arc<dyn PickupPointRepo>,
    receptions: Arc<dyn ReceptionRepo>,
}

impl CloseReception {
    pub fn new(pvz_repo: Arc<dyn PickupPointRepo>, receptions: Arc<dyn ReceptionRepo>) -> Self {
        Self {
            pvz_repo,
            receptions,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, pvz_id: &str, role: &str) -> Result<ReceptionResponse, AppError> {
        let pvz_id = employee_call(pvz_id, role)?;
        let mut reception =
            active_reception(self.pvz_repo.as_ref(), self.receptions.as_ref(), pvz_id).await?;

        let closed = self
            .receptions
            .close(reception.id)
            .await
            .map_err(internal("reception_repo.close"))?;
        if !closed {
            warn!(%pvz_id, reception_id = %reception.id, "reception closed concurrently");
            return Err(AppError::NoActiveReception);
        }
        reception.status = ReceptionStatus::Closed;

        info!(%pvz_id, reception_id = %reception.id, "reception closed");
        Ok(reception.into())
    }
}
