use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    clock::Clock,
    db::RepoError,
    error::{internal, AppError},
    items::{dto::ItemResponse, repo::ItemRepo},
    model::{Item, ItemType, Role},
    pvz::repo::PickupPointRepo,
    receptions::{repo::ReceptionRepo, services::{active_reception, employee_call}},
    telemetry,
    validation::{require_role, validate_identifier, validate_role},
};

#[derive(Clone)]
pub struct AddItem {
    pvz_repo: Arc<dyn PickupPointRepo>,
    receptions: Arc<dyn ReceptionRepo>,
    items: Arc<dyn ItemRepo>,
    clock: Arc<dyn Clock>,
}

impl AddItem {
    pub fn new(
        pvz_repo: Arc<dyn PickupPointRepo>,
        receptions: Arc<dyn ReceptionRepo>,
        items: Arc<dyn ItemRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pvz_repo,
            receptions,
            items,
            clock,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        pvz_id: &str,
        item_type: &str,
        role: &str,
    ) -> Result<ItemResponse, AppError> {
        let pvz_id = validate_identifier(pvz_id).map_err(|e| {
            warn!(%pvz_id, "invalid pvz id");
            e
        })?;
        let role = validate_role(role).map_err(|e| {
            warn!(user_role = %role, "invalid user role");
            e
        })?;
        let item_type = ItemType::parse(item_type).ok_or_else(|| {
            warn!(%item_type, "invalid item type");
            AppError::InvalidItemType
        })?;
        require_role(role, Role::Employee)?;

        let reception =
            active_reception(self.pvz_repo.as_ref(), self.receptions.as_ref(), pvz_id).await?;

        let item = Item {
            id: Uuid::new_v4(),
            reception_id: reception.id,
            date_time: self.clock.now(),
            item_type,
        };
        match self.items.create(&item).await {
            Ok(()) => {}
            // the reception was closed between lookup and insert
            Err(RepoError::Conflict) => {
                warn!(%pvz_id, reception_id = %reception.id, "reception closed before insert");
                return Err(AppError::NoActiveReception);
            }
            Err(e) => return Err(internal("item_repo.create")(e)),
        }

        telemetry::product_added();
        info!(%pvz_id, reception_id = %item.reception_id, item_id = %item.id, "item added");
        Ok(item.into())
    }
}

#[derive(Clone)]
pub struct DeleteLastItem {
    pvz_repo: Arc<dyn PickupPointRepo>,
    receptions: Arc<dyn ReceptionRepo>,
    items: Arc<dyn ItemRepo>,
}

impl DeleteLastItem {
    pub fn new(
        pvz_repo: Arc<dyn PickupPointRepo>,
        receptions: Arc<dyn ReceptionRepo>,
        items: Arc<dyn ItemRepo>,
    ) -> Self {
        Self {
            pvz_repo,
            receptions,
            items,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, pvz_id: &str, role: &str) -> Result<(), AppError> {
        let pvz_id = employee_call(pvz_id, role)?;
        let reception =
            active_reception(self.pvz_repo.as_ref(), self.receptions.as_ref(), pvz_id).await?;

        let count = self
            .items
            .count_by_reception(reception.id)
            .await
            .map_err(internal("item_repo.count_by_reception"))?;
        if count == 0 {
            warn!(reception_id = %reception.id, "no items left to delete");
            return Err(AppError::NoItemsLeftToDelete);
        }

        let deleted = self
            .items
            .delete_latest(reception.id)
            .await
            .map_err(internal("item_repo.delete_latest"))?;
        if !deleted {
            warn!(reception_id = %reception.id, "items drained concurrently");
            return Err(AppError::NoItemsLeftToDelete);
        }

        info!(%pvz_id, reception_id = %reception.id, "last item deleted");
        Ok(())
    }
}
