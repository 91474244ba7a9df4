use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    digest::PvzListResponse,
    error::{internal, AppError},
    pvz::repo::PickupPointRepo,
};

#[derive(Clone)]
pub struct ListAll {
    pvz_repo: Arc<dyn PickupPointRepo>,
}

impl ListAll {
    pub fn new(pvz_repo: Arc<dyn PickupPointRepo>) -> Self {
        Self { pvz_repo }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<PvzListResponse, AppError> {
        let all = self
            .pvz_repo
            .list_all()
            .await
            .map_err(internal("pvz_repo.list_all"))?;
        info!(pvz_count = all.len(), "pvz digest retrieved");
        Ok(PvzListResponse {
            pvzs: all.into_iter().map(Into::into).collect(),
        })
    }
}
