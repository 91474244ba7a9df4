use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{conflict_on_unique, RepoResult},
    model::{Reception, ReceptionStatus},
    receptions::repo_types::ReceptionRow,
};

#[async_trait]
pub trait ReceptionRepo: Send + Sync {
    /// Fails with `RepoError::Conflict` when the pickup point already has an
    /// open reception.
    async fn create(&self, reception: &Reception) -> RepoResult<()>;
    async fn find_open(&self, pvz_id: Uuid) -> RepoResult<Option<Reception>>;
    /// Returns `false` when the reception was not open anymore.
    async fn close(&self, id: Uuid) -> RepoResult<bool>;
}

#[derive(Clone)]
pub struct PgReceptionRepo {
    db: PgPool,
}

impl PgReceptionRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReceptionRepo for PgReceptionRepo {
    async fn create(&self, reception: &Reception) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO receptions (id, pvz_id, date_time, status)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(reception.id)
        .bind(reception.pvz_id)
        .bind(reception.date_time)
        .bind(reception.status.code())
        .execute(&self.db)
        .await
        .map_err(conflict_on_unique)?;
        Ok(())
    }

    async fn find_open(&self, pvz_id: Uuid) -> RepoResult<Option<Reception>> {
        let row = sqlx::query_as::<_, ReceptionRow>(
            r#"
            SELECT id, pvz_id, date_time, status
            FROM receptions
            WHERE pvz_id = $1 AND status = $2
            "#,
        )
        .bind(pvz_id)
        .bind(ReceptionStatus::OPEN_CODE)
        .fetch_optional(&self.db)
        .await?;
        row.map(Reception::try_from).transpose()
    }

    async fn close(&self, id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE receptions
            SET status = $2
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(id)
        .bind(ReceptionStatus::CLOSED_CODE)
        .bind(ReceptionStatus::OPEN_CODE)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() == 1)
    }
}
