use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{RepoError, RepoResult},
    model::{Item, ReceptionStatus},
};

#[async_trait]
pub trait ItemRepo: Send + Sync {
    /// Inserts only while the owning reception is open, otherwise fails with
    /// `RepoError::Conflict`. Holds a share lock on the reception row, so a
    /// concurrent close waits for the insert or makes it miss.
    async fn create(&self, item: &Item) -> RepoResult<()>;
    async fn count_by_reception(&self, reception_id: Uuid) -> RepoResult<i64>;
    /// Removes the newest item of the reception. `false` if none was left.
    async fn delete_latest(&self, reception_id: Uuid) -> RepoResult<bool>;
}

const INSERT_WHILE_OPEN: &str = r#"
    INSERT INTO items (id, reception_id, date_time, type)
    SELECT $1, r.id, $3, $4
    FROM receptions r
    WHERE r.id = $2 AND r.status = $5
    FOR SHARE OF r
"#;

#[derive(Clone)]
pub struct PgItemRepo {
    db: PgPool,
}

impl PgItemRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepo for PgItemRepo {
    async fn create(&self, item: &Item) -> RepoResult<()> {
        let res = sqlx::query(INSERT_WHILE_OPEN)
            .bind(item.id)
            .bind(item.reception_id)
            .bind(item.date_time)
            .bind(item.item_type.code())
            .bind(ReceptionStatus::OPEN_CODE)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::Conflict);
        }
        Ok(())
    }

    async fn count_by_reception(&self, reception_id: Uuid) -> RepoResult<i64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM items WHERE reception_id = $1"#)
                .bind(reception_id)
                .fetch_one(&self.db)
                .await?;
        Ok(count)
    }

    async fn delete_latest(&self, reception_id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM items
            WHERE id = (
                SELECT id FROM items
                WHERE reception_id = $1
                ORDER BY date_time DESC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            "#,
        )
        .bind(reception_id)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() == 1)
    }
}
