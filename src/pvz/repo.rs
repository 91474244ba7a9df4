use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::RepoResult,
    model::PickupPoint,
    pvz::repo_types::{ListFilter, PvzListRow, PvzRow},
};

#[async_trait]
pub trait PickupPointRepo: Send + Sync {
    async fn create(&self, pvz: &PickupPoint) -> RepoResult<()>;
    async fn exists(&self, id: Uuid) -> RepoResult<bool>;
    /// Rows ordered by pickup point, reception time, item time.
    async fn list_with_filter(&self, filter: &ListFilter) -> RepoResult<Vec<PvzListRow>>;
    async fn list_all(&self) -> RepoResult<Vec<PickupPoint>>;
}

#[derive(Clone)]
pub struct PgPickupPointRepo {
    db: PgPool,
}

impl PgPickupPointRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PickupPointRepo for PgPickupPointRepo {
    async fn create(&self, pvz: &PickupPoint) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pvz (id, registration_date, city)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(pvz.id)
        .bind(pvz.registration_date)
        .bind(pvz.city.code())
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn exists(&self, id: Uuid) -> RepoResult<bool> {
        let found: bool = sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM pvz WHERE id = $1)"#)
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(found)
    }

    async fn list_with_filter(&self, filter: &ListFilter) -> RepoResult<Vec<PvzListRow>> {
        let rows = sqlx::query_as::<_, PvzListRow>(
            r#"
            SELECT p.id AS pvz_id, p.registration_date, p.city,
                   r.id AS reception_id, r.date_time AS reception_date_time, r.status,
                   i.id AS item_id, i.date_time AS item_date_time, i.type AS item_type
            FROM pvz p
            JOIN receptions r ON r.pvz_id = p.id
            LEFT JOIN items i ON i.reception_id = r.id
            WHERE p.id IN (SELECT id FROM pvz ORDER BY id LIMIT $3 OFFSET $4)
              AND ($1::timestamptz IS NULL OR r.date_time >= $1)
              AND ($2::timestamptz IS NULL OR r.date_time <= $2)
            ORDER BY p.id, r.date_time, r.id, i.date_time
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.limit)
        .bind(filter.offset())
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_all(&self) -> RepoResult<Vec<PickupPoint>> {
        let rows = sqlx::query_as::<_, PvzRow>(
            r#"
            SELECT id, registration_date, city
            FROM pvz
            ORDER BY registration_date, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(PickupPoint::try_from).collect()
    }
}
