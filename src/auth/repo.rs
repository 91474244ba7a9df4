use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    auth::repo_types::UserRow,
    db::{conflict_on_unique, RepoResult},
    model::User,
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `RepoError::Conflict` when the email is already taken.
    async fn create(&self, user: &User) -> RepoResult<()>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, user: &User) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.code())
        .execute(&self.db)
        .await
        .map_err(conflict_on_unique)?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(User::try_from).transpose()
    }
}
