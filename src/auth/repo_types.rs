use sqlx::FromRow;
use uuid::Uuid;

use crate::{db::RepoError, model::{Role, User}};

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string
    pub role: i16,
}

impl TryFrom<UserRow> for User {
    type Error = RepoError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_code(r.role)
            .ok_or_else(|| RepoError::Corrupt(format!("users.role = {}", r.role)))?;
        Ok(Self {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            role,
        })
    }
}
