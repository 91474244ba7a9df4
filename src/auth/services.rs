use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{dto::UserResponse, jwt::TokenService, password::HashService, repo::UserRepo},
    db::RepoError,
    error::{internal, AppError},
    model::User,
    validation::{validate_email, validate_password, validate_role},
};

/// Registration, login and the role-only dummy login.
#[derive(Clone)]
pub struct Auth {
    users: Arc<dyn UserRepo>,
    hasher: Arc<dyn HashService>,
    tokens: Arc<dyn TokenService>,
}

impl Auth {
    pub fn new(
        users: Arc<dyn UserRepo>,
        hasher: Arc<dyn HashService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Issues a token for `role` without touching storage.
    #[instrument(skip(self))]
    pub fn dummy_login(&self, role: &str) -> Result<String, AppError> {
        let role = validate_role(role).map_err(|e| {
            warn!(requested_role = %role, "invalid role in dummy login");
            e
        })?;
        let token = self.tokens.issue(role).map_err(internal("tokens.issue"))?;
        info!(role = role.as_str(), "dummy login successful");
        Ok(token)
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<UserResponse, AppError> {
        let email = validate_email(email).map_err(|e| {
            warn!(%email, "invalid email in registration");
            e
        })?;
        let password = validate_password(password).map_err(|e| {
            warn!("invalid password in registration");
            e
        })?;
        let role = validate_role(role).map_err(|e| {
            warn!(requested_role = %role, "invalid role in registration");
            e
        })?;

        let password_hash = self
            .hasher
            .hash(password)
            .map_err(internal("hasher.hash"))?;

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            role,
        };

        match self.users.create(&user).await {
            Ok(()) => {}
            Err(RepoError::Conflict) => {
                warn!(%email, "user already exists");
                return Err(AppError::UserWithEmailAlreadyExists);
            }
            Err(e) => return Err(internal("users.create")(e)),
        }

        info!(user_id = %user.id, %email, role = role.as_str(), "user registered");
        Ok(UserResponse::from(user))
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let email = validate_email(email).map_err(|e| {
            warn!(%email, "invalid email in login");
            e
        })?;
        let password = validate_password(password).map_err(|e| {
            warn!("invalid password in login");
            e
        })?;

        let Some(user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(internal("users.find_by_email"))?
        else {
            warn!(%email, "login unknown email");
            return Err(AppError::EmailOrPasswordIsWrong);
        };

        if !self.hasher.verify(password, &user.password_hash) {
            warn!(%email, user_id = %user.id, "login invalid password");
            return Err(AppError::EmailOrPasswordIsWrong);
        }

        let token = self
            .tokens
            .issue(user.role)
            .map_err(internal("tokens.issue"))?;
        info!(user_id = %user.id, %email, "user logged in");
        Ok(token)
    }
}
