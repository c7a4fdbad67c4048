use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;

/// Errors surfaced by the credential store contract.
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Cannot delete the last remaining admin account")]
    LastAdmin,

    #[error("User {0} not found")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Account data returned from the repository (never carries the hash).
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            is_admin: model.is_admin,
            created_at: model.created_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
    security: SecurityConfig,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, security: SecurityConfig) -> Self {
        Self { conn, security }
    }

    /// Create a new account with a hashed password.
    ///
    /// Uniqueness is enforced by the database constraint, so concurrent
    /// creates with the same username resolve to exactly one winner.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, UserStoreError> {
        let password_hash = self.hash_password_blocking(password).await?;

        let active = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            is_admin: Set(is_admin),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(User::from(model)),
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Err(UserStoreError::DuplicateUsername(username.to_string()))
                } else {
                    Err(err.into())
                }
            }
        }
    }

    /// Verify credentials, returning the account on success.
    /// Note: Argon2 verification is CPU-intensive and runs in a blocking task.
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, UserStoreError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?
            .ok_or(UserStoreError::InvalidCredentials)?;

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")
        .map_err(UserStoreError::Internal)??;

        if is_valid {
            Ok(User::from(user))
        } else {
            Err(UserStoreError::InvalidCredentials)
        }
    }

    /// All accounts, ordered by id ascending.
    pub async fn list(&self) -> Result<Vec<User>, UserStoreError> {
        let users = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<User>, UserStoreError> {
        let user = users::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;
        Ok(user.map(User::from))
    }

    /// Update an account. `new_password` of `None` leaves the hash untouched.
    pub async fn update(
        &self,
        id: i32,
        username: &str,
        new_password: Option<&str>,
        is_admin: bool,
    ) -> Result<User, UserStoreError> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(UserStoreError::NotFound(id))?;

        let mut active: users::ActiveModel = user.into();
        active.username = Set(username.to_string());
        active.is_admin = Set(is_admin);

        if let Some(password) = new_password {
            let hash = self.hash_password_blocking(password).await?;
            active.password_hash = Set(hash);
        }

        match active.update(&self.conn).await {
            Ok(model) => Ok(User::from(model)),
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Err(UserStoreError::DuplicateUsername(username.to_string()))
                } else {
                    Err(err.into())
                }
            }
        }
    }

    /// Delete an account. Refuses when the target is the last admin.
    pub async fn delete(&self, id: i32) -> Result<(), UserStoreError> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(UserStoreError::NotFound(id))?;

        if user.is_admin && self.count_admins().await? <= 1 {
            return Err(UserStoreError::LastAdmin);
        }

        users::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn count_admins(&self) -> Result<u64, UserStoreError> {
        let count = users::Entity::find()
            .filter(users::Column::IsAdmin.eq(true))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Re-apply the configured seed admin: create the account if missing,
    /// otherwise re-hash its password and force the admin flag.
    pub async fn upsert_seed_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, UserStoreError> {
        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        match existing {
            Some(user) => {
                let hash = self.hash_password_blocking(password).await?;
                let mut active: users::ActiveModel = user.into();
                active.password_hash = Set(hash);
                active.is_admin = Set(true);
                let model = active.update(&self.conn).await?;
                Ok(User::from(model))
            }
            None => self.create(username, password, true).await,
        }
    }

    async fn hash_password_blocking(&self, password: &str) -> Result<String, UserStoreError> {
        let password = password.to_string();
        let config = self.security.clone();

        let hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")
            .map_err(UserStoreError::Internal)??;

        Ok(hash)
    }
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
