//! Domain service for authentication and user management.
//!
//! Handles signup, login, and the admin panel's account CRUD.

use serde::Serialize;
use thiserror::Error;

use crate::db::{User, UserStoreError};

/// Errors specific to authentication and account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Cannot delete the last remaining admin account")]
    LastAdminDeletion,

    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserStoreError> for AuthError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::InvalidCredentials => Self::InvalidCredentials,
            UserStoreError::DuplicateUsername(name) => Self::DuplicateUsername(name),
            UserStoreError::LastAdmin => Self::LastAdminDeletion,
            UserStoreError::NotFound(id) => Self::UserNotFound(id),
            UserStoreError::Database(e) => Self::Database(e.to_string()),
            UserStoreError::Internal(e) => Self::Internal(e.to_string()),
        }
    }
}

/// Account info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for AccountInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Fields an admin may change on an account. A `None` password leaves the
/// stored hash untouched.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    pub username: String,
    pub password: Option<String>,
    pub is_admin: bool,
}

/// Domain service trait for authentication and account management.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUsername`] when the name is taken.
    async fn signup(&self, username: &str, password: &str) -> Result<AccountInfo, AuthError>;

    /// Verifies credentials and returns the account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<AccountInfo, AuthError>;

    /// All accounts, ordered by id ascending.
    async fn list_accounts(&self) -> Result<Vec<AccountInfo>, AuthError>;

    /// Gets a single account.
    async fn get_account(&self, id: i32) -> Result<AccountInfo, AuthError>;

    /// Applies an admin edit to an account.
    async fn update_account(&self, id: i32, update: AccountUpdate)
    -> Result<AccountInfo, AuthError>;

    /// Deletes an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::LastAdminDeletion`] when the target is the last admin.
    async fn delete_account(&self, id: i32) -> Result<(), AuthError>;
}
