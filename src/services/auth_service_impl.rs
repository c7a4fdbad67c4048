//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::Store;
use crate::services::auth_service::{AccountInfo, AccountUpdate, AuthError, AuthService};
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, username: &str, password: &str) -> Result<AccountInfo, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        // Admin rights are never granted at signup; they come from the seed
        // admin config or an admin edit.
        let user = self.store.create_user(username, password, false).await?;
        Ok(AccountInfo::from(user))
    }

    async fn login(&self, username: &str, password: &str) -> Result<AccountInfo, AuthError> {
        let user = self.store.verify_user(username, password).await?;
        Ok(AccountInfo::from(user))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountInfo>, AuthError> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(AccountInfo::from).collect())
    }

    async fn get_account(&self, id: i32) -> Result<AccountInfo, AuthError> {
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or(AuthError::UserNotFound(id))?;
        Ok(AccountInfo::from(user))
    }

    async fn update_account(
        &self,
        id: i32,
        update: AccountUpdate,
    ) -> Result<AccountInfo, AuthError> {
        if update.username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }

        // Blank password means unchanged.
        let new_password = update
            .password
            .as_deref()
            .filter(|p| !p.is_empty());

        let user = self
            .store
            .update_user(id, &update.username, new_password, update.is_admin)
            .await?;
        Ok(AccountInfo::from(user))
    }

    async fn delete_account(&self, id: i32) -> Result<(), AuthError> {
        self.store.delete_user(id).await?;
        Ok(())
    }
}
