use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::user::{User, UserStoreError};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    security: SecurityConfig,
}

impl Store {
    pub async fn new(db_url: &str, security: SecurityConfig) -> Result<Self> {
        Self::with_pool_options(db_url, security, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        security: SecurityConfig,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn, security })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone(), self.security.clone())
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, UserStoreError> {
        self.user_repo().create(username, password, is_admin).await
    }

    pub async fn verify_user(&self, username: &str, password: &str) -> Result<User, UserStoreError> {
        self.user_repo().verify(username, password).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, UserStoreError> {
        self.user_repo().list().await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>, UserStoreError> {
        self.user_repo().get(id).await
    }

    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserStoreError> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn update_user(
        &self,
        id: i32,
        username: &str,
        new_password: Option<&str>,
        is_admin: bool,
    ) -> Result<User, UserStoreError> {
        self.user_repo()
            .update(id, username, new_password, is_admin)
            .await
    }

    pub async fn delete_user(&self, id: i32) -> Result<(), UserStoreError> {
        self.user_repo().delete(id).await
    }

    pub async fn count_admins(&self) -> Result<u64, UserStoreError> {
        self.user_repo().count_admins().await
    }

    pub async fn upsert_seed_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, UserStoreError> {
        self.user_repo().upsert_seed_admin(username, password).await
    }
}
