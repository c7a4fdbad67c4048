use std::sync::Arc;

use crate::clients::ProviderClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ChatService, ProviderChatService, SeaOrmAuthService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .connect_timeout(std::time::Duration::from_secs(10))
        .user_agent("Jarvis/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub chat_service: Arc<dyn ChatService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.security.clone(),
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        // The seed admin is re-applied on every start so the configured
        // credentials always work, even if the row pre-existed.
        store
            .upsert_seed_admin(&config.admin.username, &config.admin.password)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to upsert seed admin: {e}"))?;

        let http_client =
            build_shared_http_client(config.provider.request_timeout_seconds.into())?;
        let provider = Arc::new(ProviderClient::with_shared_client(
            http_client,
            config.provider.clone(),
        ));

        let auth_service =
            Arc::new(SeaOrmAuthService::new(store.clone())) as Arc<dyn AuthService>;
        let chat_service =
            Arc::new(ProviderChatService::new(provider)) as Arc<dyn ChatService>;

        Ok(Self {
            config,
            store,
            auth_service,
            chat_service,
        })
    }
}
