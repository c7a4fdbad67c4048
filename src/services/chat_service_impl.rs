//! Provider-backed implementation of the `ChatService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::clients::ProviderClient;
use crate::config::ProviderKind;
use crate::services::chat_service::{ChatError, ChatService};

pub struct ProviderChatService {
    client: Arc<ProviderClient>,
}

impl ProviderChatService {
    #[must_use]
    pub const fn new(client: Arc<ProviderClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatService for ProviderChatService {
    async fn send_message(
        &self,
        message: &str,
        model: Option<&str>,
    ) -> Result<String, ChatError> {
        let config = self.client.config();

        // Explicit request value wins over the configured default.
        let model = match model
            .filter(|m| !m.is_empty())
            .or(config.default_model.as_deref())
        {
            Some(m) => m.to_string(),
            None => {
                return Err(ChatError::NoModelSelected {
                    allowed_models: match config.kind {
                        ProviderKind::Copilot => config.allow_list(),
                        ProviderKind::Openai => None,
                    },
                });
            }
        };

        // The allow-list only constrains the copilot provider.
        if config.kind == ProviderKind::Copilot
            && let Some(allowed) = config.allow_list()
            && !allowed.iter().any(|m| m == &model)
        {
            return Err(ChatError::ModelNotAllowed {
                model,
                allowed_models: allowed,
            });
        }

        info!("Chat request: provider={}, model={model}", config.kind);

        let text = self.client.complete(&model, message).await?;
        Ok(text)
    }

    fn provider_kind(&self) -> ProviderKind {
        self.client.config().kind
    }

    fn allowed_models(&self) -> Option<Vec<String>> {
        self.client.config().allow_list()
    }
}
