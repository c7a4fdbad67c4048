//! Domain service for the provider-routing chat gateway.

use thiserror::Error;

use crate::clients::ProviderError;
use crate::config::ProviderKind;

/// Errors specific to chat completion requests.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No model selected and no default model configured")]
    NoModelSelected {
        allowed_models: Option<Vec<String>>,
    },

    #[error("Model '{model}' is not in the allowed model list")]
    ModelNotAllowed {
        model: String,
        allowed_models: Vec<String>,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Domain service trait for the chat gateway.
#[async_trait::async_trait]
pub trait ChatService: Send + Sync {
    /// Resolves the effective model, applies the allow-list, and produces
    /// assistant text for `message`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NoModelSelected`] or [`ChatError::ModelNotAllowed`]
    /// for model-selection problems, [`ChatError::Provider`] for upstream
    /// failures.
    async fn send_message(&self, message: &str, model: Option<&str>)
    -> Result<String, ChatError>;

    /// The configured provider kind.
    fn provider_kind(&self) -> ProviderKind;

    /// The configured allow-list; `None` means any model.
    fn allowed_models(&self) -> Option<Vec<String>>;
}
