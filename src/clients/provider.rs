use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProviderConfig;

/// Fixed system prompt sent with every completion request.
pub const SYSTEM_PROMPT: &str = "You are Jarvis, a helpful AI assistant.";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 512;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Provider returned an empty completion")]
    EmptyCompletion,
}

/// The JSON field name capping response length. Older model families use
/// `max_tokens`; newer reasoning families renamed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenParam {
    MaxTokens,
    MaxCompletionTokens,
}

impl TokenParam {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MaxTokens => "max_tokens",
            Self::MaxCompletionTokens => "max_completion_tokens",
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::MaxTokens => Self::MaxCompletionTokens,
            Self::MaxCompletionTokens => Self::MaxTokens,
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "max_tokens" => Some(Self::MaxTokens),
            "max_completion_tokens" => Some(Self::MaxCompletionTokens),
            _ => None,
        }
    }
}

/// Guess the token-limit parameter from the model name prefix.
///
/// This heuristic is fragile by nature; `ProviderClient::complete` absorbs a
/// wrong guess with a one-shot retry under the alternate name.
#[must_use]
pub fn token_param_for_model(model: &str) -> TokenParam {
    let model = model.to_ascii_lowercase();

    let is_reasoning_family = model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
        || model.starts_with("gpt-5");

    if is_reasoning_family {
        TokenParam::MaxCompletionTokens
    } else {
        TokenParam::MaxTokens
    }
}

/// Whether a rejection body names the parameter we did NOT send. That is the
/// one failure shape worth a transparent retry.
fn mentions_other_param(body: &str, sent: TokenParam) -> bool {
    body.contains(sent.other().name())
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
    config: ProviderConfig,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.request_timeout_seconds.into(),
            ))
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent("Jarvis/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build provider HTTP client: {e}"))?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub const fn with_shared_client(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Request a completion for `message` from `model`, returning the first
    /// choice's text.
    ///
    /// If the provider rejects the request with a 400 whose body names the
    /// alternate token-limit parameter, the request is retried exactly once
    /// with the names swapped. Every other failure propagates.
    pub async fn complete(&self, model: &str, message: &str) -> Result<String, ProviderError> {
        let param = self
            .config
            .token_param
            .as_deref()
            .and_then(TokenParam::from_name)
            .unwrap_or_else(|| token_param_for_model(model));

        match self.send(model, message, param).await {
            Err(ProviderError::Api { status: 400, body }) if mentions_other_param(&body, param) => {
                warn!(
                    "Provider rejected '{}', retrying with '{}'",
                    param.name(),
                    param.other().name()
                );
                self.send(model, message, param.other()).await
            }
            other => other,
        }
    }

    async fn send(
        &self,
        model: &str,
        message: &str,
        param: TokenParam,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut body = serde_json::json!({
            "model": model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": message },
            ],
            "temperature": TEMPERATURE,
        });
        if let Some(map) = body.as_object_mut() {
            map.insert(param.name().to_string(), MAX_TOKENS.into());
        }

        debug!("Provider request: model={model}, token_param={}", param.name());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or(ProviderError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_models_use_max_tokens() {
        assert_eq!(token_param_for_model("gpt-3.5-turbo"), TokenParam::MaxTokens);
        assert_eq!(token_param_for_model("gpt-4o-mini"), TokenParam::MaxTokens);
        assert_eq!(token_param_for_model("llama-3.1-70b"), TokenParam::MaxTokens);
    }

    #[test]
    fn reasoning_models_use_max_completion_tokens() {
        assert_eq!(
            token_param_for_model("o1-preview"),
            TokenParam::MaxCompletionTokens
        );
        assert_eq!(
            token_param_for_model("o3-mini"),
            TokenParam::MaxCompletionTokens
        );
        assert_eq!(
            token_param_for_model("gpt-5-turbo"),
            TokenParam::MaxCompletionTokens
        );
        assert_eq!(token_param_for_model("GPT-5"), TokenParam::MaxCompletionTokens);
    }

    #[test]
    fn retry_only_when_body_names_the_other_param() {
        let body = "Unsupported parameter: 'max_tokens' is not supported with this model. \
                    Use 'max_completion_tokens' instead.";
        assert!(mentions_other_param(body, TokenParam::MaxTokens));

        // A generic 400 must not trigger the swap.
        assert!(!mentions_other_param(
            "Invalid request: missing messages",
            TokenParam::MaxTokens
        ));

        // The reverse direction: a body complaining about max_completion_tokens
        // while we sent it does not retry, but one naming plain max_tokens does.
        assert!(mentions_other_param(
            "Unrecognized argument: max_tokens",
            TokenParam::MaxCompletionTokens
        ));
        assert!(!mentions_other_param(
            "Unrecognized argument: max_completion_tokens",
            TokenParam::MaxCompletionTokens
        ));
    }

    #[test]
    fn token_param_round_trip() {
        assert_eq!(TokenParam::from_name("max_tokens"), Some(TokenParam::MaxTokens));
        assert_eq!(
            TokenParam::from_name("max_completion_tokens"),
            Some(TokenParam::MaxCompletionTokens)
        );
        assert_eq!(TokenParam::from_name("max_output_tokens"), None);
        assert_eq!(TokenParam::MaxTokens.other().other(), TokenParam::MaxTokens);
    }
}
