use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub provider: ProviderConfig,

    pub admin: AdminConfig,

    pub security: SecurityConfig,

    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/jarvis.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Default: true for production safety. Set to false for local development without HTTPS.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
            secure_cookies: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// The OpenAI platform API.
    Openai,
    /// An OpenAI-compatible HTTP endpoint (e.g. a Copilot proxy).
    Copilot,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Openai => write!(f, "openai"),
            Self::Copilot => write!(f, "copilot"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    pub base_url: String,

    pub api_key: String,

    /// Model used when the request doesn't name one.
    pub default_model: Option<String>,

    /// Comma-separated allow-list of models, or "*" for any.
    /// Only consulted for the copilot provider.
    pub allowed_models: String,

    /// Explicit token-limit parameter name ("max_tokens" or
    /// "max_completion_tokens"). When unset the name is guessed from the
    /// model prefix, with a one-shot retry on mismatch.
    pub token_param: Option<String>,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Openai,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            default_model: Some("gpt-4o-mini".to_string()),
            allowed_models: "*".to_string(),
            token_param: None,
            request_timeout_seconds: 30,
        }
    }
}

impl ProviderConfig {
    /// Parsed allow-list. `None` means the wildcard (any model).
    #[must_use]
    pub fn allow_list(&self) -> Option<Vec<String>> {
        let raw = self.allowed_models.trim();
        if raw.is_empty() || raw == "*" {
            return None;
        }
        Some(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
        )
    }
}

/// Seed admin account, re-applied on every startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,

    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inactivity expiry for sessions, in minutes.
    pub expiry_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { expiry_minutes: 60 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            admin: AdminConfig::default(),
            security: SecurityConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Secrets come from the environment; a .env file is honored if present.
        let _ = dotenvy::dotenv();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(kind) = std::env::var("JARVIS_PROVIDER") {
            match kind.to_lowercase().as_str() {
                "copilot" => self.provider.kind = ProviderKind::Copilot,
                _ => self.provider.kind = ProviderKind::Openai,
            }
        }
        if let Ok(key) = std::env::var("JARVIS_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
        {
            self.provider.api_key = key;
        }
        if let Ok(url) = std::env::var("JARVIS_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Ok(model) = std::env::var("JARVIS_DEFAULT_MODEL") {
            self.provider.default_model = if model.is_empty() { None } else { Some(model) };
        }
        if let Ok(models) = std::env::var("JARVIS_ALLOWED_MODELS") {
            self.provider.allowed_models = models;
        }
        if let Ok(db) = std::env::var("JARVIS_DATABASE_PATH") {
            self.general.database_path = db;
        }
        if let Ok(username) = std::env::var("JARVIS_ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Ok(password) = std::env::var("JARVIS_ADMIN_PASSWORD") {
            self.admin.password = password;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("jarvis").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".jarvis").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.base_url.is_empty() {
            anyhow::bail!("Provider base URL cannot be empty");
        }

        if let Some(param) = self.provider.token_param.as_deref()
            && param != "max_tokens"
            && param != "max_completion_tokens"
        {
            anyhow::bail!(
                "provider.token_param must be 'max_tokens' or 'max_completion_tokens', got '{param}'"
            );
        }

        if self.admin.username.is_empty() || self.admin.password.is_empty() {
            anyhow::bail!("Seed admin username and password cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.provider.kind, ProviderKind::Openai);
        assert_eq!(config.provider.request_timeout_seconds, 30);
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.session.expiry_minutes, 60);
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [provider]
            kind = "copilot"
            base_url = "http://localhost:4141"
            allowed_models = "gpt-4o, gpt-4o-mini"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.provider.kind, ProviderKind::Copilot);
        assert_eq!(
            config.provider.allow_list(),
            Some(vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()])
        );

        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_wildcard_allow_list() {
        let config = ProviderConfig::default();
        assert!(config.allow_list().is_none());
    }

    #[test]
    fn test_token_param_validation() {
        let mut config = Config::default();
        config.provider.api_key = "sk-test".to_string();
        config.provider.token_param = Some("max_output_tokens".to_string());
        assert!(config.validate().is_err());

        config.provider.token_param = Some("max_completion_tokens".to_string());
        assert!(config.validate().is_ok());
    }
}
