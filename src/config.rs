use serde::{Deserialize, Serialize};
use std::fs;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// Log every HTTP request and response through the trace layer
    #[serde(default)]
    pub trace_requests: bool,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub call_provider: CallProviderConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Frontend origin allowed to send credentialed requests
    #[serde(default)]
    pub cors_origin: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub users_url: String,
    pub sessions_url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            users_url: "sqlite://data/users.db".to_string(),
            sessions_url: "sqlite://data/sessions.db".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    /// Secret the session cookie signing key is derived from
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_cookie_path() -> String {
    "/api".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    600
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Bypass signup field validation. Intended for automated test runs only.
    #[serde(default)]
    pub skip_signup_validation: bool,
    #[serde(default)]
    pub argon2: Argon2Config,
}

/// Argon2 cost parameters (defaults match the argon2 crate's recommended params)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Argon2Config {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CallProviderConfig {
    pub base_url: String,
    /// Server-held bearer credential. Never sent to the browser.
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for CallProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.retellai.com".to_string(),
            api_key: None,
            timeout_ms: 10_000,
        }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, then apply process environment overrides.
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Takes a lookup function instead of reading `std::env` directly so tests
    /// can feed a fixed map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.gateway.port = port;
        }
        if let Some(secret) = lookup("SESSION_SECRET").filter(|s| !s.is_empty()) {
            self.session.secret = secret;
        }
        if let Some(key) = lookup("RETELL_API_KEY").filter(|s| !s.is_empty()) {
            self.call_provider.api_key = Some(key);
        }
        // Only the literal "true" enables the bypass
        if let Some(flag) = lookup("SKIP_SIGNUP_VALIDATION") {
            self.auth.skip_signup_validation = flag == "true";
        }
        if let Some(url) = lookup("USERS_DB_URL") {
            self.database.users_url = url;
        }
        if let Some(url) = lookup("SESSIONS_DB_URL") {
            self.database.sessions_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.is_empty() {
            return Err(ConfigError::Invalid(
                "session.secret is empty (set SESSION_SECRET)".to_string(),
            ));
        }
        let path = &self.session.cookie_path;
        if !path.starts_with('/') || !path.chars().all(|c| c.is_ascii_graphic() && c != ';') {
            return Err(ConfigError::Invalid(format!(
                "session.cookie_path is not a valid cookie path: {:?}",
                path
            )));
        }
        if self.session.ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "session.ttl_secs must be positive".to_string(),
            ));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "session.sweep_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
