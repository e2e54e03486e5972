//! Configuration for the Sprout services.
//!
//! Provides the [`SproutConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `SPROUT_CONFIG` environment variable
//! 3. XDG default: `~/.config/sprout/config.toml`
//! 4. Built-in defaults

use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use sprout_core::{Error, Result};
use std::path::PathBuf;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the Sprout services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SproutConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Relational store settings.
    pub database: DatabaseConfig,

    /// Identity-provider settings.
    pub auth: AuthConfig,

    /// Outbound email settings.
    pub mail: MailConfig,

    /// Payment-processor settings.
    pub billing: BillingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,

    /// Port to listen on.
    pub port: u16,
}

/// Relational store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Postgres connection URL.
    pub url: String,
}

/// Identity-provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret for bearer-token verification.
    pub token_secret: String,
}

/// Outbound email configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Provider send endpoint.
    pub endpoint: String,

    /// Provider API key.
    pub api_key: String,

    /// Sender address on outbound mail.
    pub from: String,

    /// Operator address for critical-severity alert mail.
    pub alert_recipient: String,
}

/// Payment-processor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Processor API base URL.
    pub base_url: String,

    /// Processor secret key.
    pub secret_key: String,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for SproutConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            mail: MailConfig::default(),
            billing: BillingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/sprout".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // Local-development secret; production sets SPROUT_AUTH_TOKEN_SECRET.
            token_secret: "sprout-dev-secret".to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.resend.com/emails".to_string(),
            api_key: String::new(),
            from: "Sprout <no-reply@sprout.example>".to_string(),
            alert_recipient: "ops@sprout.example".to_string(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.stripe.com".to_string(),
            secret_key: String::new(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl SproutConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// Loading priority:
    /// 1. Explicit `config_path` (from `--config` flag)
    /// 2. `SPROUT_CONFIG` env var
    /// 3. XDG default: `~/.config/sprout/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("SPROUT");
        env_opts.add_section("server");
        env_opts.add_section("database");
        env_opts.add_section("auth");
        env_opts.add_section("mail");
        env_opts.add_section("billing");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        // 1. Explicit --config flag
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        // 2. SPROUT_CONFIG env var
        if let Ok(path) = std::env::var("SPROUT_CONFIG") {
            return Some(PathBuf::from(path));
        }

        // 3. XDG default
        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sprout").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
