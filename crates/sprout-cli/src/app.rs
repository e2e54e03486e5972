//! Application wiring and command dispatch.
//!
//! [`SproutApp`] loads configuration once, then dispatches the parsed
//! command. `serve` is the only long-running path: it connects to Postgres,
//! provisions the schema, assembles the shared [`ApiState`], and hands off
//! to the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use sprout_api::{server, ApiState, SproutConfig};
use sprout_auth::TokenIdentityProvider;
use sprout_billing::HttpPaymentProcessor;
use sprout_core::{Error, Identity, Result, Role};
use sprout_mailer::HttpMailer;
use sprout_storage::{
    Database, PgChildStore, PgNotificationStore, PgProfileStore, PgSubscriptionStore,
    PgTelemetryStore,
};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::cli::{CliArgs, Command, ConfigAction, TokenAction};

/// The CLI application: loaded configuration plus command dispatch.
pub struct SproutApp {
    config: SproutConfig,
    config_path: Option<String>,
}

impl SproutApp {
    /// Load configuration per the `--config` flag and environment.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let config = SproutConfig::load(args.config.as_deref())?;
        Ok(Self {
            config,
            config_path: args.config.clone(),
        })
    }

    /// Initialise tracing-based logging.
    ///
    /// `RUST_LOG` wins when set; otherwise the verbosity flags pick the
    /// filter level.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Run the parsed command.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(Command::Serve { port }) => self.serve(port).await,
            Some(Command::Provision) => self.provision().await,
            Some(Command::Version) => {
                println!("sprout {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            Some(Command::Health) => self.health().await,
            Some(Command::Config(cmd)) => self.handle_config(cmd.command),
            Some(Command::Token(cmd)) => self.handle_token(cmd.command),
            None => {
                println!("sprout {}. Use --help for usage.", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }

    async fn serve(&self, port_override: Option<u16>) -> Result<()> {
        let state = self.build_state().await?;
        let port = port_override.unwrap_or(self.config.server.port);
        server::serve(state, &self.config.server.host, port).await
    }

    /// Connect, provision, and assemble the shared request state.
    async fn build_state(&self) -> Result<ApiState> {
        let database = Database::connect(&self.config.database.url).await?;
        database.provision().await?;
        let pool = database.pool().clone();

        ApiState::builder()
            .identity(Arc::new(TokenIdentityProvider::new(
                &self.config.auth.token_secret,
            )))
            .profiles(Arc::new(PgProfileStore::new(pool.clone())))
            .children(Arc::new(PgChildStore::new(pool.clone())))
            .subscriptions(Arc::new(PgSubscriptionStore::new(pool.clone())))
            .notifications(Arc::new(PgNotificationStore::new(pool.clone())))
            .telemetry(Arc::new(PgTelemetryStore::new(pool)))
            .payments(Arc::new(HttpPaymentProcessor::new(
                self.config.billing.base_url.clone(),
                self.config.billing.secret_key.clone(),
            )))
            .mailer(Arc::new(HttpMailer::new(
                self.config.mail.endpoint.clone(),
                self.config.mail.api_key.clone(),
                self.config.mail.from.clone(),
            )))
            .alert_recipient(self.config.mail.alert_recipient.clone())
            .build()
    }

    async fn provision(&self) -> Result<()> {
        let database = Database::connect(&self.config.database.url).await?;
        database.provision().await?;
        println!("Database schema provisioned.");
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        Database::connect(&self.config.database.url).await?;
        println!("Database reachable.");
        Ok(())
    }

    fn handle_config(&self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Path => {
                match SproutConfig::resolve_config_path(self.config_path.as_deref()) {
                    Some(path) => {
                        let exists = path.exists();
                        println!("{}", path.display());
                        if !exists {
                            eprintln!(
                                "(file does not exist; run `sprout config init` to create it)"
                            );
                        }
                        Ok(())
                    }
                    None => Err(Error::config(
                        "Could not determine config directory for this platform",
                    )),
                }
            }
            ConfigAction::Show => {
                print!("{}", self.config.to_toml_string()?);
                Ok(())
            }
            ConfigAction::Init { file, force } => config_init(file.as_deref(), force),
        }
    }

    fn handle_token(&self, action: TokenAction) -> Result<()> {
        match action {
            TokenAction::Mint {
                id,
                email,
                role,
                ttl_hours,
            } => {
                let role = Role::parse(&role)
                    .ok_or_else(|| Error::validation("Role must be one of parent, child, admin"))?;
                let identity = Identity::new(id.unwrap_or_else(Uuid::new_v4), email, role);

                let provider = TokenIdentityProvider::new(&self.config.auth.token_secret);
                let token = provider.mint(&identity, Duration::hours(ttl_hours))?;
                println!("{token}");
                Ok(())
            }
        }
    }
}

/// Create a default configuration file.
fn config_init(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => SproutConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::config(format!("cannot create {}: {e}", parent.display())))?;
    }

    let toml_str = SproutConfig::default().to_toml_string()?;
    std::fs::write(&path, &toml_str)
        .map_err(|e| Error::config(format!("cannot write {}: {e}", path.display())))?;

    println!("Config file created at {}", path.display());
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn app_from(args: &[&str]) -> (SproutApp, CliArgs) {
        let args = CliArgs::parse_from(args);
        let app = SproutApp::from_args(&args).unwrap();
        (app, args)
    }

    #[test]
    fn test_from_args_uses_defaults() {
        let (app, _) = app_from(&["sprout"]);
        assert_eq!(app.config.server.port, 3000);
        assert_eq!(app.config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_from_args_reads_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                [server]
                port = 9090
            "#,
        )
        .unwrap();

        let (app, _) = app_from(&["sprout", "--config", path.to_str().unwrap()]);
        assert_eq!(app.config.server.port, 9090);
    }

    #[tokio::test]
    async fn test_run_version_command() {
        let (app, args) = app_from(&["sprout", "version"]);
        assert!(app.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_no_command() {
        let (app, args) = app_from(&["sprout"]);
        assert!(app.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_config_show() {
        let (app, args) = app_from(&["sprout", "config", "show"]);
        assert!(app.run(args).await.is_ok());
    }

    #[test]
    fn test_token_mint_known_role() {
        let (app, _) = app_from(&["sprout"]);
        let action = TokenAction::Mint {
            id: None,
            email: "p@example.com".to_string(),
            role: "parent".to_string(),
            ttl_hours: 1,
        };
        assert!(app.handle_token(action).is_ok());
    }

    #[test]
    fn test_token_mint_rejects_unknown_role() {
        let (app, _) = app_from(&["sprout"]);
        let action = TokenAction::Mint {
            id: None,
            email: "p@example.com".to_string(),
            role: "teacher".to_string(),
            ttl_hours: 1,
        };

        let err = app.handle_token(action).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_init_logging_does_not_panic() {
        let (app, _) = app_from(&["sprout"]);
        app.init_logging(false, false);
        app.init_logging(true, false);
        app.init_logging(false, true);
    }

    // ------------------------------------------------------------------------
    // config_init
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sprout").join("config.toml");

        config_init(Some(path.to_str().unwrap()), false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[server]"));
        assert!(content.contains("[database]"));
    }

    #[test]
    fn test_config_init_refuses_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "existing").unwrap();

        let err = config_init(Some(path.to_str().unwrap()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }

    #[test]
    fn test_config_init_force_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "old content").unwrap();

        config_init(Some(path.to_str().unwrap()), true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[server]"));
    }
}
