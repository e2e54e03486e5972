//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};
use uuid::Uuid;

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level arguments for the `sprout` binary.
#[derive(Parser, Debug)]
#[command(name = "sprout", author, version, about = "Sprout platform service", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "SPROUT_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the API server.
    Serve {
        /// Port to listen on; overrides the configured value.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create missing database tables and indexes.
    Provision,

    /// Print version information.
    Version,

    /// Check that the configured database is reachable.
    Health,

    /// Configuration operations.
    Config(ConfigCommand),

    /// Bearer-token operations.
    Token(TokenCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Print the effective configuration as TOML.
    Show,

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to the platform config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Token-specific subcommands.
#[derive(Parser, Debug)]
pub struct TokenCommand {
    /// Token subcommand to execute.
    #[command(subcommand)]
    pub command: TokenAction,
}

/// Available token subcommands.
#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Mint a signed bearer token for local testing.
    Mint {
        /// Account id; random when omitted.
        #[arg(long)]
        id: Option<Uuid>,

        /// Email claim.
        #[arg(long)]
        email: String,

        /// Role claim: parent, child, or admin.
        #[arg(long, default_value = "parent")]
        role: String,

        /// Token lifetime in hours.
        #[arg(long, default_value = "24")]
        ttl_hours: i64,
    },
}

// ============================================================================
// Tests
// ============================================================================
