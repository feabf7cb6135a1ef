//! Configuration management for the image filter server.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables
//! - Sensible defaults for all optional settings
//!
//! # Commands
//!
//! - `serve` (default) - run the HTTP server
//! - `token` - print a signed JWT for local testing
//!
//! # Environment Variables
//!
//! - `HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 8082)
//! - `JWT_SECRET` - HS256 secret for bearer tokens
//! - `AUTH_ENABLED` - Require bearer tokens on `/filteredimage` (default: true)
//! - `FETCH_TIMEOUT_SECS` - Image download timeout (default: 30)
//! - `MAX_DOWNLOAD_BYTES` - Largest accepted source image (default: 20 MiB)
//! - `FILTER_OUTPUT_DIR` - Where filtered images are written (default: system temp dir)
//! - `CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::filter::{FilterConfig, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_DOWNLOAD_BYTES};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8082;

/// Default lifetime of tokens printed by the `token` command (24 hours).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86400;

/// Name of the directory created under the system temp dir for output files.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "image-filter-server";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Image Filter Server - greyscale filtering for public images.
#[derive(Parser, Debug, Clone)]
#[command(name = "image-filter-server")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Server options used when no subcommand is given.
    #[command(flatten)]
    pub serve: ServeConfig,
}

impl Cli {
    /// Resolve the command to run, defaulting to `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeConfig),

    /// Print a signed bearer token
    Token(TokenConfig),
}

/// Options for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Shared secret used to verify HS256 bearer tokens.
    ///
    /// If not provided and auth is enabled, the server will fail to start.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Require a bearer token on /filteredimage.
    ///
    /// WARNING: Only disable authentication in development/testing.
    #[arg(long, default_value_t = true, action = ArgAction::Set, env = "AUTH_ENABLED")]
    pub auth_enabled: bool,

    // =========================================================================
    // Filter Configuration
    // =========================================================================
    /// Timeout in seconds for downloading the source image.
    #[arg(long = "fetch-timeout", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, env = "FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: u64,

    /// Maximum size in bytes of a source image.
    #[arg(long, default_value_t = DEFAULT_MAX_DOWNLOAD_BYTES, env = "MAX_DOWNLOAD_BYTES")]
    pub max_download_bytes: u64,

    /// Directory for filtered images (defaults to a folder in the system temp dir).
    #[arg(long, env = "FILTER_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.auth_enabled && self.jwt_secret.as_deref().map_or(true, str::is_empty) {
            return Err(
                "Authentication is enabled but no secret provided. \
                 Set --jwt-secret or JWT_SECRET, or disable auth with --auth-enabled=false"
                    .to_string(),
            );
        }

        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout must be greater than 0".to_string());
        }

        if self.max_download_bytes == 0 {
            return Err("max_download_bytes must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the JWT secret, or an empty string if unset (call validate() first).
    pub fn jwt_secret_or_empty(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or("")
    }

    /// Directory for filtered images, resolving the default.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_OUTPUT_DIR_NAME))
    }

    /// Build the filter settings from this configuration.
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig::new(self.resolved_output_dir())
            .with_fetch_timeout(Duration::from_secs(self.fetch_timeout_secs))
            .with_max_download_bytes(self.max_download_bytes)
    }
}

/// Options for the `token` command.
#[derive(Args, Debug, Clone)]
pub struct TokenConfig {
    /// Shared secret used to sign the token.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Subject claim to embed.
    #[arg(long, default_value = "local-user")]
    pub subject: String,

    /// Token lifetime in seconds.
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_SECS)]
    pub ttl: u64,
}

impl TokenConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.is_empty() {
            return Err("Secret must not be empty. Set --secret or JWT_SECRET".to_string());
        }
        if self.ttl == 0 {
            return Err("ttl must be greater than 0".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
