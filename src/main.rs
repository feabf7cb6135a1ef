//! Image Filter Server - greyscale filtering for public images.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_filter_server::{
    config::{Cli, Command, ServeConfig, TokenConfig},
    filter::GreyscaleFilter,
    server::{create_router, JwtAuth, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Token(config) => run_token(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let filter_config = config.filter_config();

    print_banner();

    info!("Configuration:");
    info!("  Output dir: {}", filter_config.output_dir.display());
    info!("  Fetch timeout: {}s", config.fetch_timeout_secs);
    info!("  Max download: {} bytes", config.max_download_bytes);

    if config.auth_enabled {
        info!("  Auth: enabled");
    } else {
        warn!("  Auth: DISABLED - /filteredimage is publicly accessible");
        warn!("        Enable for production: --auth-enabled=true --jwt-secret=<secret>");
    }

    let filter = match GreyscaleFilter::new(filter_config) {
        Ok(filter) => filter,
        Err(e) => {
            error!("Failed to create image filter: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let router = create_router(filter, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  server running http://localhost:{}", config.port);
    info!("  press CTRL+C to stop server");
    info!("");
    info!("  Try:");
    info!(
        "    curl 'http://localhost:{}/filteredimage?image_url=<url>'",
        config.port
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Print the startup banner.
fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    info!("");
    info!("  Image Filter Server v{}", version);
}

/// Wait for CTRL+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "image_filter_server=debug,tower_http=debug"
    } else {
        "image_filter_server=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = if config.auth_enabled {
        RouterConfig::new(config.jwt_secret_or_empty())
    } else {
        RouterConfig::without_auth()
    };

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Token Command
// =============================================================================

fn run_token(config: TokenConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let auth = JwtAuth::new(&config.secret);
    match auth.sign_with_ttl(&config.subject, Duration::from_secs(config.ttl)) {
        Ok(token) => {
            println!("{}", token);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to sign token: {}", e);
            ExitCode::FAILURE
        }
    }
}
