//! Router configuration for the image filter server.
//!
//! This module defines the HTTP routes and applies middleware for authentication
//! and CORS.
//!
//! # Route Structure
//!
//! ```text
//! /                                   - Usage hint (public)
//! /filteredimage?image_url={url}      - Filter endpoint (protected)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use image_filter_server::filter::{FilterConfig, GreyscaleFilter};
//! use image_filter_server::server::routes::{create_router, RouterConfig};
//!
//! let filter = GreyscaleFilter::new(FilterConfig::new("/tmp/image-filter-server"))?;
//! let router = create_router(filter, RouterConfig::new("my-secret-key"));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8082").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{auth_middleware, JwtAuth};
use super::handlers::{filtered_image_handler, root_handler, AppState};
use crate::filter::ImageFilter;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Shared secret for JWT verification
    pub auth_secret: String,

    /// Whether `/filteredimage` requires a bearer token
    pub auth_enabled: bool,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given JWT secret.
    ///
    /// By default:
    /// - Authentication is enabled
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new(auth_secret: impl Into<String>) -> Self {
        Self {
            auth_secret: auth_secret.into(),
            auth_enabled: true,
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Create a configuration with authentication disabled.
    ///
    /// **Warning**: This should only be used for development/testing.
    pub fn without_auth() -> Self {
        Self {
            auth_secret: String::new(),
            auth_enabled: false,
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - Public routes (`/`)
/// - The filter route, behind JWT auth when enabled
/// - CORS configuration
/// - Request tracing (optional)
pub fn create_router<F>(filter: F, config: RouterConfig) -> Router
where
    F: ImageFilter,
{
    let app_state = AppState::new(filter);
    let cors = build_cors_layer(&config);

    let router = if config.auth_enabled {
        build_protected_router(app_state, JwtAuth::new(&config.auth_secret), cors)
    } else {
        build_public_router(app_state, cors)
    };

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build router with authentication on the filter route.
fn build_protected_router<F>(app_state: AppState<F>, auth: JwtAuth, cors: CorsLayer) -> Router
where
    F: ImageFilter,
{
    // route_layer keeps unmatched paths returning 404 instead of 401
    let protected_routes = Router::new()
        .route("/filteredimage", get(filtered_image_handler::<F>))
        .route_layer(middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(app_state);

    let public_routes = Router::new().route("/", get(root_handler));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(cors)
}

/// Build router without authentication (for development/testing).
fn build_public_router<F>(app_state: AppState<F>, cors: CorsLayer) -> Router
where
    F: ImageFilter,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/filteredimage", get(filtered_image_handler::<F>))
        .with_state(app_state)
        .layer(cors)
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
