//! # Image Filter Server
//!
//! A small HTTP service that downloads a publicly reachable image, applies a
//! greyscale filter and returns the result.
//!
//! ## Features
//!
//! - **Extension allow-list**: only `bmp`, `gif`, `jpeg`, `jpg`, `png` and `tiff` URLs are fetched
//! - **Bounded downloads**: request timeout and maximum body size
//! - **Scoped artifacts**: filtered files are deleted once the response is sent
//! - **Authentication**: optional HS256 JWT bearer tokens
//!
//! ## Architecture
//!
//! - [`filter`] - URL validation, download and filtering, local artifacts
//! - [`server`] - Axum handlers, auth middleware and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use image_filter_server::{create_router, FilterConfig, GreyscaleFilter, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let filter = GreyscaleFilter::new(FilterConfig::new("/tmp/image-filter-server"))?;
//!     let router = create_router(filter, RouterConfig::new("my-secret-key"));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8082").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod server;

// Re-export commonly used types
pub use config::{Cli, Command, ServeConfig, TokenConfig};
pub use error::FilterError;
pub use filter::{
    apply_filter, delete_local_files, is_valid_image_url, FilterConfig, FilteredImage,
    GreyscaleFilter, ImageFilter, SUPPORTED_EXTENSIONS,
};
pub use server::{
    auth_middleware, create_router, filtered_image_handler, root_handler, AppState, AuthError,
    AuthErrorResponse, ErrorResponse, FilterRequestError, FilteredImageQuery, JwtAuth,
    RouterConfig, TokenClaims, USAGE_MESSAGE,
};
