//! HTTP server layer for the image filter service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │           GET /filteredimage?image_url={url}                    │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (requests)  │  │ (JWT bearer)│  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{auth_middleware, bearer_token, AuthError, JwtAuth, TokenClaims};
pub use handlers::{
    filtered_image_handler, root_handler, AppState, AuthErrorResponse, ErrorMessage,
    ErrorResponse, FilterRequestError, FilteredImageQuery, ValidatedImageUrl, USAGE_MESSAGE,
};
pub use routes::{create_router, RouterConfig};
