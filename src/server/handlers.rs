//! HTTP request handlers for the image filter API.
//!
//! # Endpoints
//!
//! - `GET /` - Usage hint
//! - `GET /filteredimage?image_url={url}` - Filter a public image

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::error::FilterError;
use crate::filter::{is_valid_image_url, ImageFilter};

/// Body of `GET /`.
pub const USAGE_MESSAGE: &str = "try GET /filteredimage?image_url={{}}";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the image filter.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<F: ImageFilter> {
    /// Filter used to produce images for `/filteredimage`
    pub filter: Arc<F>,
}

impl<F: ImageFilter> AppState<F> {
    /// Create a new application state with the given filter.
    pub fn new(filter: F) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }
}

impl<F: ImageFilter> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            filter: Arc::clone(&self.filter),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for `/filteredimage`.
#[derive(Debug, Default, Deserialize)]
pub struct FilteredImageQuery {
    /// URL of a publicly accessible image
    #[serde(default)]
    pub image_url: Option<String>,
}

impl FilteredImageQuery {
    /// Check that `image_url` is present and has a supported extension.
    pub fn validate(self) -> Result<ValidatedImageUrl, FilterRequestError> {
        let url = match self.image_url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(FilterRequestError::MissingImageUrl),
        };

        if !is_valid_image_url(&url) {
            return Err(FilterRequestError::UnsupportedExtension);
        }

        Ok(ValidatedImageUrl(url))
    }
}

/// An image URL that passed presence and extension checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImageUrl(String);

impl ValidatedImageUrl {
    /// The URL as received in the query string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned by `/filteredimage`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorMessage>,
}

/// A single error entry.
#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorResponse {
    /// Create a response holding one error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorMessage {
                message: message.into(),
            }],
        }
    }
}

/// JSON body returned by the auth middleware.
///
/// `auth` is only present (and `false`) when a token was supplied but
/// failed verification.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<bool>,

    pub message: String,
}

impl AuthErrorResponse {
    /// Body without the `auth` field.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            auth: None,
            message: message.into(),
        }
    }

    /// Body with `"auth": false`.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            auth: Some(false),
            message: message.into(),
        }
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Reasons a `/filteredimage` request can fail.
#[derive(Debug)]
pub enum FilterRequestError {
    /// `image_url` is absent or empty
    MissingImageUrl,

    /// `image_url` does not end with a supported extension
    UnsupportedExtension,

    /// Download or filtering failed
    ProcessingFailed(FilterError),
}

impl std::fmt::Display for FilterRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterRequestError::MissingImageUrl => write!(
                f,
                "image_url not provided. Try GET /filteredimage?image_url={{{{}}}}"
            ),
            FilterRequestError::UnsupportedExtension => write!(
                f,
                "provided url doesn't seem to have a supported file extension. \
                 Accepted image formats are [bmp|gif|jpeg|jpg|png|tiff]"
            ),
            FilterRequestError::ProcessingFailed(err) => {
                write!(f, "image could not be processed. {}", err)
            }
        }
    }
}

impl std::error::Error for FilterRequestError {}

impl From<FilterError> for FilterRequestError {
    fn from(err: FilterError) -> Self {
        FilterRequestError::ProcessingFailed(err)
    }
}

/// Convert FilterRequestError to HTTP response.
///
/// Rejected input is logged at DEBUG, processing failures at WARN since they
/// usually point at the remote host rather than this service.
impl IntoResponse for FilterRequestError {
    fn into_response(self) -> Response {
        let status = match &self {
            FilterRequestError::MissingImageUrl => StatusCode::BAD_REQUEST,
            FilterRequestError::UnsupportedExtension
            | FilterRequestError::ProcessingFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let message = self.to_string();

        match &self {
            FilterRequestError::ProcessingFailed(_) => {
                warn!(status = status.as_u16(), "Filter failed: {}", message);
            }
            _ => {
                debug!(status = status.as_u16(), "Rejected request: {}", message);
            }
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle filter requests.
///
/// # Endpoint
///
/// `GET /filteredimage?image_url={url}`
///
/// # Response
///
/// - `200 OK`: the filtered image, streamed from local storage
/// - `400 Bad Request`: `image_url` missing
/// - `422 Unprocessable Entity`: unsupported extension, or the image could
///   not be downloaded or filtered
///
/// The filtered file is deleted once the response body has been sent or
/// dropped.
pub async fn filtered_image_handler<F: ImageFilter>(
    State(state): State<AppState<F>>,
    query: Result<Query<FilteredImageQuery>, QueryRejection>,
) -> Result<Response, FilterRequestError> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            debug!("Unparseable query string: {}", rejection);
            FilteredImageQuery::default()
        }
    };

    let image_url = query.validate()?;

    let artifact = state
        .filter
        .filter_image_from_url(image_url.as_str())
        .await?;

    let file = tokio::fs::File::open(artifact.path())
        .await
        .map_err(|e| FilterError::Storage(e.to_string()))?;
    let content_length = file.metadata().await.ok().map(|m| m.len());
    let content_type = artifact.content_type();

    // The artifact lives as long as the body stream and is deleted with it
    let body = ReaderStream::new(file).map(move |chunk| {
        let _artifact = &artifact;
        chunk
    });

    let mut response = Body::from_stream(body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Some(len) = content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    Ok(response)
}

/// Handle requests to the root path.
///
/// # Endpoint
///
/// `GET /`
pub async fn root_handler() -> &'static str {
    USAGE_MESSAGE
}

// =============================================================================
// Tests
// =============================================================================
