//! Image download and filtering.
//!
//! # Pipeline
//!
//! ```text
//! image_url ──GET──> bytes ──decode──> resize 256x256 ──> greyscale ──> JPEG q60 ──> local file
//! ```
//!
//! Downloads are bounded by a request timeout and a maximum body size.
//! Decoding, filtering and encoding are CPU-bound and run on the blocking
//! thread pool so they never stall the async runtime.

use std::error::Error as StdError;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::artifact::FilteredImage;
use crate::error::FilterError;

/// Width and height of every filtered image, in pixels.
pub const FILTERED_IMAGE_SIZE: u32 = 256;

/// JPEG quality used when writing filtered images.
pub const FILTERED_JPEG_QUALITY: u8 = 60;

/// Default timeout for downloading the source image.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default upper bound on the size of a downloaded image (20 MiB).
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 20 * 1024 * 1024;

// =============================================================================
// Filter Trait
// =============================================================================

/// Produces a filtered image on local storage from a remote image URL.
///
/// The request handler only depends on this trait, which keeps the HTTP layer
/// testable without network access.
#[async_trait]
pub trait ImageFilter: Send + Sync + 'static {
    /// Download the image at `url`, filter it and store the result locally.
    async fn filter_image_from_url(&self, url: &str) -> Result<FilteredImage, FilterError>;
}

// =============================================================================
// Configuration
// =============================================================================

/// Settings for [`GreyscaleFilter`].
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Directory where filtered images are written
    pub output_dir: PathBuf,

    /// Timeout for the whole download request
    pub fetch_timeout: Duration,

    /// Maximum accepted size of the source image in bytes
    pub max_download_bytes: u64,
}

impl FilterConfig {
    /// Create a configuration writing into `output_dir` with default limits.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
        }
    }

    /// Set the download timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the maximum download size in bytes.
    pub fn with_max_download_bytes(mut self, limit: u64) -> Self {
        self.max_download_bytes = limit;
        self
    }
}

// =============================================================================
// Greyscale Filter
// =============================================================================

/// Downloads images over HTTP(S) and writes a 256x256 greyscale JPEG.
#[derive(Debug, Clone)]
pub struct GreyscaleFilter {
    client: reqwest::Client,
    config: FilterConfig,
}

impl GreyscaleFilter {
    /// Create a filter with its own HTTP client.
    pub fn new(config: FilterConfig) -> Result<Self, FilterError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| FilterError::Fetch(error_chain(&e)))?;

        Ok(Self { client, config })
    }

    /// Filter configuration in use.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Download the source image, enforcing the size limit.
    async fn download(&self, url: &str) -> Result<Bytes, FilterError> {
        let url = Url::parse(url).map_err(|e| FilterError::InvalidUrl(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(FilterError::InvalidUrl(format!(
                    "unsupported scheme '{}'",
                    other
                )))
            }
        }

        debug!(url = %url, "Downloading source image");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FilterError::Fetch(error_chain(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FilterError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let limit = self.config.max_download_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(FilterError::TooLarge { limit });
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FilterError::Fetch(error_chain(&e)))?
        {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(FilterError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }
}

#[async_trait]
impl ImageFilter for GreyscaleFilter {
    async fn filter_image_from_url(&self, url: &str) -> Result<FilteredImage, FilterError> {
        let source = self.download(url).await?;
        let source_len = source.len();

        let encoded = tokio::task::spawn_blocking(move || apply_filter(&source))
            .await
            .map_err(|e| FilterError::Encode(format!("filter task failed: {}", e)))??;

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|e| FilterError::Storage(e.to_string()))?;

        // Owning the path before writing means a partial file is removed on error
        let artifact = FilteredImage::new(
            self.config
                .output_dir
                .join(format!("filtered.{}.jpg", Uuid::new_v4())),
        );
        tokio::fs::write(artifact.path(), &encoded)
            .await
            .map_err(|e| FilterError::Storage(e.to_string()))?;

        debug!(
            source_bytes = source_len,
            output_bytes = encoded.len(),
            path = %artifact.path().display(),
            "Filtered image written"
        );

        Ok(artifact)
    }
}

/// Decode `source`, resize it to 256x256, convert to greyscale and encode as JPEG.
pub fn apply_filter(source: &[u8]) -> Result<Vec<u8>, FilterError> {
    let img = image::load_from_memory(source).map_err(|e| FilterError::Decode(e.to_string()))?;

    // Encode the GrayImage itself so the JPEG has a single component
    let filtered = img
        .resize_exact(FILTERED_IMAGE_SIZE, FILTERED_IMAGE_SIZE, FilterType::Triangle)
        .to_luma8();

    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, FILTERED_JPEG_QUALITY);
    encoder
        .encode_image(&filtered)
        .map_err(|e| FilterError::Encode(e.to_string()))?;

    Ok(output)
}

/// Render an error with its sources, e.g. "error sending request: connection refused".
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// =============================================================================
// Tests
// =============================================================================
