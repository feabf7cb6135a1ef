use thiserror::Error;

/// Errors that can occur while fetching and filtering a remote image.
///
/// The `Display` text of every variant is returned to clients verbatim,
/// so messages stay short and never include local paths.
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// The URL could not be parsed or uses a scheme other than http(s)
    #[error("invalid image url: {0}")]
    InvalidUrl(String),

    /// Network or connection error while downloading
    #[error("failed to fetch image: {0}")]
    Fetch(String),

    /// The remote server answered with a non-success status
    #[error("remote server responded with status {status}")]
    HttpStatus { status: u16 },

    /// The download exceeded the configured size limit
    #[error("image exceeds the maximum download size of {limit} bytes")]
    TooLarge { limit: u64 },

    /// The downloaded bytes are not a decodable image
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Re-encoding the filtered image failed
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// Writing the filtered image to local storage failed
    #[error("failed to store filtered image: {0}")]
    Storage(String),
}
