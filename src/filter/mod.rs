//! Image filtering.
//!
//! - [`validate`] - extension allow-list for incoming image URLs
//! - [`processor`] - download, greyscale filter and JPEG encoding
//! - [`artifact`] - filtered files on local storage and their cleanup

pub mod artifact;
pub mod processor;
pub mod validate;

pub use artifact::{delete_local_files, FilteredImage};
pub use processor::{
    apply_filter, FilterConfig, GreyscaleFilter, ImageFilter, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_MAX_DOWNLOAD_BYTES, FILTERED_IMAGE_SIZE, FILTERED_JPEG_QUALITY,
};
pub use validate::{is_valid_image_url, SUPPORTED_EXTENSIONS};
