//! Image URL validation.
//!
//! A URL is accepted when its trailing file extension (the text after the
//! last `.`) is one of the supported image formats. Matching ignores ASCII
//! case, so `photo.JPG` and `photo.jpg` are treated the same.

/// File extensions accepted by [`is_valid_image_url`].
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["bmp", "gif", "jpeg", "jpg", "png", "tiff"];

/// Check whether `url` ends with a supported image file extension.
///
/// Presence of the parameter is checked by the caller; this function only
/// looks at the extension and never fails.
pub fn is_valid_image_url(url: &str) -> bool {
    match url.rsplit_once('.') {
        Some((_, extension)) => SUPPORTED_EXTENSIONS
            .iter()
            .any(|supported| extension.eq_ignore_ascii_case(supported)),
        None => false,
    }
}
