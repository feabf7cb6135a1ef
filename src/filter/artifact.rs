//! Local filtered-image files and their cleanup.
//!
//! A [`FilteredImage`] owns one file on local storage. The file is removed
//! when the value is dropped, so whoever holds the artifact last (usually the
//! response body stream) decides when it disappears.

use std::path::{Path, PathBuf};

use tracing::debug;

/// A filtered image written to local storage.
///
/// Deleting the file is best-effort: failures are logged and ignored.
#[derive(Debug)]
pub struct FilteredImage {
    path: PathBuf,
}

impl FilteredImage {
    /// Take ownership of an existing file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// MIME type inferred from the file extension.
    ///
    /// Falls back to `application/octet-stream` for unknown extensions.
    pub fn content_type(&self) -> &'static str {
        image::ImageFormat::from_path(&self.path)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream")
    }
}

impl Drop for FilteredImage {
    fn drop(&mut self) {
        delete_local_files([self.path.as_path()]);
    }
}

/// Delete local files, ignoring any that cannot be removed.
pub fn delete_local_files<I, P>(paths: I)
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for path in paths {
        let path = path.as_ref();
        match std::fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Deleted local file"),
            Err(e) => debug!(path = %path.display(), "Failed to delete local file: {}", e),
        }
    }
}
