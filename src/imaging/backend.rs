//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between rendition planning and
//! pixel work. It covers the three operations the resizer needs: identify,
//! resize, and crop-to-fit. Each call decodes the source and writes the
//! encoded output, so no image handle crosses the seam. Removal of written
//! outputs also goes through the backend, since it owns those files.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{CropParams, ResizeParams};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures reported by a backend.
///
/// The split matters to callers: [`BackendError::Decode`] means the source
/// could not be read, the other variants mean the output could not be written.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("Failed to encode {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<Dimensions> for (u32, u32) {
    fn from(dims: Dimensions) -> Self {
        (dims.width, dims.height)
    }
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize the whole image to exactly `width`×`height` and save it.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;

    /// Scale to cover `width`×`height`, center-crop the overflow, and save.
    fn crop_to_fit(&self, params: &CropParams) -> Result<(), BackendError>;

    /// Delete a previously written output.
    fn remove_output(&self, path: &Path) -> std::io::Result<()> {
        std::fs::remove_file(path)
    }
}
