//! Image transcoding backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the build needs:
//! identify, resize and square. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::params::{ResizeParams, SquareParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn is_square(self) -> bool {
        self.width == self.height
    }
}

/// Trait for image transcoding backends.
///
/// Outputs are written to the path in the params; the format follows its
/// extension.
pub trait ImageBackend {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize to exact dimensions.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;

    /// Resize to fill a square, then center crop.
    fn square(&self, params: &SquareParams) -> Result<(), BackendError>;
}
