//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how*. They are the interface
//! between [`operations`](super::operations), which decides which images to
//! create, and the [`backend`](super::backend), which does the pixel work.
//!
//! - [`ResizeParams`]: source, output path and exact target dimensions.
//! - [`SquareParams`]: source, output path and edge of a center-cropped square.

use std::path::PathBuf;

/// Parameters for a resize that keeps the whole picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Parameters for a square icon: resize to fill, then center crop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub size: u32,
}
