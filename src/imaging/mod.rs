//! Image transcoding: pure Rust, no ImageMagick.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize → WebP** | Lanczos3 + lossless WebP encoder |
//! | **Square icon** | `resize_to_fill` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Mini icons and per-place optimization on top of a backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{
    MINI_ICON_PREFIX, OptimizeConfig, OptimizeError, OptimizeReport, create_mini_icon,
    optimize_place,
};
pub use params::{ResizeParams, SquareParams};
pub use rust_backend::RustBackend;
