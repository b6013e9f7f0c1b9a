//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take
//! configuration, compute parameters, and call the backend.
//!
//! ## Place optimization
//!
//! Authors drop full-size photos into `images/original/`; the app ships
//! WebP files from `images/compressed/`:
//!
//! ```text
//! places/kosciol/images/
//! ├── original/
//! │   ├── ic_kosciol.jpg   → compressed/ic_kosciol.webp   (square, icon_size)
//! │   ├── front.jpg        → compressed/front.webp        (scale_percent)
//! │   └── .DS_Store          skipped
//! └── compressed/
//! ```

use super::backend::{BackendError, ImageBackend};
use super::calculations::scaled_dimensions;
use super::params::{ResizeParams, SquareParams};
use super::rust_backend::{is_supported_input, supported_input_extensions};
use crate::images::IMAGE_EXTENSION;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const MINI_ICON_PREFIX: &str = "mini_";

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} does not exist", .0.display())]
    MissingOriginals(PathBuf),
    #[error("no icon {name}.* in {}", dir.display())]
    MissingIcon { name: String, dir: PathBuf },
    #[error("icon {} is {width}x{height}, expected a square", path.display())]
    NonSquareIcon {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    #[error("image {}: {source}", path.display())]
    Backend {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> OptimizeError + '_ {
    move |source| OptimizeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn backend_error(path: &Path) -> impl FnOnce(BackendError) -> OptimizeError + '_ {
    move |source| OptimizeError::Backend {
        path: path.to_path_buf(),
        source,
    }
}

/// Configuration for optimizing one place's images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeConfig {
    /// Edge of the compressed square icon.
    pub icon_size: u32,
    /// Scale of compressed content images, in percent of the original.
    pub scale_percent: u32,
    /// Whether to produce the icon at all.
    pub icons: bool,
    pub icon_prefix: String,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            icon_size: 512,
            scale_percent: 25,
            icons: true,
            icon_prefix: "ic_".to_string(),
        }
    }
}

/// What an optimization pass wrote and what it left alone.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OptimizeReport {
    pub icon: Option<PathBuf>,
    pub images: Vec<PathBuf>,
    /// Files in `images/original/` with no decoder.
    pub skipped: Vec<PathBuf>,
}

/// Write a `size` square of `source` into `output_dir` as `mini_<name>`.
pub fn create_mini_icon<B: ImageBackend + ?Sized>(
    backend: &B,
    source: &Path,
    output_dir: &Path,
    size: u32,
) -> Result<PathBuf, BackendError> {
    let name = source
        .file_name()
        .ok_or_else(|| {
            BackendError::ProcessingFailed(format!("no file name in {}", source.display()))
        })?;
    let output = output_dir.join(format!("{MINI_ICON_PREFIX}{}", name.to_string_lossy()));
    backend.square(&SquareParams {
        source: source.to_path_buf(),
        output: output.clone(),
        size,
    })?;
    Ok(output)
}

/// Produce `images/compressed/*.webp` for the place at `place_dir`.
///
/// The place id is the directory name; its icon is
/// `images/original/<icon_prefix><id>.<ext>` and must be square. Hidden files
/// and other icon-prefixed files are not content images.
pub fn optimize_place(
    place_dir: &Path,
    backend: &impl ImageBackend,
    config: &OptimizeConfig,
) -> Result<OptimizeReport, OptimizeError> {
    let original_dir = place_dir.join("images").join("original");
    if !original_dir.is_dir() {
        return Err(OptimizeError::MissingOriginals(original_dir));
    }
    let compressed_dir = place_dir.join("images").join("compressed");
    if !compressed_dir.exists() {
        fs::create_dir_all(&compressed_dir).map_err(io_error(&compressed_dir))?;
        info!("created {}", compressed_dir.display());
    }

    let mut report = OptimizeReport::default();
    if config.icons {
        let place_id = place_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        report.icon = Some(optimize_icon(
            backend,
            &original_dir,
            &compressed_dir,
            &format!("{}{place_id}", config.icon_prefix),
            config.icon_size,
        )?);
    }

    for source in original_files(&original_dir)? {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.starts_with('.') || name.starts_with(&config.icon_prefix) {
            continue;
        }
        if !is_supported_input(&source) {
            debug!("skipping {}: no decoder", source.display());
            report.skipped.push(source);
            continue;
        }
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(name);
        let output = compressed_dir.join(format!("{stem}.{IMAGE_EXTENSION}"));

        let dims = backend.identify(&source).map_err(backend_error(&source))?;
        let (width, height) = scaled_dimensions((dims.width, dims.height), config.scale_percent);
        backend
            .resize(&ResizeParams {
                source: source.clone(),
                output: output.clone(),
                width,
                height,
            })
            .map_err(backend_error(&source))?;
        debug!("optimized {} → {}", source.display(), output.display());
        report.images.push(output);
    }

    Ok(report)
}

fn optimize_icon(
    backend: &impl ImageBackend,
    original_dir: &Path,
    compressed_dir: &Path,
    icon_name: &str,
    size: u32,
) -> Result<PathBuf, OptimizeError> {
    let source = supported_input_extensions()
        .iter()
        .map(|ext| original_dir.join(format!("{icon_name}.{ext}")))
        .find(|path| path.is_file())
        .ok_or_else(|| OptimizeError::MissingIcon {
            name: icon_name.to_string(),
            dir: original_dir.to_path_buf(),
        })?;

    let dims = backend.identify(&source).map_err(backend_error(&source))?;
    if !dims.is_square() {
        return Err(OptimizeError::NonSquareIcon {
            path: source,
            width: dims.width,
            height: dims.height,
        });
    }

    let output = compressed_dir.join(format!("{icon_name}.{IMAGE_EXTENSION}"));
    backend
        .square(&SquareParams {
            source: source.clone(),
            output: output.clone(),
            size,
        })
        .map_err(backend_error(&source))?;
    Ok(output)
}

fn original_files(dir: &Path) -> Result<Vec<PathBuf>, OptimizeError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
