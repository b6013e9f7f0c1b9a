//! Image reference resolution.
//!
//! Entities refer to images by identifier only. The file behind an
//! identifier lives in the entity's own directory:
//!
//! ```text
//! <entity>/images/compressed/<id>.webp
//! <entity>/images/original/<id>.webp
//! ```
//!
//! Resolved paths are absolute and machine-specific. They drive asset
//! copying during a build and are never written to the datafile.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const IMAGE_EXTENSION: &str = "webp";

/// Which variant of every image a build ships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Compressed,
    Original,
}

impl Quality {
    pub fn dir_name(self) -> &'static str {
        match self {
            Quality::Compressed => "compressed",
            Quality::Original => "original",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compressed" | "1" => Ok(Quality::Compressed),
            "original" | "2" => Ok(Quality::Original),
            other => Err(format!(
                "unknown image quality {other:?} (expected \"compressed\" or \"original\")"
            )),
        }
    }
}

/// Expected location of image `id`, without touching the filesystem.
pub fn image_path(entity_dir: &Path, id: &str, quality: Quality) -> PathBuf {
    entity_dir
        .join("images")
        .join(quality.dir_name())
        .join(format!("{id}.{IMAGE_EXTENSION}"))
}

/// Absolute path of image `id`, which must exist.
pub fn resolve_image(entity_dir: &Path, id: &str, quality: Quality) -> Result<PathBuf, ParseError> {
    let path = image_path(entity_dir, id, quality);
    let path = std::path::absolute(&path).map_err(|e| ParseError::io(&path, e))?;
    if !path.is_file() {
        return Err(ParseError::ImageNotFound(path));
    }
    Ok(path)
}

/// Resolve content images in declaration order, then the icon if any.
pub fn resolve_images(
    entity_dir: &Path,
    ids: &[String],
    icon: Option<&str>,
    quality: Quality,
) -> Result<Vec<PathBuf>, ParseError> {
    ids.iter()
        .map(String::as_str)
        .chain(icon)
        .map(|id| resolve_image(entity_dir, id, quality))
        .collect()
}
