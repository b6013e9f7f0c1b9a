//! Datafile assembly.
//!
//! Builds one [`Datafile`] from a region's source directory. Entities are
//! parsed in a fixed order, and the generation timestamp is taken only after
//! every one of them parsed, so a failed build never reports a time:
//!
//! ```text
//! datafiles/datafile-rudy/
//!   meta/        → RegionMeta                      (required)
//!   sections/    → Vec<Section> (each with places) (required)
//!   tracks/      → Vec<Track>                      (optional)
//!   stories/     → Vec<Story>                      (optional)
//!   dayrooms/    → Vec<Dayroom>                    (optional)
//!                → place_count, generated_at, revision
//! ```
//!
//! Any entity failure aborts the build; there is no partial datafile.

use crate::images::Quality;
use crate::models::{
    Datafile, Dayroom, Meta, ParseContext, ParseError, RegionMeta, Section, Story, Track,
};
use crate::revision::{Revision, RevisionError};
use crate::walk::{Presence, parse_entity, walk_collection};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("region id is empty")]
    EmptyRegionId,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("revision error: {0}")]
    Revision(#[from] RevisionError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub base_language: String,
    pub quality: Quality,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            base_language: "pl".to_string(),
            quality: Quality::Compressed,
        }
    }
}

/// Reject an empty region id before any filesystem work.
pub fn check_region_id(region_id: &str) -> Result<&str, GenerateError> {
    if region_id.trim().is_empty() {
        return Err(GenerateError::EmptyRegionId);
    }
    Ok(region_id)
}

/// Source directory of `region_id` inside the database.
pub fn region_dir(database_dir: &Path, region_id: &str) -> Result<PathBuf, GenerateError> {
    let region_id = check_region_id(region_id)?;
    Ok(database_dir.join(format!("datafile-{region_id}")))
}

/// Assemble the datafile of the region at `region_dir`.
pub fn generate(
    region_dir: &Path,
    options: &GenerateOptions,
    revision: Revision,
) -> Result<Datafile, GenerateError> {
    generate_at(region_dir, options, revision, Utc::now)
}

/// [`generate`] with an explicit clock.
pub fn generate_at(
    region_dir: &Path,
    options: &GenerateOptions,
    revision: Revision,
    now: impl FnOnce() -> DateTime<Utc>,
) -> Result<Datafile, GenerateError> {
    let ctx = ParseContext::new(options.base_language.as_str(), options.quality);

    let region: RegionMeta = parse_entity(&region_dir.join("meta"), &ctx)?;
    info!("parsing region {}", region.region_id);
    let sections: Vec<Section> =
        walk_collection(&region_dir.join("sections"), Presence::Required, &ctx)?;
    let tracks: Vec<Track> = walk_collection(&region_dir.join("tracks"), Presence::Optional, &ctx)?;
    let stories: Vec<Story> =
        walk_collection(&region_dir.join("stories"), Presence::Optional, &ctx)?;
    let dayrooms: Vec<Dayroom> =
        walk_collection(&region_dir.join("dayrooms"), Presence::Optional, &ctx)?;

    let place_count = sections.iter().map(|s| s.places.len()).sum();
    let meta = Meta::assemble(region, now(), revision, place_count);
    info!(
        "parsed {} sections, {} places, {} tracks, {} stories, {} dayrooms",
        sections.len(),
        place_count,
        tracks.len(),
        stories.len(),
        dayrooms.len()
    );

    Ok(Datafile {
        meta,
        sections,
        tracks,
        stories,
        dayrooms,
    })
}

/// Indented JSON with keys in declaration order and sorted language maps.
pub fn to_json(datafile: &Datafile) -> Result<String, GenerateError> {
    Ok(serde_json::to_string_pretty(datafile)?)
}
