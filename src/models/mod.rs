//! The datafile and the entities it is built from.
//!
//! A region's source tree has a fixed shape. Each entity directory holds a
//! `data.json` with its structural fields (ids, coordinates, image ids) and
//! language directories with its localized text:
//!
//! ```text
//! datafile-<region>/
//! ├── meta/                 RegionMeta (flat layout)
//! ├── sections/<id>/        Section (content layout)
//! │   └── places/<id>/      Place (content layout)
//! ├── tracks/<id>/          Track (flat layout, optional collection)
//! ├── stories/<id>/         Story (flat layout, optional collection)
//! └── dayrooms/<id>/        Dayroom (content layout, optional collection)
//! ```
//!
//! Every entity implements [`Entity`]: it is parsed from the directory it is
//! handed, with every sub-path computed from that directory. Nothing reads or
//! changes the process working directory.

mod dayroom;
mod meta;
mod place;
mod section;
mod story;
mod track;

pub use dayroom::Dayroom;
pub use meta::{Meta, RegionMeta};
pub use place::Place;
pub use section::Section;
pub use story::Story;
pub use track::Track;

pub use crate::error::{EntityKind, ParseError};

use crate::images::Quality;
use crate::text::Text;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings shared by every parser in one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContext {
    /// Language every localized field must have.
    pub base_language: String,
    /// Image variant the build resolves.
    pub quality: Quality,
}

impl ParseContext {
    pub fn new(base_language: impl Into<String>, quality: Quality) -> Self {
        Self {
            base_language: base_language.into(),
            quality,
        }
    }
}

/// Something parsed from its own directory in the region tree.
pub trait Entity: Sized {
    const KIND: EntityKind;

    fn parse(dir: &Path, ctx: &ParseContext) -> Result<Self, ParseError>;

    fn id(&self) -> &str;
}

/// The assembled region document, written as `data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datafile {
    pub meta: Meta,
    pub sections: Vec<Section>,
    pub tracks: Vec<Track>,
    pub stories: Vec<Story>,
    pub dayrooms: Vec<Dayroom>,
}

impl Datafile {
    /// Load a previously generated `data.json`.
    ///
    /// Build-time paths are not part of the document, so they come back empty.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        read_json(path)
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.sections.iter().flat_map(|s| s.places.iter())
    }
}

/// A point in the real world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// A named external resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub website_url: String,
}

/// A localized label paired with a value the app acts on, usually a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: Text,
    pub value: String,
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ParseError> {
    let content = fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| ParseError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Reject ids that cannot double as a directory or file name.
pub(crate) fn validate_id(kind: EntityKind, id: &str) -> Result<(), ParseError> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && id.trim() == id
        && !id.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(ParseError::InvalidId {
            kind,
            id: id.to_string(),
        })
    }
}
