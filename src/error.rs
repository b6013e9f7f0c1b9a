//! Errors raised while reading a region's source tree.
//!
//! Every failure carries the path it happened at. The aggregation walker
//! wraps entity failures in [`ParseError::Entity`] so the message printed at
//! the top names the entity kind and directory without re-deriving it:
//!
//! ```text
//! section at datafiles/datafile-rudy/sections/zabytki: place at
//! .../places/kosciol: image not found: .../images/compressed/front.webp
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The closed set of things a region is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Meta,
    Section,
    Place,
    Track,
    Story,
    Dayroom,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Meta => "meta",
            EntityKind::Section => "section",
            EntityKind::Place => "place",
            EntityKind::Track => "track",
            EntityKind::Story => "story",
            EntityKind::Dayroom => "dayroom",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("missing {language} translation: {}", path.display())]
    MissingTranslation { path: PathBuf, language: String },
    #[error("image not found: {}", .0.display())]
    ImageNotFound(PathBuf),
    #[error(
        "inconsistent action data in {}: {values} values in actions.json but {names} names for language {language}",
        dir.display()
    )]
    InconsistentActionData {
        dir: PathBuf,
        language: String,
        values: usize,
        names: usize,
    },
    #[error("malformed JSON in {}: {source}", path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate {kind} id {id:?}")]
    DuplicateId { kind: EntityKind, id: String },
    #[error("invalid {kind} id {id:?}: ids must be usable as directory names")]
    InvalidId { kind: EntityKind, id: String },
    /// The inner error is part of the message; `source()` is `None`.
    #[error("{kind} at {}: {inner}", dir.display())]
    Entity {
        kind: EntityKind,
        dir: PathBuf,
        inner: Box<ParseError>,
    },
}

impl ParseError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        ParseError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The innermost error, with all entity context stripped.
    pub fn root_cause(&self) -> &ParseError {
        match self {
            ParseError::Entity { inner, .. } => inner.root_cause(),
            other => other,
        }
    }
}
