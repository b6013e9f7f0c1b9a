//! Aggregation of entity collections.
//!
//! A collection is a directory whose immediate subdirectories are entities
//! of one kind. The walk lists those children in lexical order, parses each
//! with the entity's own parser and collects the results:
//!
//! ```text
//! sections/
//! ├── przyroda/     → Section::parse(sections/przyroda)
//! ├── zabytki/      → Section::parse(sections/zabytki)
//! ├── .DS_Store     skipped (hidden)
//! └── README.md     skipped (not a directory)
//! ```
//!
//! Nesting is expressed by parsers calling the walk again for their own
//! child collections, so the depth of a collection is never inferred from
//! its path. The first failing entity aborts the walk; its error is wrapped
//! in [`ParseError::Entity`] with the entity's kind and directory.

use crate::models::{Entity, ParseContext, ParseError};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Whether a collection directory has to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// A missing directory is an error.
    Required,
    /// A missing directory is an empty collection.
    Optional,
}

/// Parse the entity at `dir`, attributing any failure to it.
pub fn parse_entity<E: Entity>(dir: &Path, ctx: &ParseContext) -> Result<E, ParseError> {
    E::parse(dir, ctx).map_err(|err| ParseError::Entity {
        kind: E::KIND,
        dir: dir.to_path_buf(),
        inner: Box::new(err),
    })
}

/// Parse every entity directory directly under `root`, in lexical order.
pub fn walk_collection<E: Entity>(
    root: &Path,
    presence: Presence,
    ctx: &ParseContext,
) -> Result<Vec<E>, ParseError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(ParseError::io(
                root,
                io::Error::other("collection path is not a directory"),
            ));
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound && presence == Presence::Optional => {
            debug!("no {} collection at {}", E::KIND, root.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(ParseError::io(root, e)),
    }

    let mut entities = Vec::new();
    let mut seen = HashSet::new();
    for dir in entity_dirs(root)? {
        let entity: E = parse_entity(&dir, ctx)?;
        if !seen.insert(entity.id().to_string()) {
            return Err(ParseError::DuplicateId {
                kind: E::KIND,
                id: entity.id().to_string(),
            });
        }
        entities.push(entity);
    }
    debug!("parsed {} {} entities from {}", entities.len(), E::KIND, root.display());
    Ok(entities)
}

/// Immediate, non-hidden subdirectories of `root`, sorted by name.
fn entity_dirs(root: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let mut dirs = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ParseError::io(&path, io::Error::from(e))
        })?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}
