//! Localized text fields and the reader that fills them.
//!
//! Every human-readable field of an entity exists once per language, as a
//! plain text file inside a language directory. Entities use one of two
//! layouts:
//!
//! ```text
//! places/kosciol/                  tracks/szlak/
//! ├── data.json                    ├── data.json
//! └── content/                     ├── en/
//!     ├── en/                      │   └── name.txt
//!     │   └── name.txt             └── pl/
//!     └── pl/                          └── name.txt
//!         └── name.txt
//! ```
//!
//! [`Layout::Content`] (sections, places, dayrooms) nests the language
//! directories under `content/`; [`Layout::Flat`] (meta, tracks, stories)
//! keeps them next to `data.json`. Language directory names are not
//! validated, any subdirectory that is not a reserved entity directory
//! counts as a language.
//!
//! The base language is mandatory: a field without a base-language file
//! fails with [`ParseError::MissingTranslation`].

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectories that never hold translations in the flat layout.
const RESERVED_DIRS: &[&str] = &["images", "content", "places"];

/// A field with one value per language code, serialized as a JSON object
/// with keys in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Text(BTreeMap<String, String>);

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn insert(&mut self, language: impl Into<String>, value: impl Into<String>) {
        self.0.insert(language.into(), value.into());
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply `f` to the value of every language.
    pub fn map(&self, f: impl Fn(&str) -> String) -> Text {
        Text(self.0.iter().map(|(k, v)| (k.clone(), f(v))).collect())
    }

    /// Value for `language`, or the first language that has one.
    pub fn display(&self, language: &str) -> &str {
        self.get(language)
            .or_else(|| self.0.values().next().map(String::as_str))
            .unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Text {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Text(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Text {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Where an entity keeps its language directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `<entity>/content/<lang>/...`
    Content,
    /// `<entity>/<lang>/...`
    Flat,
}

impl Layout {
    pub fn languages_root(self, entity_dir: &Path) -> PathBuf {
        match self {
            Layout::Content => entity_dir.join("content"),
            Layout::Flat => entity_dir.to_path_buf(),
        }
    }
}

/// How a missing file in a non-base language is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translations {
    /// Every language directory must have the file.
    Required,
    /// Languages without the file are left out of the result.
    Optional,
}

/// List the language directories under `root`, sorted by name.
pub fn languages(root: &Path) -> Result<Vec<String>, ParseError> {
    let mut languages = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| ParseError::io(root, e))? {
        let entry = entry.map_err(|e| ParseError::io(root, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || RESERVED_DIRS.contains(&name.as_str()) {
            continue;
        }
        if entry.path().is_dir() {
            languages.push(name);
        }
    }
    languages.sort();
    Ok(languages)
}

/// Read `file_name` from every language directory under `root`.
///
/// Contents are returned raw; formatting is the caller's business.
pub fn read_localized(
    root: &Path,
    file_name: &str,
    base_language: &str,
    translations: Translations,
) -> Result<Text, ParseError> {
    let mut text = Text::new();
    for language in languages(root)? {
        let path = root.join(&language).join(file_name);
        match fs::read_to_string(&path) {
            Ok(content) => text.insert(language, content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if translations == Translations::Required || language == base_language {
                    return Err(ParseError::MissingTranslation { path, language });
                }
                debug!("no {language} translation at {}", path.display());
            }
            Err(e) => return Err(ParseError::io(&path, e)),
        }
    }

    if text.get(base_language).is_none() {
        return Err(ParseError::MissingTranslation {
            path: root.join(base_language).join(file_name),
            language: base_language.to_string(),
        });
    }
    Ok(text)
}

/// Whether the base language has `file_name`. Used to probe numbered
/// sequences of optional files.
pub fn base_has(root: &Path, file_name: &str, base_language: &str) -> bool {
    root.join(base_language).join(file_name).is_file()
}
