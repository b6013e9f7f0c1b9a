//! # touristdb
//!
//! Content build pipeline for tourist-guide regions. Authors keep every region
//! as a directory tree of JSON records, per-language text files and images.
//! touristdb turns one region into a single self-contained datafile bundle the
//! mobile app downloads.
//!
//! # Pipeline
//!
//! ```text
//! 1. Generate  datafiles/datafile-rudy/  →  Datafile          (parse + validate)
//! 2. Bundle    Datafile                  →  generated/rudy/   (data.json + assets)
//! 3. Compress  generated/rudy/           →  compressed/rudy.zip
//! 4. Publish   rudy.zip + Manifest       →  store (test or production partition)
//! ```
//!
//! Generation is all-or-nothing: a missing translation, a dangling image
//! reference or inconsistent action data aborts the build with an error that
//! names the entity and the file.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`text`] | Localized text fields and the per-language file reader |
//! | [`format`] | Whitespace normalization and header/body split of text blocks |
//! | [`images`] | Image identifier → file resolution for the chosen quality tier |
//! | [`models`] | Entity types (meta, section, place, track, story, dayroom) and their parsers |
//! | [`error`] | `ParseError`, shared by every parser |
//! | [`walk`] | Directory-per-entity collection walker |
//! | [`revision`] | Commit hash and tag of the database repository |
//! | [`generate`] | Datafile assembly and JSON serialization |
//! | [`bundle`] | Output bundle: data.json, images, stories, mini icons |
//! | [`manifest`] | Per-region summary written to the document store |
//! | [`publish`] | Archiver and publisher traits, test/production partitions |
//! | [`imaging`] | Pure-Rust image operations: identify, resize, square icons |
//! | [`config`] | `touristdb.toml` loading, merging and validation |
//! | [`logging`] | tracing subscriber for the binary |
//! | [`output`] | CLI output formatting |
//!
//! # Source Layout
//!
//! Every entity is a directory. Structured fields come from `data.json`,
//! localized fields from `<language>/<field>.txt`, and the set of languages
//! is whatever language directories exist. The base language must always be
//! present:
//!
//! ```text
//! places/kosciol/
//! ├── data.json
//! ├── content/
//! │   ├── pl/{name,quick_info,overview,text_1}.txt
//! │   └── en/{name,quick_info,overview}.txt
//! └── images/compressed/{front,ic_kosciol}.webp
//! ```

pub mod bundle;
pub mod config;
pub mod error;
pub mod format;
pub mod generate;
pub mod images;
pub mod imaging;
pub mod logging;
pub mod manifest;
pub mod models;
pub mod output;
pub mod publish;
pub mod revision;
pub mod text;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
