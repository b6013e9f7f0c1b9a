//! Shared test utilities for the touristdb test suite.
//!
//! Builds region source trees inside a `TempDir` and provides lookup helpers
//! over the parsed [`Datafile`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let region = sample_region(tmp.path());
//! let datafile = generate(&region, &GenerateOptions::default(), revision).unwrap();
//!
//! let section = find_section(&datafile, "zabytki");
//! let place = find_place(section, "kosciol");
//! assert_eq!(place.name.get("pl"), Some("Miejsce kosciol"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::images::{Quality, image_path};
use crate::models::{Datafile, Place, Section};

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `content` to `dir/rel`, creating parent directories.
pub fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Create an empty stand-in for compressed image `id` of the entity at `dir`.
pub fn touch_image(dir: &Path, id: &str) {
    let path = image_path(dir, id, Quality::Compressed);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, format!("webp {id}")).unwrap();
}

/// Localized `name.txt`, `quick_info.txt` and `overview.txt` in pl and en.
fn write_basic_texts(root: &Path, pl_name: &str, en_name: &str) {
    for (lang, name) in [("pl", pl_name), ("en", en_name)] {
        write(root, &format!("{lang}/name.txt"), &format!("{name}\n"));
        write(root, &format!("{lang}/quick_info.txt"), "Krótko\no miejscu.\n");
        write(root, &format!("{lang}/overview.txt"), "Pierwszy akapit.\n\nDrugi\nakapit.\n");
    }
}

/// Builder for one place directory.
pub struct PlaceFixture {
    id: String,
    name: Option<String>,
    icon: Option<String>,
    images: Vec<String>,
}

impl PlaceFixture {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            icon: None,
            images: Vec::new(),
        }
    }

    /// Polish name; defaults to `Miejsce <id>`.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn image(mut self, id: &str) -> Self {
        self.images.push(id.to_string());
        self
    }

    /// Write the place under `places_dir` and return its directory.
    pub fn write(self, places_dir: &Path) -> PathBuf {
        let dir = places_dir.join(&self.id);
        let data = serde_json::json!({
            "id": self.id,
            "icon": self.icon,
            "lat": 50.1,
            "lng": 18.2,
            "website_url": "https://example.com",
            "images": self.images,
        });
        write(&dir, "data.json", &data.to_string());
        let pl_name = self.name.unwrap_or_else(|| format!("Miejsce {}", self.id));
        write_basic_texts(&dir.join("content"), &pl_name, &format!("Place {}", self.id));
        for id in self.images.iter().chain(&self.icon) {
            touch_image(&dir, id);
        }
        dir
    }
}

/// Write `meta/` for `region_id`.
pub fn write_meta(region_dir: &Path, region_id: &str) {
    let dir = region_dir.join("meta");
    let data = serde_json::json!({
        "region_id": region_id,
        "center": { "lat": 50.2, "lng": 18.4 },
        "contributors": ["Jan Kowalski"],
        "featured": ["kosciol"],
        "sources": [{ "name": "Wikipedia", "website_url": "https://pl.wikipedia.org" }],
        "links": [],
    });
    write(&dir, "data.json", &data.to_string());
    write(&dir, "pl/name.txt", "Rudy\n");
    write(&dir, "en/name.txt", "Rudy (en)\n");
}

/// Write a section without places and return its directory.
pub fn write_section(region_dir: &Path, id: &str) -> PathBuf {
    let dir = region_dir.join("sections").join(id);
    let data = serde_json::json!({ "id": id, "background_image": format!("bg_{id}") });
    write(&dir, "data.json", &data.to_string());
    fs::create_dir_all(dir.join("places")).unwrap();
    for lang in ["pl", "en"] {
        write(&dir, &format!("content/{lang}/name.txt"), &format!("Sekcja {id}\n"));
        write(&dir, &format!("content/{lang}/quick_info.txt"), "Opis\nsekcji.\n");
    }
    dir
}

/// Write a track with the given content images and return its directory.
pub fn write_track(region_dir: &Path, id: &str, images: &[&str]) -> PathBuf {
    let dir = region_dir.join("tracks").join(id);
    let data = serde_json::json!({
        "id": id,
        "images": images,
        "coords": [{ "lat": 50.0, "lng": 18.0 }, { "lat": 50.1, "lng": 18.1 }],
    });
    write(&dir, "data.json", &data.to_string());
    write_basic_texts(&dir, &format!("Szlak {id}"), &format!("Trail {id}"));
    for image in images {
        touch_image(&dir, image);
    }
    dir
}

/// Write a story with markdown in pl and one image, and return its directory.
pub fn write_story(region_dir: &Path, id: &str) -> PathBuf {
    let dir = region_dir.join("stories").join(id);
    let data = serde_json::json!({
        "id": id,
        "markdown_filename": id,
        "images": [format!("{id}_1")],
    });
    write(&dir, "data.json", &data.to_string());
    write(&dir, "pl/name.txt", &format!("Opowieść {id}\n"));
    write(&dir, &format!("pl/{id}.md"), "# Dawno temu\n\nBył sobie zamek.\n");
    touch_image(&dir, &format!("{id}_1"));
    dir
}

/// Write a dayroom belonging to `section` and return its directory.
pub fn write_dayroom(region_dir: &Path, id: &str, section: &str) -> PathBuf {
    let dir = region_dir.join("dayrooms").join(id);
    let data = serde_json::json!({
        "id": id,
        "type": "swietlica",
        "section": section,
        "images": [],
        "lat": 50.3,
        "lng": 18.5,
        "leader": "Anna Nowak",
    });
    write(&dir, "data.json", &data.to_string());
    write_basic_texts(&dir.join("content"), &format!("Świetlica {id}"), &format!("Dayroom {id}"));
    dir
}

/// A complete region: two sections with three places, one track, one story
/// and one dayroom.
///
/// ```text
/// datafile-rudy/
/// ├── meta/
/// ├── sections/przyroda/places/{rezerwat}
/// ├── sections/zabytki/places/{kosciol, palac}
/// ├── tracks/szlak
/// ├── stories/legenda
/// └── dayrooms/swietlica
/// ```
pub fn sample_region(root: &Path) -> PathBuf {
    let region = root.join("datafile-rudy");
    write_meta(&region, "rudy");

    let zabytki = write_section(&region, "zabytki");
    PlaceFixture::new("kosciol")
        .icon("ic_kosciol")
        .image("front")
        .image("wnetrze")
        .write(&zabytki.join("places"));
    PlaceFixture::new("palac")
        .image("palac_1")
        .write(&zabytki.join("places"));

    let przyroda = write_section(&region, "przyroda");
    PlaceFixture::new("rezerwat").write(&przyroda.join("places"));

    write_track(&region, "szlak", &["szlak_1"]);
    write_story(&region, "legenda");
    write_dayroom(&region, "swietlica", "zabytki");
    region
}

// =========================================================================
// Datafile lookups: panic with a clear message on miss
// =========================================================================

/// Find a section by id. Panics if not found.
pub fn find_section<'a>(datafile: &'a Datafile, id: &str) -> &'a Section {
    datafile
        .sections
        .iter()
        .find(|s| s.id == id)
        .unwrap_or_else(|| {
            let ids = section_ids(datafile);
            panic!("section '{id}' not found. Available: {ids:?}")
        })
}

/// Find a place by id within a section. Panics if not found.
pub fn find_place<'a>(section: &'a Section, id: &str) -> &'a Place {
    section
        .places
        .iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| {
            let ids = place_ids(section);
            panic!("place '{id}' not found in section '{}'. Available: {ids:?}", section.id)
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All section ids in datafile order.
pub fn section_ids(datafile: &Datafile) -> Vec<&str> {
    datafile.sections.iter().map(|s| s.id.as_str()).collect()
}

/// All place ids in section order.
pub fn place_ids(section: &Section) -> Vec<&str> {
    section.places.iter().map(|p| p.id.as_str()).collect()
}
