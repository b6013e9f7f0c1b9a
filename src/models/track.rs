use super::{Entity, EntityKind, Location, ParseContext, ParseError, read_json, validate_id};
use crate::format::normalize_text;
use crate::images::resolve_images;
use crate::text::{Layout, Text, Translations, read_localized};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A bike trail or another long geographical object, drawn as a polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: Text,
    pub quick_info: Text,
    pub overview: Text,
    pub images: Vec<String>,
    pub coords: Vec<Location>,
    #[serde(skip)]
    pub image_paths: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct TrackData {
    id: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    coords: Vec<Location>,
}

impl Entity for Track {
    const KIND: EntityKind = EntityKind::Track;

    fn parse(dir: &Path, ctx: &ParseContext) -> Result<Self, ParseError> {
        let data: TrackData = read_json(&dir.join("data.json"))?;
        validate_id(Self::KIND, &data.id)?;
        let image_paths = resolve_images(dir, &data.images, None, ctx.quality)?;

        let root = Layout::Flat.languages_root(dir);
        let base = ctx.base_language.as_str();
        let read = |file: &str| {
            read_localized(&root, file, base, Translations::Required).map(|t| normalize_text(&t))
        };

        Ok(Track {
            name: read("name.txt")?,
            quick_info: read("quick_info.txt")?,
            overview: read("overview.txt")?,
            id: data.id,
            images: data.images,
            coords: data.coords,
            image_paths,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}
