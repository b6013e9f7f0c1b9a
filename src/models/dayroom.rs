use super::{Entity, EntityKind, ParseContext, ParseError, read_json, validate_id};
use crate::format::normalize_text;
use crate::images::resolve_images;
use crate::text::{Layout, Text, Translations, read_localized};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A place run by the local community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dayroom {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Id of the section the dayroom belongs to.
    pub section: String,
    pub name: Text,
    pub quick_info: Text,
    pub overview: Text,
    pub images: Vec<String>,
    pub lat: f64,
    pub lng: f64,
    pub leader: String,
    #[serde(skip)]
    pub image_paths: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct DayroomData {
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    section: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lng: f64,
    #[serde(default)]
    leader: String,
}

impl Entity for Dayroom {
    const KIND: EntityKind = EntityKind::Dayroom;

    fn parse(dir: &Path, ctx: &ParseContext) -> Result<Self, ParseError> {
        let data: DayroomData = read_json(&dir.join("data.json"))?;
        validate_id(Self::KIND, &data.id)?;
        let image_paths = resolve_images(dir, &data.images, None, ctx.quality)?;

        let root = Layout::Content.languages_root(dir);
        let base = ctx.base_language.as_str();
        let read = |file: &str| {
            read_localized(&root, file, base, Translations::Required).map(|t| normalize_text(&t))
        };

        Ok(Dayroom {
            name: read("name.txt")?,
            quick_info: read("quick_info.txt")?,
            overview: read("overview.txt")?,
            id: data.id,
            kind: data.kind,
            section: data.section,
            images: data.images,
            lat: data.lat,
            lng: data.lng,
            leader: data.leader,
            image_paths,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}
