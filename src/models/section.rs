use super::{Entity, EntityKind, ParseContext, ParseError, Place, read_json, validate_id};
use crate::format::normalize_text;
use crate::text::{Layout, Text, Translations, read_localized};
use crate::walk::{Presence, walk_collection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// A group of places of a similar kind, e.g. monuments or nature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: Text,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub background_image: String,
    pub quick_info: Text,
    pub places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct SectionData {
    id: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    background_image: String,
}

impl Entity for Section {
    const KIND: EntityKind = EntityKind::Section;

    /// Parse the section and every place under its `places/` directory,
    /// which must exist.
    fn parse(dir: &Path, ctx: &ParseContext) -> Result<Self, ParseError> {
        let data: SectionData = read_json(&dir.join("data.json"))?;
        validate_id(Self::KIND, &data.id)?;

        let root = Layout::Content.languages_root(dir);
        let base = ctx.base_language.as_str();
        let name = read_localized(&root, "name.txt", base, Translations::Required)?;
        let quick_info = read_localized(&root, "quick_info.txt", base, Translations::Required)?;

        let mut places: Vec<Place> = walk_collection(&dir.join("places"), Presence::Required, ctx)?;
        for place in &mut places {
            if place.section.is_empty() {
                place.section = data.id.clone();
            } else if place.section != data.id {
                warn!(
                    "place {} names section {:?} but lives in section {}",
                    place.id, place.section, data.id
                );
            }
        }

        Ok(Section {
            id: data.id,
            name: normalize_text(&name),
            icon: data.icon.filter(|icon| !icon.is_empty()),
            background_image: data.background_image,
            quick_info: normalize_text(&quick_info),
            places,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}
