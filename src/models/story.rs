use super::{Entity, EntityKind, ParseContext, ParseError, read_json, validate_id};
use crate::format::normalize_text;
use crate::images::resolve_images;
use crate::text::{Layout, Text, Translations, read_localized};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A longer piece of text about one topic, shipped as a markdown file.
///
/// Only the markdown in the build's base language is shipped:
/// `<story>/<lang>/<markdown_filename>.md`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub name: Text,
    pub markdown_filename: String,
    pub images: Vec<String>,
    #[serde(skip)]
    pub markdown_path: PathBuf,
    #[serde(skip)]
    pub image_paths: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct StoryData {
    id: String,
    markdown_filename: String,
    #[serde(default)]
    images: Vec<String>,
}

impl Entity for Story {
    const KIND: EntityKind = EntityKind::Story;

    fn parse(dir: &Path, ctx: &ParseContext) -> Result<Self, ParseError> {
        let data: StoryData = read_json(&dir.join("data.json"))?;
        validate_id(Self::KIND, &data.id)?;

        let root = Layout::Flat.languages_root(dir);
        let base = ctx.base_language.as_str();
        let name = read_localized(&root, "name.txt", base, Translations::Required)?;

        let markdown_path = root.join(base).join(format!("{}.md", data.markdown_filename));
        let markdown_path = std::path::absolute(&markdown_path)
            .map_err(|e| ParseError::io(&markdown_path, e))?;
        if !markdown_path.is_file() {
            return Err(ParseError::MissingTranslation {
                path: markdown_path,
                language: base.to_string(),
            });
        }

        let image_paths = resolve_images(dir, &data.images, None, ctx.quality)?;

        Ok(Story {
            id: data.id,
            name: normalize_text(&name),
            markdown_filename: data.markdown_filename,
            images: data.images,
            markdown_path,
            image_paths,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}
