use super::{Action, Entity, EntityKind, ParseContext, ParseError, read_json, validate_id};
use crate::format::{normalize_content, normalize_text, split_text};
use crate::images::resolve_images;
use crate::text::{Layout, Text, Translations, base_has, languages, read_localized};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single point of interest, owned by a [`Section`](super::Section).
///
/// Besides name, quick info and overview, a place has any number of text
/// blocks, one `content/<lang>/text_<n>.txt` file each, numbered from 0
/// without gaps. The first paragraph of a block is its header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    /// Id of the owning section.
    #[serde(default)]
    pub section: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub name: Text,
    pub quick_info: Text,
    pub overview: Text,
    pub lat: f64,
    pub lng: f64,
    pub website_url: Option<String>,
    pub facebook_url: Option<String>,
    pub headers: Vec<Text>,
    pub content: Vec<Text>,
    pub actions: Vec<Action>,
    pub images: Vec<String>,
    /// Content images followed by the icon. Build-time only.
    #[serde(skip)]
    pub image_paths: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PlaceData {
    id: String,
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lng: f64,
    #[serde(default)]
    website_url: Option<String>,
    #[serde(default)]
    facebook_url: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

impl Entity for Place {
    const KIND: EntityKind = EntityKind::Place;

    fn parse(dir: &Path, ctx: &ParseContext) -> Result<Self, ParseError> {
        let data: PlaceData = read_json(&dir.join("data.json"))?;
        validate_id(Self::KIND, &data.id)?;
        let icon = data.icon.filter(|icon| !icon.is_empty());
        let image_paths = resolve_images(dir, &data.images, icon.as_deref(), ctx.quality)?;

        let root = Layout::Content.languages_root(dir);
        let base = ctx.base_language.as_str();
        let read = |file: &str| {
            read_localized(&root, file, base, Translations::Required).map(|t| normalize_text(&t))
        };
        let name = read("name.txt")?;
        let quick_info = read("quick_info.txt")?;
        let overview = read("overview.txt")?;

        let (headers, content) = read_text_blocks(&root, base)?;
        debug!("place {} has {} text blocks", data.id, headers.len());

        let actions = match read_action_values(dir)? {
            Some(values) => read_actions(dir, &root, values)?,
            None => {
                debug!("place {} has no actions.json", data.id);
                Vec::new()
            }
        };

        Ok(Place {
            section: data.section.unwrap_or_default(),
            id: data.id,
            icon,
            name,
            quick_info,
            overview,
            lat: data.lat,
            lng: data.lng,
            website_url: data.website_url,
            facebook_url: data.facebook_url,
            headers,
            content,
            actions,
            images: data.images,
            image_paths,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

fn text_block_file(index: usize) -> String {
    format!("text_{index}.txt")
}

fn action_file(index: usize) -> String {
    format!("action_{index}.txt")
}

/// Read `text_0.txt`, `text_1.txt`, ... until the base language has no
/// file for the next index.
fn read_text_blocks(root: &Path, base: &str) -> Result<(Vec<Text>, Vec<Text>), ParseError> {
    let mut headers = Vec::new();
    let mut content = Vec::new();
    for index in 0.. {
        let file = text_block_file(index);
        if !base_has(root, &file, base) {
            break;
        }
        let block = read_localized(root, &file, base, Translations::Optional)?;
        let (header, body) = split_text(&block);
        headers.push(header);
        content.push(body);
    }
    Ok((headers, content))
}

fn read_action_values(dir: &Path) -> Result<Option<Vec<String>>, ParseError> {
    let path = dir.join("actions.json");
    if !path.exists() {
        return Ok(None);
    }
    read_json(&path).map(Some)
}

/// Pair every action value with its name in each language.
///
/// Every language must name exactly as many actions as `actions.json`
/// declares. A missing name file or a surplus one means the entry is
/// corrupted.
fn read_actions(dir: &Path, root: &Path, values: Vec<String>) -> Result<Vec<Action>, ParseError> {
    let mut names = vec![Text::new(); values.len()];
    for language in languages(root)? {
        let lang_dir = root.join(&language);
        let mut count = 0;
        while count < values.len() {
            let path = lang_dir.join(action_file(count));
            match fs::read_to_string(&path) {
                Ok(name) => names[count].insert(language.as_str(), normalize_content(&name)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => break,
                Err(e) => return Err(ParseError::io(&path, e)),
            }
            count += 1;
        }
        if count == values.len() && lang_dir.join(action_file(count)).exists() {
            count += 1;
        }
        if count != values.len() {
            return Err(ParseError::InconsistentActionData {
                dir: dir.to_path_buf(),
                language,
                values: values.len(),
                names: count,
            });
        }
    }

    Ok(names
        .into_iter()
        .zip(values)
        .map(|(name, value)| Action { name, value })
        .collect())
}
