use super::{Entity, EntityKind, Link, Location, ParseContext, ParseError, read_json, validate_id};
use crate::format::normalize_text;
use crate::revision::Revision;
use crate::text::{Layout, Text, Translations, read_localized};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Region metadata as authored in `meta/`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMeta {
    pub region_id: String,
    pub region_name: Text,
    pub center: Location,
    pub contributors: Vec<String>,
    pub featured: Vec<String>,
    pub sources: Vec<Link>,
    pub links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct MetaData {
    region_id: String,
    #[serde(default)]
    center: Location,
    #[serde(default)]
    contributors: Vec<String>,
    #[serde(default)]
    featured: Vec<String>,
    #[serde(default)]
    sources: Vec<Link>,
    #[serde(default)]
    links: Vec<Link>,
}

impl Entity for RegionMeta {
    const KIND: EntityKind = EntityKind::Meta;

    fn parse(dir: &Path, ctx: &ParseContext) -> Result<Self, ParseError> {
        let data: MetaData = read_json(&dir.join("data.json"))?;
        validate_id(Self::KIND, &data.region_id)?;

        let root = Layout::Flat.languages_root(dir);
        let region_name = read_localized(
            &root,
            "name.txt",
            &ctx.base_language,
            Translations::Required,
        )?;

        Ok(RegionMeta {
            region_id: data.region_id,
            region_name: normalize_text(&region_name),
            center: data.center,
            contributors: data.contributors,
            featured: data.featured,
            sources: data.sources,
            links: data.links,
        })
    }

    fn id(&self) -> &str {
        &self.region_id
    }
}

/// The `meta` object of a generated datafile: authored metadata plus
/// build provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub region_id: String,
    pub region_name: Text,
    pub center: Location,
    /// Whole seconds, UTC.
    pub generated_at: DateTime<Utc>,
    pub contributors: Vec<String>,
    pub featured: Vec<String>,
    pub sources: Vec<Link>,
    pub links: Vec<Link>,
    pub commit_hash: String,
    /// `null` when the commit is untagged.
    pub commit_tag: Option<String>,
    pub place_count: usize,
}

impl Meta {
    pub fn assemble(
        region: RegionMeta,
        generated_at: DateTime<Utc>,
        revision: Revision,
        place_count: usize,
    ) -> Self {
        Meta {
            region_id: region.region_id,
            region_name: region.region_name,
            center: region.center,
            generated_at: truncate_to_seconds(generated_at),
            contributors: region.contributors,
            featured: region.featured,
            sources: region.sources,
            links: region.links,
            commit_hash: revision.commit_hash,
            commit_tag: revision.commit_tag,
            place_count,
        }
    }
}

fn truncate_to_seconds(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_nanosecond(0).unwrap_or(time)
}
