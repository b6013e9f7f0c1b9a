//! Datafile manifest: the summary a remote index keeps per region.
//!
//! Derived from the generated [`Meta`] plus facts about the published archive.
//! Keys are camelCase to match the documents the app already reads.

use crate::models::{Location, Meta};
use crate::publish::Partition;
use crate::text::Text;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub available: bool,
    pub featured: Vec<String>,
    pub file_size: u64,
    #[serde(rename = "fileURL")]
    pub file_url: String,
    pub place_count: usize,
    pub generated_at: DateTime<Utc>,
    pub uploaded_at: DateTime<Utc>,
    pub position: u32,
    #[serde(rename = "regionID")]
    pub region_id: String,
    pub region_name: Text,
    pub commit_hash: String,
    pub commit_tag: Option<String>,
    pub is_test_version: bool,
    pub center: Location,
}

/// Facts about one publication that the datafile itself does not know.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestInputs {
    /// Ordering among regions in the app's region list.
    pub position: u32,
    pub file_size: u64,
    pub file_url: String,
    pub partition: Partition,
    pub uploaded_at: DateTime<Utc>,
}

impl Manifest {
    pub fn derive(meta: &Meta, inputs: ManifestInputs) -> Self {
        Manifest {
            available: true,
            featured: meta.featured.clone(),
            file_size: inputs.file_size,
            file_url: inputs.file_url,
            place_count: meta.place_count,
            generated_at: meta.generated_at,
            uploaded_at: inputs.uploaded_at,
            position: inputs.position,
            region_id: meta.region_id.clone(),
            region_name: meta.region_name.clone(),
            commit_hash: meta.commit_hash.clone(),
            commit_tag: meta.commit_tag.clone(),
            is_test_version: inputs.partition.is_test(),
            center: meta.center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta() -> Meta {
        Meta {
            region_id: "rudy".into(),
            region_name: [("pl", "Rudy"), ("en", "Rudy (en)")].into_iter().collect(),
            center: Location { lat: 50.2, lng: 18.4 },
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            contributors: vec!["Jan Kowalski".into()],
            featured: vec!["kosciol".into()],
            sources: vec![],
            links: vec![],
            commit_hash: "abc1234".into(),
            commit_tag: None,
            place_count: 3,
        }
    }

    fn inputs(partition: Partition) -> ManifestInputs {
        ManifestInputs {
            position: 2,
            file_size: 4096,
            file_url: "file:///store/static/rudyTest/rudy.zip".into(),
            partition,
            uploaded_at: Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn derives_from_meta() {
        let manifest = Manifest::derive(&meta(), inputs(Partition::Test));
        assert!(manifest.available);
        assert!(manifest.is_test_version);
        assert_eq!(manifest.place_count, 3);
        assert_eq!(manifest.featured, vec!["kosciol"]);
        assert_eq!(manifest.region_name.get("pl"), Some("Rudy"));
    }

    #[test]
    fn production_is_not_test_version() {
        let manifest = Manifest::derive(&meta(), inputs(Partition::Production));
        assert!(!manifest.is_test_version);
    }

    #[test]
    fn serializes_with_document_keys() {
        let json = serde_json::to_value(Manifest::derive(&meta(), inputs(Partition::Test))).unwrap();
        for key in [
            "fileURL",
            "regionID",
            "fileSize",
            "placeCount",
            "generatedAt",
            "uploadedAt",
            "isTestVersion",
            "commitHash",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["commitTag"].is_null());
        assert_eq!(json["generatedAt"], "2024-05-01T12:00:00Z");
    }
}
