//! Output bundle materialization.
//!
//! Writes a parsed [`Datafile`] and every asset it references into a fresh
//! directory:
//!
//! ```text
//! generated/rudy/
//! ├── data.json
//! ├── images/          place, track, story and dayroom images
//! │   ├── front.webp
//! │   ├── ic_kosciol.webp
//! │   └── mini_ic_kosciol.webp   (when mini icons are enabled)
//! └── stories/
//!     └── legenda.md
//! ```
//!
//! The directory is removed and recreated on every run, so stale assets never
//! survive. Assets are copied from the build-time paths the parsers resolved;
//! the source tree is not scanned again.
//!
//! Every destination name, generated mini icons included, is planned before
//! anything is written. Two different origins for one name are an error, since
//! one would silently overwrite the other. A failure while writing removes the
//! partial bundle.

use crate::imaging::{BackendError, ImageBackend, MINI_ICON_PREFIX, create_mini_icon};
use crate::models::Datafile;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "asset name collision in {subdir}/{name}: {} and {}",
        first.display(),
        second.display()
    )]
    Collision {
        subdir: &'static str,
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("asset without a file name: {}", .0.display())]
    NoFileName(PathBuf),
    #[error("datafile is for region '{found}', not '{requested}'")]
    RegionMismatch { requested: String, found: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("mini icon for {}: {source}", path.display())]
    MiniIcon {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> BundleError + '_ {
    move |source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Mini icon generation: every copied place image whose file name starts
/// with `prefix` also gets a `mini_` square of `size`.
pub struct MiniIcons<'a> {
    pub backend: &'a dyn ImageBackend,
    pub prefix: &'a str,
    pub size: u32,
}

/// What was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleReport {
    pub output_dir: PathBuf,
    pub data_json_bytes: usize,
    pub images: usize,
    pub mini_icons: usize,
    pub stories: usize,
}

const IMAGES_DIR: &str = "images";
const STORIES_DIR: &str = "stories";

/// Where one bundle file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Asset {
    Copy(PathBuf),
    /// Square made from this icon.
    MiniIcon(PathBuf),
}

impl Asset {
    fn origin(&self) -> &Path {
        match self {
            Asset::Copy(path) | Asset::MiniIcon(path) => path,
        }
    }
}

/// Destination names of one bundle subdirectory, in write order.
struct AssetPlan {
    subdir: &'static str,
    names: HashMap<String, usize>,
    entries: Vec<(String, Asset)>,
}

impl AssetPlan {
    fn new(subdir: &'static str) -> Self {
        Self {
            subdir,
            names: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Reserve `name` for `asset`. Returns false when the same asset already
    /// holds it.
    fn add(&mut self, name: String, asset: Asset) -> Result<bool, BundleError> {
        if let Some(&index) = self.names.get(&name) {
            let first = &self.entries[index].1;
            if *first == asset {
                return Ok(false);
            }
            return Err(BundleError::Collision {
                subdir: self.subdir,
                name,
                first: first.origin().to_path_buf(),
                second: asset.origin().to_path_buf(),
            });
        }
        self.names.insert(name.clone(), self.entries.len());
        self.entries.push((name, asset));
        Ok(true)
    }

    fn add_copy(&mut self, source: &Path) -> Result<bool, BundleError> {
        let name = file_name(source)?;
        self.add(name, Asset::Copy(source.to_path_buf()))
    }

    fn count(&self, mini: bool) -> usize {
        self.entries
            .iter()
            .filter(|(_, asset)| matches!(asset, Asset::MiniIcon(_)) == mini)
            .count()
    }
}

fn file_name(path: &Path) -> Result<String, BundleError> {
    Ok(path
        .file_name()
        .ok_or_else(|| BundleError::NoFileName(path.to_path_buf()))?
        .to_string_lossy()
        .into_owned())
}

/// Recreate `<output_root>/<region_id>` from `datafile`.
///
/// `region_id` is the region the caller asked for; a datafile whose meta
/// names another region is refused before anything is touched.
pub fn materialize(
    datafile: &Datafile,
    region_id: &str,
    output_root: &Path,
    mini_icons: Option<&MiniIcons<'_>>,
) -> Result<BundleReport, BundleError> {
    if datafile.meta.region_id != region_id {
        return Err(BundleError::RegionMismatch {
            requested: region_id.to_string(),
            found: datafile.meta.region_id.clone(),
        });
    }
    let (images, stories) = plan(datafile, mini_icons)?;
    let json = serde_json::to_string_pretty(datafile)?;

    let bundle_dir = output_root.join(region_id);
    if let Err(err) = write_bundle(&bundle_dir, &json, &[&images, &stories], mini_icons) {
        if let Err(cleanup) = fs::remove_dir_all(&bundle_dir) {
            warn!("could not remove {}: {cleanup}", bundle_dir.display());
        }
        return Err(err);
    }

    Ok(BundleReport {
        output_dir: bundle_dir,
        data_json_bytes: json.len(),
        images: images.count(false),
        mini_icons: images.count(true),
        stories: stories.count(false),
    })
}

/// Name every file the bundle will hold.
fn plan(
    datafile: &Datafile,
    mini_icons: Option<&MiniIcons<'_>>,
) -> Result<(AssetPlan, AssetPlan), BundleError> {
    let mut images = AssetPlan::new(IMAGES_DIR);
    let mut stories = AssetPlan::new(STORIES_DIR);

    for place in datafile.places() {
        for path in &place.image_paths {
            if !images.add_copy(path)? {
                continue;
            }
            let Some(mini) = mini_icons else { continue };
            let name = file_name(path)?;
            if name.starts_with(mini.prefix) {
                images.add(
                    format!("{MINI_ICON_PREFIX}{name}"),
                    Asset::MiniIcon(path.clone()),
                )?;
            }
        }
    }
    for track in &datafile.tracks {
        for path in &track.image_paths {
            images.add_copy(path)?;
        }
    }
    for story in &datafile.stories {
        stories.add_copy(&story.markdown_path)?;
        for path in &story.image_paths {
            images.add_copy(path)?;
        }
    }
    for dayroom in &datafile.dayrooms {
        for path in &dayroom.image_paths {
            images.add_copy(path)?;
        }
    }
    Ok((images, stories))
}

fn write_bundle(
    bundle_dir: &Path,
    json: &str,
    plans: &[&AssetPlan],
    mini_icons: Option<&MiniIcons<'_>>,
) -> Result<(), BundleError> {
    create_skeleton(bundle_dir)?;

    let data_json = bundle_dir.join("data.json");
    fs::write(&data_json, json).map_err(io_error(&data_json))?;
    info!("wrote {} KB to {}", json.len() / 1024, data_json.display());

    for plan in plans {
        let dir = bundle_dir.join(plan.subdir);
        for (name, asset) in &plan.entries {
            match (asset, mini_icons) {
                (Asset::Copy(source), _) => {
                    let destination = dir.join(name);
                    fs::copy(source, &destination).map_err(io_error(source))?;
                    debug!("copied {} → {}", source.display(), destination.display());
                }
                (Asset::MiniIcon(icon), Some(mini)) => {
                    create_mini_icon(mini.backend, icon, &dir, mini.size).map_err(|err| {
                        BundleError::MiniIcon {
                            path: icon.clone(),
                            source: err,
                        }
                    })?;
                }
                (Asset::MiniIcon(_), None) => {}
            }
        }
    }
    Ok(())
}

fn create_skeleton(bundle_dir: &Path) -> Result<(), BundleError> {
    if bundle_dir.exists() {
        fs::remove_dir_all(bundle_dir).map_err(io_error(bundle_dir))?;
    }
    for subdir in [IMAGES_DIR, STORIES_DIR] {
        let dir = bundle_dir.join(subdir);
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GenerateOptions, generate_at};
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::revision::Revision;
    use crate::test_helpers::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_datafile(tmp: &TempDir) -> Datafile {
        let region = sample_region(tmp.path());
        let revision = Revision {
            commit_hash: "abc1234".into(),
            commit_tag: None,
        };
        generate_at(&region, &GenerateOptions::default(), revision, || {
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        })
        .unwrap()
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn writes_skeleton_json_and_assets() {
        let tmp = TempDir::new().unwrap();
        let datafile = sample_datafile(&tmp);
        let out = tmp.path().join("generated");

        let report = materialize(&datafile, "rudy", &out, None).unwrap();
        assert_eq!(report.output_dir, out.join("rudy"));
        assert_eq!(report.mini_icons, 0);
        assert_eq!(
            file_names(&out.join("rudy/images")),
            vec![
                "front.webp",
                "ic_kosciol.webp",
                "legenda_1.webp",
                "palac_1.webp",
                "szlak_1.webp",
                "wnetrze.webp",
            ]
        );
        assert_eq!(file_names(&out.join("rudy/stories")), vec!["legenda.md"]);

        let written = fs::read_to_string(out.join("rudy/data.json")).unwrap();
        assert_eq!(written, serde_json::to_string_pretty(&datafile).unwrap());
    }

    #[test]
    fn stale_output_is_removed() {
        let tmp = TempDir::new().unwrap();
        let datafile = sample_datafile(&tmp);
        let out = tmp.path().join("generated");
        write(&out, "rudy/images/old.webp", "stale");

        materialize(&datafile, "rudy", &out, None).unwrap();
        assert!(!out.join("rudy/images/old.webp").exists());
    }

    #[test]
    fn mini_icons_are_made_for_icon_files() {
        let tmp = TempDir::new().unwrap();
        let datafile = sample_datafile(&tmp);
        let out = tmp.path().join("generated");
        let backend = MockBackend::new();
        let mini = MiniIcons {
            backend: &backend,
            prefix: "ic_",
            size: 128,
        };

        let report = materialize(&datafile, "rudy", &out, Some(&mini)).unwrap();
        assert_eq!(report.mini_icons, 1);
        assert!(out.join("rudy/images/mini_ic_kosciol.webp").exists());
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Square { size: 128, .. }));
    }

    #[test]
    fn same_name_from_two_sources_is_collision() {
        let tmp = TempDir::new().unwrap();
        let mut datafile = sample_datafile(&tmp);
        let duplicate = tmp.path().join("elsewhere/front.webp");
        write(tmp.path(), "elsewhere/front.webp", "other");
        datafile.tracks[0].image_paths.push(duplicate);

        let out = tmp.path().join("generated");

        let err = materialize(&datafile, "rudy", &out, None).unwrap_err();
        assert!(matches!(err, BundleError::Collision { ref name, .. } if name == "front.webp"));
        assert!(!out.join("rudy").exists());
    }

    #[test]
    fn collision_leaves_previous_bundle_untouched() {
        let tmp = TempDir::new().unwrap();
        let mut datafile = sample_datafile(&tmp);
        let out = tmp.path().join("generated");
        materialize(&datafile, "rudy", &out, None).unwrap();
        let before = file_names(&out.join("rudy/images"));

        write(tmp.path(), "elsewhere/front.webp", "other");
        datafile.tracks[0]
            .image_paths
            .push(tmp.path().join("elsewhere/front.webp"));
        assert!(materialize(&datafile, "rudy", &out, None).is_err());
        assert!(out.join("rudy/data.json").is_file());
        assert_eq!(file_names(&out.join("rudy/images")), before);
    }

    fn mini_icons(backend: &MockBackend) -> MiniIcons<'_> {
        MiniIcons {
            backend,
            prefix: "ic_",
            size: 128,
        }
    }

    #[test]
    fn content_image_named_like_a_mini_icon_is_collision() {
        let tmp = TempDir::new().unwrap();
        let mut datafile = sample_datafile(&tmp);
        let clash = tmp.path().join("elsewhere/mini_ic_kosciol.webp");
        write(tmp.path(), "elsewhere/mini_ic_kosciol.webp", "content");
        // Copied before the icon it clashes with.
        datafile
            .sections
            .iter_mut()
            .flat_map(|section| section.places.iter_mut())
            .find(|place| place.id == "kosciol")
            .unwrap()
            .image_paths
            .insert(0, clash);
        let out = tmp.path().join("generated");
        let backend = MockBackend::new();

        let err = materialize(&datafile, "rudy", &out, Some(&mini_icons(&backend))).unwrap_err();
        assert!(
            matches!(err, BundleError::Collision { ref name, .. } if name == "mini_ic_kosciol.webp")
        );
        assert!(backend.get_operations().is_empty());
        assert!(!out.join("rudy").exists());
    }

    #[test]
    fn mini_icon_named_like_a_later_content_image_is_collision() {
        let tmp = TempDir::new().unwrap();
        let mut datafile = sample_datafile(&tmp);
        let clash = tmp.path().join("elsewhere/mini_ic_kosciol.webp");
        write(tmp.path(), "elsewhere/mini_ic_kosciol.webp", "content");
        datafile.tracks[0].image_paths.push(clash.clone());
        let out = tmp.path().join("generated");
        let backend = MockBackend::new();

        match materialize(&datafile, "rudy", &out, Some(&mini_icons(&backend))) {
            Err(BundleError::Collision {
                name,
                first,
                second,
                ..
            }) => {
                assert_eq!(name, "mini_ic_kosciol.webp");
                assert!(first.ends_with("ic_kosciol.webp"));
                assert_eq!(second, clash);
            }
            other => panic!("expected Collision, got {other:?}"),
        }
        assert!(!out.join("rudy").exists());
    }

    #[test]
    fn mini_icon_names_do_not_clash_without_mini_icons() {
        let tmp = TempDir::new().unwrap();
        let mut datafile = sample_datafile(&tmp);
        write(tmp.path(), "elsewhere/mini_ic_kosciol.webp", "content");
        datafile.tracks[0]
            .image_paths
            .push(tmp.path().join("elsewhere/mini_ic_kosciol.webp"));
        let out = tmp.path().join("generated");

        materialize(&datafile, "rudy", &out, None).unwrap();
        let shipped = fs::read_to_string(out.join("rudy/images/mini_ic_kosciol.webp")).unwrap();
        assert_eq!(shipped, "content");
    }

    #[test]
    fn failed_write_removes_partial_bundle() {
        let tmp = TempDir::new().unwrap();
        let datafile = sample_datafile(&tmp);
        let out = tmp.path().join("generated");
        fs::remove_file(&datafile.tracks[0].image_paths[0]).unwrap();

        let err = materialize(&datafile, "rudy", &out, None).unwrap_err();
        assert!(matches!(err, BundleError::Io { .. }));
        assert!(!out.join("rudy").exists());
    }

    #[test]
    fn requested_region_must_match_meta() {
        let tmp = TempDir::new().unwrap();
        let datafile = sample_datafile(&tmp);
        let out = tmp.path().join("generated");

        match materialize(&datafile, "other", &out, None) {
            Err(BundleError::RegionMismatch { requested, found }) => {
                assert_eq!(requested, "other");
                assert_eq!(found, "rudy");
            }
            other => panic!("expected RegionMismatch, got {other:?}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn loaded_datafile_writes_json_only() {
        let tmp = TempDir::new().unwrap();
        let datafile = sample_datafile(&tmp);
        let path = tmp.path().join("data.json");
        fs::write(&path, serde_json::to_string_pretty(&datafile).unwrap()).unwrap();
        let loaded = Datafile::load(&path).unwrap();

        let report = materialize(&loaded, "rudy", &tmp.path().join("generated"), None).unwrap();
        assert_eq!(report.images, 0);
        assert_eq!(report.stories, 0);
    }
}
