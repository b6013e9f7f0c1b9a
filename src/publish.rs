//! Archiving and publishing collaborators.
//!
//! Both are traits with explicit handles passed in by the caller:
//!
//! | Trait | Production implementation |
//! |---|---|
//! | [`Archiver`] | [`ZipCommandArchiver`]: the system `zip` command |
//! | [`Publisher`] | [`DirectoryStore`]: a directory standing in for the object store and document database |
//!
//! Every publication goes to one [`Partition`]. The test partition keeps its
//! archives under `<region>Test` keys and its manifests in the
//! `datafilesTest` collection, so test builds never reach app users.

use crate::manifest::{Manifest, ManifestInputs};
use crate::models::Meta;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("generated bundle {} does not exist", .0.display())]
    MissingBundle(PathBuf),
    #[error("archive {} does not exist", .0.display())]
    MissingArchive(PathBuf),
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} failed: {stderr}")]
    Command { command: String, stderr: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PublishError + '_ {
    move |source| PublishError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Test,
    Production,
}

impl Partition {
    pub fn from_prod_flag(prod: bool) -> Self {
        if prod {
            Partition::Production
        } else {
            Partition::Test
        }
    }

    pub fn is_test(self) -> bool {
        self == Partition::Test
    }

    /// Document collection holding the manifests.
    pub fn collection(self) -> &'static str {
        match self {
            Partition::Test => "datafilesTest",
            Partition::Production => "datafiles",
        }
    }

    /// Object-store key prefix of a region's files.
    pub fn storage_key(self, region_id: &str) -> String {
        match self {
            Partition::Test => format!("{region_id}Test"),
            Partition::Production => region_id.to_string(),
        }
    }
}

/// A compressed bundle on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    pub size: u64,
}

impl ArchiveInfo {
    /// Describe an existing archive file.
    pub fn read(path: &Path) -> Result<Self, PublishError> {
        if !path.is_file() {
            return Err(PublishError::MissingArchive(path.to_path_buf()));
        }
        let size = fs::metadata(path).map_err(io_error(path))?.len();
        Ok(ArchiveInfo {
            path: path.to_path_buf(),
            size,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub trait Archiver {
    /// Pack `source_dir` into `destination`. Entries are relative to the
    /// parent of `source_dir`, so they start with its name.
    fn archive(&self, source_dir: &Path, destination: &Path) -> Result<ArchiveInfo, PublishError>;
}

/// Archives with the system `zip` command.
#[derive(Debug, Default)]
pub struct ZipCommandArchiver;

impl ZipCommandArchiver {
    fn command(source_dir: &Path, destination: &Path) -> Result<Command, PublishError> {
        let destination = std::path::absolute(destination).map_err(io_error(destination))?;
        let parent = source_dir.parent().unwrap_or(Path::new("."));
        let name = source_dir
            .file_name()
            .ok_or_else(|| PublishError::MissingBundle(source_dir.to_path_buf()))?;
        let mut command = Command::new("zip");
        command
            .current_dir(parent)
            .arg("-q")
            .arg("-r")
            .arg(destination)
            .arg(name);
        Ok(command)
    }
}

impl Archiver for ZipCommandArchiver {
    fn archive(&self, source_dir: &Path, destination: &Path) -> Result<ArchiveInfo, PublishError> {
        if destination.exists() {
            fs::remove_file(destination).map_err(io_error(destination))?;
        }
        let output = Self::command(source_dir, destination)?
            .output()
            .map_err(|source| PublishError::Spawn {
                command: "zip".to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(PublishError::Command {
                command: "zip".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        ArchiveInfo::read(destination)
    }
}

/// Archive `<output_root>/<region_id>` into `<archive_dir>/<region_id>.zip`.
pub fn compress(
    archiver: &dyn Archiver,
    output_root: &Path,
    archive_dir: &Path,
    region_id: &str,
) -> Result<ArchiveInfo, PublishError> {
    let bundle = output_root.join(region_id);
    if !bundle.is_dir() {
        return Err(PublishError::MissingBundle(bundle));
    }
    fs::create_dir_all(archive_dir).map_err(io_error(archive_dir))?;
    let archive = archiver.archive(&bundle, &archive_dir.join(format!("{region_id}.zip")))?;
    info!("archived {} ({} bytes)", archive.path.display(), archive.size);
    Ok(archive)
}

/// Remote storage for archives and manifests.
pub trait Publisher {
    /// Public URL an uploaded archive will be served from.
    fn archive_url(&self, partition: Partition, region_id: &str, archive: &ArchiveInfo) -> String;

    fn upload_archive(
        &self,
        partition: Partition,
        region_id: &str,
        archive: &ArchiveInfo,
    ) -> Result<(), PublishError>;

    fn put_manifest(&self, partition: Partition, manifest: &Manifest) -> Result<(), PublishError>;
}

/// A local directory laid out like the remote store:
///
/// ```text
/// <root>/static/<storage key>/<region>.zip
/// <root>/<collection>/<region>.json
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn archive_path(&self, partition: Partition, region_id: &str, archive: &ArchiveInfo) -> PathBuf {
        self.root
            .join("static")
            .join(partition.storage_key(region_id))
            .join(archive.file_name())
    }

    pub fn manifest_path(&self, partition: Partition, region_id: &str) -> PathBuf {
        self.root
            .join(partition.collection())
            .join(format!("{region_id}.json"))
    }
}

impl Publisher for DirectoryStore {
    fn archive_url(&self, partition: Partition, region_id: &str, archive: &ArchiveInfo) -> String {
        let path = self.archive_path(partition, region_id, archive);
        let path = std::path::absolute(&path).unwrap_or(path);
        format!("file://{}", path.display())
    }

    fn upload_archive(
        &self,
        partition: Partition,
        region_id: &str,
        archive: &ArchiveInfo,
    ) -> Result<(), PublishError> {
        let destination = self.archive_path(partition, region_id, archive);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::copy(&archive.path, &destination).map_err(io_error(&archive.path))?;
        info!("uploaded {}", destination.display());
        Ok(())
    }

    fn put_manifest(&self, partition: Partition, manifest: &Manifest) -> Result<(), PublishError> {
        let path = self.manifest_path(partition, &manifest.region_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(&path, serde_json::to_string_pretty(manifest)?).map_err(io_error(&path))?;
        info!("updated {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOptions {
    pub partition: Partition,
    pub position: u32,
    /// Update the manifest without uploading the archive again.
    pub only_meta: bool,
}

/// Upload the archive (unless `only_meta`) and then its manifest.
pub fn publish(
    publisher: &dyn Publisher,
    meta: &Meta,
    archive: &ArchiveInfo,
    options: PublishOptions,
    uploaded_at: DateTime<Utc>,
) -> Result<Manifest, PublishError> {
    let region_id = meta.region_id.as_str();
    let manifest = Manifest::derive(
        meta,
        ManifestInputs {
            position: options.position,
            file_size: archive.size,
            file_url: publisher.archive_url(options.partition, region_id, archive),
            partition: options.partition,
            uploaded_at,
        },
    );
    if !options.only_meta {
        publisher.upload_archive(options.partition, region_id, archive)?;
    }
    publisher.put_manifest(options.partition, &manifest)?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use crate::test_helpers::write;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Mock publisher that records calls without storing anything.
    #[derive(Default)]
    struct MockPublisher {
        calls: Mutex<Vec<String>>,
    }

    impl Publisher for MockPublisher {
        fn archive_url(&self, partition: Partition, region_id: &str, archive: &ArchiveInfo) -> String {
            format!("mock://{}/{}", partition.storage_key(region_id), archive.file_name())
        }

        fn upload_archive(
            &self,
            partition: Partition,
            region_id: &str,
            _archive: &ArchiveInfo,
        ) -> Result<(), PublishError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("upload {}", partition.storage_key(region_id)));
            Ok(())
        }

        fn put_manifest(&self, partition: Partition, manifest: &Manifest) -> Result<(), PublishError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("manifest {}/{}", partition.collection(), manifest.region_id));
            Ok(())
        }
    }

    /// Mock archiver that writes a fixed-size file.
    struct MockArchiver;

    impl Archiver for MockArchiver {
        fn archive(&self, _source_dir: &Path, destination: &Path) -> Result<ArchiveInfo, PublishError> {
            fs::write(destination, b"PK fake").map_err(io_error(destination))?;
            ArchiveInfo::read(destination)
        }
    }

    fn meta() -> Meta {
        Meta {
            region_id: "rudy".into(),
            region_name: [("pl", "Rudy")].into_iter().collect(),
            center: Location::default(),
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            contributors: vec![],
            featured: vec![],
            sources: vec![],
            links: vec![],
            commit_hash: "abc1234".into(),
            commit_tag: Some("v1".into()),
            place_count: 3,
        }
    }

    fn archive(tmp: &TempDir) -> ArchiveInfo {
        write(tmp.path(), "compressed/rudy.zip", "PK zip bytes");
        ArchiveInfo::read(&tmp.path().join("compressed/rudy.zip")).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap()
    }

    #[test]
    fn partition_keys() {
        assert_eq!(Partition::Test.storage_key("rudy"), "rudyTest");
        assert_eq!(Partition::Production.storage_key("rudy"), "rudy");
        assert_eq!(Partition::Test.collection(), "datafilesTest");
        assert_eq!(Partition::from_prod_flag(true), Partition::Production);
    }

    #[test]
    fn publish_uploads_then_writes_manifest() {
        let tmp = TempDir::new().unwrap();
        let publisher = MockPublisher::default();
        let options = PublishOptions {
            partition: Partition::Test,
            position: 1,
            only_meta: false,
        };

        let manifest = publish(&publisher, &meta(), &archive(&tmp), options, now()).unwrap();
        assert_eq!(manifest.file_url, "mock://rudyTest/rudy.zip");
        assert_eq!(manifest.file_size, 12);
        assert_eq!(
            *publisher.calls.lock().unwrap(),
            vec!["upload rudyTest", "manifest datafilesTest/rudy"]
        );
    }

    #[test]
    fn only_meta_skips_archive_upload() {
        let tmp = TempDir::new().unwrap();
        let publisher = MockPublisher::default();
        let options = PublishOptions {
            partition: Partition::Production,
            position: 1,
            only_meta: true,
        };

        publish(&publisher, &meta(), &archive(&tmp), options, now()).unwrap();
        assert_eq!(*publisher.calls.lock().unwrap(), vec!["manifest datafiles/rudy"]);
    }

    #[test]
    fn directory_store_lays_out_files() {
        let tmp = TempDir::new().unwrap();
        let store = DirectoryStore::new(tmp.path().join("store"));
        let options = PublishOptions {
            partition: Partition::Test,
            position: 0,
            only_meta: false,
        };

        let manifest = publish(&store, &meta(), &archive(&tmp), options, now()).unwrap();
        assert!(tmp.path().join("store/static/rudyTest/rudy.zip").is_file());
        let stored = fs::read_to_string(store.manifest_path(Partition::Test, "rudy")).unwrap();
        let stored: Manifest = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored, manifest);
        assert!(manifest.file_url.starts_with("file://"));
    }

    #[test]
    fn compress_requires_generated_bundle() {
        let tmp = TempDir::new().unwrap();
        let err = compress(&MockArchiver, &tmp.path().join("generated"), tmp.path(), "rudy")
            .unwrap_err();
        assert!(matches!(err, PublishError::MissingBundle(_)));
    }

    #[test]
    fn compress_writes_region_archive() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "generated/rudy/data.json", "{}");

        let archive = compress(
            &MockArchiver,
            &tmp.path().join("generated"),
            &tmp.path().join("compressed"),
            "rudy",
        )
        .unwrap();
        assert!(archive.path.ends_with("compressed/rudy.zip"));
        assert_eq!(archive.size, 7);
    }

    #[test]
    fn zip_command_runs_from_bundle_parent() {
        let command =
            ZipCommandArchiver::command(Path::new("generated/rudy"), Path::new("/tmp/rudy.zip"))
                .unwrap();
        assert_eq!(command.get_current_dir(), Some(Path::new("generated")));
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-q", "-r", "/tmp/rudy.zip", "rudy"]);
    }

    #[test]
    fn missing_archive_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = ArchiveInfo::read(&tmp.path().join("rudy.zip")).unwrap_err();
        assert!(matches!(err, PublishError::MissingArchive(_)));
    }
}
