use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use touristdb::bundle::{self, MiniIcons};
use touristdb::config::{self, ProjectConfig};
use touristdb::generate::{self, GenerateOptions};
use touristdb::images::Quality;
use touristdb::imaging::{self, RustBackend};
use touristdb::manifest::{Manifest, ManifestInputs};
use touristdb::models::Datafile;
use touristdb::publish::{
    self, ArchiveInfo, DirectoryStore, Partition, PublishOptions, Publisher, ZipCommandArchiver,
};
use touristdb::revision::{self, Revision};
use touristdb::{logging, output};
use tracing::warn;

fn version_string() -> &'static str {
    if env!("TOURISTDB_RELEASE") == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let commit = env!("TOURISTDB_COMMIT");
        if commit.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{commit}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "touristdb")]
#[command(about = "Build tourist-guide region datafiles")]
#[command(long_about = "\
Build tourist-guide region datafiles

Every region is a directory tree of JSON and per-language text files:

  datafiles/datafile-rudy/
  ├── meta/                        # region_id, center, featured places
  │   ├── data.json
  │   └── pl/name.txt
  ├── sections/zabytki/
  │   ├── data.json
  │   ├── content/pl/name.txt
  │   └── places/kosciol/
  │       ├── data.json
  │       ├── content/pl/{name,quick_info,overview,text_1}.txt
  │       └── images/compressed/front.webp
  ├── tracks/                      # optional
  ├── stories/                     # optional
  └── dayrooms/                    # optional

'generate' parses the tree into generated/<region>/data.json and copies
every referenced image and story next to it. 'compress' and 'publish'
hand the result to the archive and document store.

Run 'touristdb gen-config' to generate a documented touristdb.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project directory holding touristdb.toml
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct RegionArgs {
    /// Region identifier, e.g. `rudy` for datafile-rudy
    #[arg(long)]
    region_id: String,
}

/// Flags for commands that parse a region.
#[derive(clap::Args, Clone)]
struct BuildArgs {
    #[command(flatten)]
    region: RegionArgs,

    /// Base language every localized field must exist in
    #[arg(long)]
    lang: Option<String>,

    /// Image tier: compressed or original
    #[arg(long)]
    quality: Option<Quality>,
}

impl BuildArgs {
    fn options(&self, config: &ProjectConfig) -> GenerateOptions {
        GenerateOptions {
            base_language: self
                .lang
                .clone()
                .unwrap_or_else(|| config.base_language.clone()),
            quality: self.quality.unwrap_or(config.images.quality),
        }
    }
}

/// Flags for commands that talk to the store.
#[derive(clap::Args, Clone)]
struct StoreArgs {
    #[command(flatten)]
    region: RegionArgs,

    /// Store directory (archives under static/, manifests per collection)
    #[arg(long, default_value = "store")]
    store: PathBuf,

    /// Publish to production instead of the test partition
    #[arg(long)]
    prod: bool,

    /// Position of the region in the app's region list
    #[arg(long, default_value_t = 0)]
    position: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a region and write its bundle
    Generate {
        #[command(flatten)]
        build: BuildArgs,

        /// Skip mini icon generation
        #[arg(long)]
        no_mini_icons: bool,
    },
    /// Parse a region and validate every reference without writing anything
    Check {
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Archive a generated bundle
    Compress {
        #[command(flatten)]
        region: RegionArgs,
    },
    /// Print the manifest a publish would write
    Manifest {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Upload the archive and its manifest
    Publish {
        #[command(flatten)]
        store: StoreArgs,

        /// Only update the manifest, keep the uploaded archive
        #[arg(long)]
        only_meta: bool,
    },
    /// Convert a place's original images to compressed WebP
    Optimize {
        /// Place directory
        #[arg(long)]
        place: PathBuf,

        /// Do not produce the square icon
        #[arg(long)]
        no_icons: bool,
    },
    /// Print a stock touristdb.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.project)?;
    let project = Project {
        root: &cli.project,
        config: &config,
    };

    match cli.command {
        Command::Generate {
            build,
            no_mini_icons,
        } => {
            let options = build.options(&config);
            let region_dir = project.region_dir(&build.region.region_id)?;
            let revision = revision::read_revision(&region_dir)?;
            let datafile = generate::generate(&region_dir, &options, revision)?;
            output::print_generate_output(&datafile, &options.base_language);

            let backend = RustBackend::new();
            let mini_icons = (config.images.mini_icons && !no_mini_icons).then(|| MiniIcons {
                backend: &backend,
                prefix: &config.images.icon_prefix,
                size: config.images.mini_icon_size,
            });
            let report = bundle::materialize(
                &datafile,
                &build.region.region_id,
                &project.output_dir(),
                mini_icons.as_ref(),
            )?;
            output::print_bundle_report(&report);
        }
        Command::Check { build } => {
            let options = build.options(&config);
            let region_dir = project.region_dir(&build.region.region_id)?;
            let revision = revision::read_revision(&region_dir).unwrap_or_else(|err| {
                warn!("no revision for {}: {err}", region_dir.display());
                Revision {
                    commit_hash: "unknown".to_string(),
                    commit_tag: None,
                }
            });
            let datafile = generate::generate(&region_dir, &options, revision)?;
            output::print_generate_output(&datafile, &options.base_language);
            println!("==> Region is valid");
        }
        Command::Compress { region } => {
            let region_id = generate::check_region_id(&region.region_id)?;
            let archive = publish::compress(
                &ZipCommandArchiver,
                &project.output_dir(),
                &project.archive_dir(),
                region_id,
            )?;
            println!("{} ({} KB)", archive.path.display(), archive.size / 1024);
        }
        Command::Manifest { store } => {
            let (datafile, archive) = project.published_inputs(&store.region)?;
            let partition = Partition::from_prod_flag(store.prod);
            let publisher = DirectoryStore::new(project.root.join(&store.store));
            let manifest = Manifest::derive(
                &datafile.meta,
                ManifestInputs {
                    position: store.position,
                    file_size: archive.size,
                    file_url: publisher.archive_url(partition, &datafile.meta.region_id, &archive),
                    partition,
                    uploaded_at: Utc::now(),
                },
            );
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Command::Publish { store, only_meta } => {
            let (datafile, archive) = project.published_inputs(&store.region)?;
            let options = PublishOptions {
                partition: Partition::from_prod_flag(store.prod),
                position: store.position,
                only_meta,
            };
            let publisher = DirectoryStore::new(project.root.join(&store.store));
            let manifest = publish::publish(&publisher, &datafile.meta, &archive, options, Utc::now())?;
            println!(
                "==> Published {} to {}",
                manifest.region_id,
                options.partition.collection()
            );
        }
        Command::Optimize { place, no_icons } => {
            let report = imaging::optimize_place(
                &place,
                &RustBackend::new(),
                &config.optimize_config(!no_icons),
            )?;
            let place_id = place
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            output::print_optimize_report(&place_id, &report);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Directories of one project, resolved against `--project`.
struct Project<'a> {
    root: &'a Path,
    config: &'a ProjectConfig,
}

impl Project<'_> {
    fn region_dir(&self, region_id: &str) -> Result<PathBuf, generate::GenerateError> {
        generate::region_dir(&self.root.join(&self.config.database_dir), region_id)
    }

    fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.output_dir)
    }

    fn archive_dir(&self) -> PathBuf {
        self.root.join(&self.config.archive_dir)
    }

    /// The generated datafile and the archive of a region.
    fn published_inputs(
        &self,
        region: &RegionArgs,
    ) -> Result<(Datafile, ArchiveInfo), Box<dyn std::error::Error>> {
        let region_id = generate::check_region_id(&region.region_id)?;
        let datafile = Datafile::load(&self.output_dir().join(region_id).join("data.json"))?;
        let archive = ArchiveInfo::read(&self.archive_dir().join(format!("{region_id}.zip")))?;
        Ok((datafile, archive))
    }
}
