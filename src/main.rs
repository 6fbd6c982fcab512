use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use oe_recipe_resolver::config::{self, ResolverConfig};
use oe_recipe_resolver::layerindex::cache::SnapshotCache;
use oe_recipe_resolver::layerindex::client::LayerIndexClient;
use oe_recipe_resolver::layerindex::folder::DataFolder;
use oe_recipe_resolver::layerindex::{IndexLoader, IndexStats, LayerIndex, SnapshotOrigin};
use oe_recipe_resolver::logging::{self, LogOptions};
use oe_recipe_resolver::matching::{MatchReport, RecipeMatcher};
use oe_recipe_resolver::recipe::{Recipe, RecipeEntry};
use oe_recipe_resolver::version::parse_distance;

#[derive(Parser)]
#[command(name = "oe-recipe-resolver")]
#[command(
    version,
    about = "Match Yocto/OpenEmbedded recipes against the OpenEmbedded layer index"
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Folder holding oe_*.json layer index snapshots
    #[arg(long, global = true)]
    data_folder: Option<PathBuf>,

    /// Never contact the layer index
    #[arg(long, global = true)]
    offline: bool,

    /// Largest accepted nearest-version distance, as an integer or M.m.p
    #[arg(long, global = true, value_parser = parse_distance)]
    max_oe_version_distance: Option<i64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Write logs to the default log file in the data directory
    #[arg(long, global = true, conflicts_with = "log_file")]
    log_to_data_dir: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match a single recipe
    Resolve {
        name: String,
        /// Build version, optionally with an epoch (`1:9.6p1`)
        version: String,
        /// Layer the recipe was built from
        #[arg(long, default_value = "")]
        layer: String,
    },
    /// Match every recipe listed in a JSON file
    Batch {
        /// JSON array of {"name", "version", "layer"?} objects
        file: PathBuf,
    },
    /// Refresh the layer index snapshots
    Fetch,
}

#[derive(Serialize)]
struct FetchSummary {
    stats: IndexStats,
    origins: IndexMap<&'static str, SnapshotOrigin>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = match (&cli.log_file, cli.log_to_data_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(config::log_path()),
        (None, false) => None,
    };
    let _guard = logging::init(&LogOptions {
        verbose: cli.verbose,
        json: cli.log_json,
        file: log_file.as_deref(),
    })?;

    let config = resolve_config(&cli)?;
    debug!("Using configuration {:?}", config);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}

/// Merge the configuration file with command line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<ResolverConfig> {
    let mut config = match &cli.config {
        Some(path) => ResolverConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ResolverConfig::default(),
    };

    if let Some(distance) = cli.max_oe_version_distance {
        config.max_oe_version_distance = distance;
    }
    if let Some(folder) = &cli.data_folder {
        config.data_folder = Some(folder.clone());
    }
    if cli.offline {
        config.layer_index.offline = true;
    }

    Ok(config)
}

async fn run(command: Command, config: ResolverConfig) -> anyhow::Result<()> {
    match command {
        Command::Resolve {
            name,
            version,
            layer,
        } => {
            let index = build_loader(&config, false).load().await;
            let recipe = Recipe::new(name, &version, layer);
            let report = resolve(&index, &recipe, config.max_oe_version_distance);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Batch { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let entries: Vec<RecipeEntry> = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", file.display()))?;

            let index = build_loader(&config, false).load().await;
            let reports: Vec<MatchReport> = entries
                .into_iter()
                .map(Recipe::from)
                .map(|recipe| resolve(&index, &recipe, config.max_oe_version_distance))
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Command::Fetch => {
            let loaded = build_loader(&config, true).load_raw().await;
            let origins = loaded
                .origins
                .iter()
                .map(|(endpoint, origin)| (endpoint.as_str(), *origin))
                .collect();
            let summary = FetchSummary {
                stats: LayerIndex::build(loaded.raw).stats(),
                origins,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn resolve(index: &LayerIndex, recipe: &Recipe, max_version_distance: i64) -> MatchReport {
    let result = RecipeMatcher::new(index, max_version_distance).find(recipe);
    MatchReport::new(recipe, &result)
}

fn build_loader(config: &ResolverConfig, refresh: bool) -> IndexLoader {
    let client = LayerIndexClient::new(&config.layer_index.url);
    let mut loader = IndexLoader::new(Arc::new(client))
        .offline(config.layer_index.offline)
        .refresh(refresh);

    let db_path = config::db_path();
    match open_cache(&db_path, config.layer_index.refresh_interval) {
        Ok(cache) => loader = loader.with_cache(Arc::new(cache)),
        Err(e) => warn!("Snapshot cache unavailable at {:?}: {}", db_path, e),
    }

    if let Some(folder) = &config.data_folder {
        loader = loader.with_data_folder(DataFolder::new(folder));
    }

    loader
}

fn open_cache(db_path: &Path, refresh_interval: i64) -> anyhow::Result<SnapshotCache> {
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(SnapshotCache::new(db_path, refresh_interval)?)
}
