use std::path::PathBuf;

use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use stylefind_indexer::{load_csv, IndexBuilder, DEFAULT_BATCH_SIZE};
use stylefind_protocol::Filters;
use stylefind_search::{IndexHandle, SearchTuning, Searcher};
use stylefind_vector_store::{HnswParams, HnswStats, VectorStore};

#[derive(Parser)]
#[command(name = "stylefind")]
#[command(about = "Filtered similarity search over fashion image embeddings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest embeddings from a CSV export into the store
    Load(LoadArgs),
    /// Build the HNSW index artifact from the current store
    BuildIndex(BuildIndexArgs),
    /// Run a filtered similarity search for a query vector
    Search(SearchArgs),
    /// Print store and index shape statistics
    Stats(StatsArgs),
}

#[derive(Args)]
struct LoadArgs {
    /// CSV file with `path` and `embedding` columns
    #[arg(long)]
    csv: PathBuf,

    /// Store file to create or extend
    #[arg(long, default_value = "data/store.json")]
    store: PathBuf,

    /// Rows per ingestion batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

#[derive(Args)]
struct BuildIndexArgs {
    /// Store file to index
    #[arg(long, default_value = "data/store.json")]
    store: PathBuf,

    /// Index artifact to write
    #[arg(long, default_value = "data/index.json")]
    index: PathBuf,

    /// Neighbors per node on upper layers (layer 0 uses twice this)
    #[arg(long, default_value_t = 32)]
    m: usize,

    /// Candidate-list breadth during construction
    #[arg(long, default_value_t = 200)]
    ef_construction: usize,

    /// Seed for deterministic layer assignment
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct SearchArgs {
    /// Store file to search
    #[arg(long, default_value = "data/store.json")]
    store: PathBuf,

    /// Index artifact; falls back to an exact scan when absent
    #[arg(long, default_value = "data/index.json")]
    index: PathBuf,

    /// JSON file containing the query embedding as a float array
    #[arg(long)]
    vector: PathBuf,

    /// Number of results to return
    #[arg(long, default_value_t = 10)]
    top_k: usize,

    /// Restrict results to this group (case-insensitive)
    #[arg(long)]
    group: Option<String>,

    /// Restrict results to this category (exact match)
    #[arg(long)]
    category: Option<String>,

    /// Candidate-list breadth for approximate search
    #[arg(long, default_value_t = 100)]
    ef_search: usize,

    /// Candidate multiplier applied when filters are present
    #[arg(long, default_value_t = 3)]
    over_fetch: usize,

    /// Prefix prepended to record paths in result URLs
    #[arg(long, default_value = "/images/")]
    url_prefix: String,
}

#[derive(Args)]
struct StatsArgs {
    /// Store file to describe
    #[arg(long, default_value = "data/store.json")]
    store: PathBuf,

    /// Index artifact to describe, if one exists
    #[arg(long)]
    index: Option<PathBuf>,
}

#[derive(Serialize)]
struct StatsOutput {
    records: usize,
    dimension: Option<usize>,
    index: Option<HnswStats>,
}

async fn run_load(args: LoadArgs) -> Result<()> {
    let mut store = if args.store.exists() {
        VectorStore::load(&args.store).await?
    } else {
        VectorStore::new()
    };
    let stats = load_csv(&mut store, &args.csv, args.batch_size)?;
    if let Some(parent) = args.store.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    store.save(&args.store).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

async fn run_build_index(args: BuildIndexArgs) -> Result<()> {
    let store = VectorStore::load(&args.store)
        .await
        .with_context(|| format!("loading store from {}", args.store.display()))?;
    let params = HnswParams {
        m: args.m,
        ef_construction: args.ef_construction,
        seed: args.seed,
    };
    if let Some(parent) = args.index.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let stats = IndexBuilder::new(params)
        .build_and_save(&store, &args.index)
        .await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let store = VectorStore::load(&args.store)
        .await
        .with_context(|| format!("loading store from {}", args.store.display()))?;
    let handle = IndexHandle::load_artifact(&args.index).await?;

    let raw = tokio::fs::read_to_string(&args.vector)
        .await
        .with_context(|| format!("reading query vector from {}", args.vector.display()))?;
    let query: Vec<f32> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {} as a JSON float array", args.vector.display()))?;

    let tuning = SearchTuning {
        over_fetch: args.over_fetch,
        ef_search: args.ef_search,
        url_prefix: args.url_prefix,
    };
    let searcher = Searcher::new(store.into(), handle.into(), tuning);
    let filters = Filters {
        group: args.group,
        category: args.category,
    };
    let response = searcher.search_vector_timed(&query, args.top_k, &filters)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run_stats(args: StatsArgs) -> Result<()> {
    let store = VectorStore::load(&args.store)
        .await
        .with_context(|| format!("loading store from {}", args.store.display()))?;
    let index = match &args.index {
        Some(path) => {
            let handle = IndexHandle::load_artifact(path).await?;
            handle.current().map(|index| index.stats())
        }
        None => None,
    };
    let output = StatsOutput {
        records: store.len(),
        dimension: store.dimension(),
        index,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Load(args) => run_load(args).await?,
        Commands::BuildIndex(args) => run_build_index(args).await?,
        Commands::Search(args) => run_search(args).await?,
        Commands::Stats(args) => run_stats(args).await?,
    }

    Ok(())
}
