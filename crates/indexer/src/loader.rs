use crate::error::{IndexerError, Result};
use serde::Deserialize;
use std::path::Path;
use stylefind_vector_store::VectorStore;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// One row of the embeddings CSV.
///
/// `embedding` is a JSON-encoded float list, the format the embedding
/// pipeline exports.
#[derive(Debug, Deserialize)]
struct CsvRow {
    path: String,
    embedding: String,
}

/// Outcome of one CSV load.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct LoadStats {
    pub rows: usize,
    pub inserted: usize,
    pub skipped: usize,
}

/// Load embeddings from a CSV with `path` and `embedding` columns.
///
/// Row order defines the ordinal positions a later index build will use.
/// Loading is idempotent: rows whose path already exists are skipped and
/// counted, never updated. Unparseable embeddings abort the load with the
/// offending line number; a partial load is safe to re-run.
pub fn load_csv(
    store: &mut VectorStore,
    csv_path: impl AsRef<Path>,
    batch_size: usize,
) -> Result<LoadStats> {
    let csv_path = csv_path.as_ref();
    let batch_size = batch_size.max(1);
    log::info!("Loading embeddings from {}", csv_path.display());

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut stats = LoadStats::default();

    for (row_idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        // Header is line 1, first record line 2.
        let line = row_idx + 2;

        if store.get_by_path(&row.path).is_some() {
            stats.skipped += 1;
            stats.rows += 1;
            continue;
        }

        let vector: Vec<f32> =
            serde_json::from_str(&row.embedding).map_err(|e| IndexerError::MalformedRow {
                line,
                reason: e.to_string(),
            })?;
        store.put(row.path, vector)?;
        stats.inserted += 1;
        stats.rows += 1;

        if stats.rows % batch_size == 0 {
            log::info!("Loaded {} rows ({} inserted)", stats.rows, stats.inserted);
        }
    }

    log::info!(
        "CSV load complete: {} rows, {} inserted, {} skipped",
        stats.rows,
        stats.inserted,
        stats.skipped
    );
    Ok(stats)
}
