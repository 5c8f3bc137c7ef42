use crate::error::{Result, VectorStoreError};
use crate::record::EmbeddingRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Durable record of `(id, path, vector)`, addressable by id, by path and by
/// ordinal position.
///
/// Records are append-only: `put` is idempotent by path, updates and deletes
/// are not supported. Ordinals equal insertion order, so positional lookup is
/// a plain vector index.
///
/// The whole collection lives in memory and persists as a single JSON
/// document; `scan_batches` chunks the in-memory records so consumers stay
/// batch-oriented, it does not stream from disk.
#[derive(Debug, Default)]
pub struct VectorStore {
    records: Vec<EmbeddingRecord>,
    by_path: HashMap<String, usize>,
    by_id: HashMap<u64, usize>,
    dimension: Option<usize>,
    next_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedStore {
    schema_version: u32,
    records: Vec<EmbeddingRecord>,
}

impl VectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vector under `path`, returning the record id.
    ///
    /// Re-inserting an existing path is a no-op that returns the original id.
    /// The first inserted vector establishes the collection dimensionality;
    /// any later vector of a different length is rejected.
    pub fn put(&mut self, path: impl Into<String>, vector: Vec<f32>) -> Result<u64> {
        let path = path.into();
        if let Some(&pos) = self.by_path.get(&path) {
            return Ok(self.records[pos].id);
        }

        if vector.is_empty() {
            return Err(VectorStoreError::Other(format!(
                "Empty vector for path '{path}'"
            )));
        }
        match self.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(VectorStoreError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
            None => self.dimension = Some(vector.len()),
            Some(_) => {}
        }

        let id = self.next_id;
        self.next_id += 1;
        let ordinal = self.records.len();
        let record = EmbeddingRecord {
            id,
            path: path.clone(),
            vector,
            ordinal,
            created_at_unix: unix_now(),
        };
        self.by_path.insert(path, ordinal);
        self.by_id.insert(id, ordinal);
        self.records.push(record);
        Ok(id)
    }

    pub fn get_by_id(&self, id: u64) -> Result<&EmbeddingRecord> {
        self.by_id
            .get(&id)
            .map(|&pos| &self.records[pos])
            .ok_or_else(|| VectorStoreError::NotFound(format!("id {id}")))
    }

    /// Positional lookup, the addressing the approximate index uses.
    pub fn get_by_position(&self, ordinal: usize) -> Result<&EmbeddingRecord> {
        self.records
            .get(ordinal)
            .ok_or_else(|| VectorStoreError::NotFound(format!("position {ordinal}")))
    }

    #[must_use]
    pub fn get_by_path(&self, path: &str) -> Option<&EmbeddingRecord> {
        self.by_path.get(path).map(|&pos| &self.records[pos])
    }

    /// Stream all records in ordinal order, `batch_size` at a time.
    ///
    /// Restartable: each call yields a fresh iterator from position zero.
    pub fn scan_batches(&self, batch_size: usize) -> impl Iterator<Item = &[EmbeddingRecord]> {
        self.records.chunks(batch_size.max(1))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Collection dimensionality, once established by the first insert.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let persisted = PersistedStore {
            schema_version: STORE_SCHEMA_VERSION,
            records: self.records.clone(),
        };
        let bytes = serde_json::to_vec(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::info!("Saved {} records to {}", self.records.len(), path.display());
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let persisted: PersistedStore = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != STORE_SCHEMA_VERSION {
            return Err(VectorStoreError::Other(format!(
                "Unsupported store schema_version {} (expected {STORE_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }

        let mut store = Self::new();
        for (pos, record) in persisted.records.iter().enumerate() {
            if record.ordinal != pos {
                return Err(VectorStoreError::Other(format!(
                    "Store ordinals are not dense: record '{}' has ordinal {} at position {pos}",
                    record.path, record.ordinal
                )));
            }
            match store.dimension {
                Some(expected) if expected != record.vector.len() => {
                    return Err(VectorStoreError::DimensionMismatch {
                        expected,
                        actual: record.vector.len(),
                    });
                }
                None => store.dimension = Some(record.vector.len()),
                Some(_) => {}
            }
            store.by_path.insert(record.path.clone(), pos);
            store.by_id.insert(record.id, pos);
            store.next_id = store.next_id.max(record.id + 1);
        }
        store.records = persisted.records;
        log::info!("Loaded {} records from {}", store.records.len(), path.display());
        Ok(store)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
