use serde::{Deserialize, Serialize};

/// One stored embedding.
///
/// `ordinal` is the zero-based position of the record at index-build time and
/// the only key the approximate index returns. It is assigned at ingestion
/// and never reused; rebuilding the index is the only way to change the
/// position-to-record mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: u64,
    pub path: String,
    /// Raw (un-normalized) embedding as ingested.
    pub vector: Vec<f32>,
    pub ordinal: usize,
    pub created_at_unix: u64,
}
