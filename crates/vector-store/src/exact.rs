use crate::error::{Result, VectorStoreError};
use crate::math::cosine_similarity;
use crate::store::VectorStore;
use std::cmp::Ordering;

const SCAN_BATCH: usize = 1000;

/// Brute-force cosine-similarity engine over the full store.
///
/// O(n·D) per query; the correctness oracle for the approximate index and
/// the active engine whenever no index artifact is loaded. Ties are broken
/// by insertion order so results are deterministic.
pub struct ExactScan<'a> {
    store: &'a VectorStore,
}

impl<'a> ExactScan<'a> {
    #[must_use]
    pub fn new(store: &'a VectorStore) -> Self {
        Self { store }
    }

    /// Top-`n` `(ordinal, cosine similarity)` pairs, descending.
    pub fn search(&self, query: &[f32], n: usize) -> Result<Vec<(usize, f32)>> {
        if let Some(expected) = self.store.dimension() {
            if query.len() != expected {
                return Err(VectorStoreError::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = Vec::with_capacity(self.store.len());
        for batch in self.store.scan_batches(SCAN_BATCH) {
            for record in batch {
                scored.push((record.ordinal, cosine_similarity(query, &record.vector)));
            }
        }

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(n);
        Ok(scored)
    }
}
