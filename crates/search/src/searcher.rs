use crate::engine::IndexHandle;
use crate::error::Result;
use std::sync::Arc;
use std::time::Instant;
use stylefind_protocol::{Filters, ImageHit, SearchResponse};
use stylefind_vector_store::math::l2_normalized;
use stylefind_vector_store::{ExactScan, VectorStore, VectorStoreError};

/// Query-time tuning knobs.
#[derive(Debug, Clone)]
pub struct SearchTuning {
    /// Candidate multiplier applied when attribute filters are present,
    /// compensating for filtered-out candidates. Heuristic, not a hard law.
    pub over_fetch: usize,
    /// Candidate-list breadth for approximate search.
    pub ef_search: usize,
    /// Prefix prepended to record paths when building result URLs.
    pub url_prefix: String,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            over_fetch: 3,
            ef_search: 100,
            url_prefix: "/images/".to_string(),
        }
    }
}

/// Filtered search orchestrator.
///
/// Stateless across calls: dispatches to the approximate index when one is
/// loaded (and aligned with the store), otherwise to the exact fallback,
/// then applies post-hoc attribute filters in ranked order.
pub struct Searcher {
    store: Arc<VectorStore>,
    index: Arc<IndexHandle>,
    tuning: SearchTuning,
}

impl Searcher {
    #[must_use]
    pub fn new(store: Arc<VectorStore>, index: Arc<IndexHandle>, tuning: SearchTuning) -> Self {
        Self {
            store,
            index,
            tuning,
        }
    }

    /// Top-`top_k` hits for a raw query vector, best first.
    ///
    /// The query is normalized here, matching the normalization the builder
    /// applied to indexed vectors. With filters present, `top_k *
    /// over_fetch` candidates are requested; if filtering exhausts them
    /// before `top_k` hits accumulate, the result is short; there is no
    /// re-query.
    pub fn search_vector(
        &self,
        query: &[f32],
        top_k: usize,
        filters: &Filters,
    ) -> Result<Vec<ImageHit>> {
        let query = l2_normalized(query);
        let search_k = if filters.is_empty() {
            top_k
        } else {
            top_k.saturating_mul(self.tuning.over_fetch.max(1))
        };

        let candidates = match self.index.current() {
            Some(index) if index.len() == self.store.len() => {
                index.search(&query, search_k, self.tuning.ef_search)?
            }
            Some(index) => {
                // A stale artifact would hand back positions for a different
                // collection; exact scan is slower but always aligned.
                log::warn!(
                    "Index covers {} vectors but store holds {}; using exact fallback",
                    index.len(),
                    self.store.len()
                );
                ExactScan::new(&self.store).search(&query, search_k)?
            }
            None => {
                log::debug!("No index loaded, using exact fallback");
                ExactScan::new(&self.store).search(&query, search_k)?
            }
        };

        let mut hits = Vec::with_capacity(top_k.min(candidates.len()));
        for (ordinal, score) in candidates {
            let record = match self.store.get_by_position(ordinal) {
                Ok(record) => record,
                Err(VectorStoreError::NotFound(_)) => {
                    log::debug!("Dropping candidate at missing position {ordinal}");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if !filters.accepts(&record.path) {
                continue;
            }
            hits.push(ImageHit {
                image_id: record.id.to_string(),
                path: record.path.clone(),
                url: format!("{}{}", self.tuning.url_prefix, record.path),
                similarity: score.clamp(0.0, 1.0),
            });
            if hits.len() >= top_k {
                break;
            }
        }
        Ok(hits)
    }

    /// Like [`search_vector`](Self::search_vector), wrapped with wall-clock
    /// timing for the response envelope.
    pub fn search_vector_timed(
        &self,
        query: &[f32],
        top_k: usize,
        filters: &Filters,
    ) -> Result<SearchResponse> {
        let started = Instant::now();
        let results = self.search_vector(query, top_k, filters)?;
        Ok(SearchResponse {
            results,
            search_time_ms: elapsed_ms(started),
        })
    }

    #[must_use]
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    #[must_use]
    pub fn index(&self) -> &IndexHandle {
        &self.index
    }
}

/// Elapsed milliseconds, rounded to two decimals.
pub(crate) fn elapsed_ms(started: Instant) -> f64 {
    let ms = started.elapsed().as_secs_f64() * 1000.0;
    (ms * 100.0).round() / 100.0
}
