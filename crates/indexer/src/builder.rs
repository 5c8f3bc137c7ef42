use crate::error::{IndexerError, Result};
use crate::stats::BuildStats;
use std::path::Path;
use std::time::Instant;
use stylefind_vector_store::math::l2_normalized;
use stylefind_vector_store::{HnswIndex, HnswParams, VectorStore};

const SCAN_BATCH: usize = 1000;

/// Offline, one-shot index build.
///
/// Streams the store in insertion order (that order becomes the ordinals
/// the index returns), L2-normalizes every vector, builds the HNSW graph
/// and persists the artifact. Not incremental: re-running after new
/// ingestion is the only way to get new vectors into approximate search.
pub struct IndexBuilder {
    params: HnswParams,
}

impl IndexBuilder {
    #[must_use]
    pub fn new(params: HnswParams) -> Self {
        Self { params }
    }

    /// Build the index over `store` and persist it at `artifact_path`.
    pub async fn build_and_save(
        &self,
        store: &VectorStore,
        artifact_path: impl AsRef<Path>,
    ) -> Result<BuildStats> {
        if store.is_empty() {
            return Err(IndexerError::EmptyStore);
        }
        let artifact_path = artifact_path.as_ref();
        let started = Instant::now();
        log::info!(
            "Building HNSW index over {} vectors (m={}, ef_construction={})",
            store.len(),
            self.params.m,
            self.params.ef_construction
        );

        let mut vectors = Vec::with_capacity(store.len());
        for batch in store.scan_batches(SCAN_BATCH) {
            for record in batch {
                if record.ordinal != vectors.len() {
                    return Err(IndexerError::Other(format!(
                        "Store ordinals are not dense: '{}' has ordinal {}, expected {}",
                        record.path,
                        record.ordinal,
                        vectors.len()
                    )));
                }
                vectors.push(l2_normalized(&record.vector));
            }
        }

        let index = HnswIndex::build(vectors, &self.params)?;

        // Smoke probe: the first indexed vector must rank itself on top.
        if let Ok(record) = store.get_by_position(0) {
            let probe = l2_normalized(&record.vector);
            let top = index.search(&probe, 1, self.params.ef_construction)?;
            match top.first() {
                Some(&(0, _)) => {}
                other => {
                    log::warn!("Post-build probe did not return position 0: {other:?}");
                }
            }
        }

        index.save(artifact_path).await?;
        let artifact_bytes = tokio::fs::metadata(artifact_path).await?.len();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let stats = BuildStats::from_graph(index.stats(), elapsed_ms, artifact_bytes);
        log::info!(
            "Index build complete: {} vectors, {} edges, max layer {}, {} ms, {} bytes",
            stats.vectors,
            stats.total_edges,
            stats.max_layer,
            stats.elapsed_ms,
            stats.artifact_bytes
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tempfile::TempDir;

    fn seeded_store(count: usize, dim: usize, seed: u64) -> VectorStore {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut store = VectorStore::new();
        for i in 0..count {
            let v: Vec<f32> = (0..dim).map(|_| rng.gen::<f32>() - 0.5).collect();
            store.put(format!("WOMEN/Denim/img_{i}.jpg"), v).unwrap();
        }
        store
    }

    #[tokio::test]
    async fn refuses_empty_store() {
        let store = VectorStore::new();
        let builder = IndexBuilder::new(HnswParams::default());
        let err = builder
            .build_and_save(&store, "/nonexistent/index.json")
            .await
            .unwrap_err();
        assert!(matches!(err, IndexerError::EmptyStore));
    }

    #[tokio::test]
    async fn builds_and_persists_a_loadable_artifact() {
        let tmp = TempDir::new().unwrap();
        let artifact = tmp.path().join("index.json");
        let store = seeded_store(100, 16, 21);

        let params = HnswParams {
            m: 8,
            ef_construction: 50,
            seed: Some(21),
        };
        let stats = IndexBuilder::new(params)
            .build_and_save(&store, &artifact)
            .await
            .unwrap();

        assert_eq!(stats.vectors, 100);
        assert_eq!(stats.dimension, 16);
        assert!(stats.artifact_bytes > 0);

        let index = HnswIndex::load(&artifact).await.unwrap();
        assert_eq!(index.len(), store.len());

        // Index positions line up with store ordinals.
        let record = store.get_by_position(37).unwrap();
        let query = l2_normalized(&record.vector);
        let top = index.search(&query, 1, 100).unwrap();
        assert_eq!(top[0].0, 37);
    }
}
