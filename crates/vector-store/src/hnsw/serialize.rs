//! Index artifact persistence.
//!
//! The artifact carries the graph structure plus the per-node normalized
//! vectors, so a loaded index answers queries exactly like the pre-save one.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::index::HnswIndex;
use super::node::Node;
use crate::error::{Result, VectorStoreError};

pub const INDEX_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    schema_version: u32,
    m: usize,
    ef_construction: usize,
    entry_point: Option<usize>,
    max_layer: usize,
    nodes: Vec<Node>,
    vectors: Vec<Vec<f32>>,
}

impl HnswIndex {
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let persisted = PersistedIndex {
            schema_version: INDEX_SCHEMA_VERSION,
            m: self.m,
            ef_construction: self.ef_construction,
            entry_point: self.entry_point,
            max_layer: self.max_layer,
            nodes: self.nodes.clone(),
            vectors: self.vectors.clone(),
        };
        let bytes = serde_json::to_vec(&persisted)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::info!(
            "Saved index artifact ({} nodes) to {}",
            self.nodes.len(),
            path.display()
        );
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let persisted: PersistedIndex = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != INDEX_SCHEMA_VERSION {
            return Err(VectorStoreError::Other(format!(
                "Unsupported index schema_version {} (expected {INDEX_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }
        if persisted.nodes.len() != persisted.vectors.len() {
            return Err(VectorStoreError::Other(format!(
                "Corrupt index artifact: {} nodes but {} vectors",
                persisted.nodes.len(),
                persisted.vectors.len()
            )));
        }
        log::info!(
            "Loaded index artifact ({} nodes) from {}",
            persisted.nodes.len(),
            path.display()
        );
        Ok(Self::from_parts(
            persisted.vectors,
            persisted.nodes,
            persisted.entry_point,
            persisted.max_layer,
            persisted.m,
            persisted.ef_construction,
        ))
    }
}
