use serde::Serialize;
use stylefind_vector_store::HnswStats;

/// Summary of one offline index build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildStats {
    pub vectors: usize,
    pub dimension: usize,
    pub max_layer: usize,
    pub layer_counts: Vec<usize>,
    pub total_edges: usize,
    pub m: usize,
    pub ef_construction: usize,
    pub elapsed_ms: u64,
    pub artifact_bytes: u64,
}

impl BuildStats {
    pub(crate) fn from_graph(graph: HnswStats, elapsed_ms: u64, artifact_bytes: u64) -> Self {
        Self {
            vectors: graph.num_nodes,
            dimension: graph.dimension,
            max_layer: graph.max_layer,
            layer_counts: graph.layer_counts,
            total_edges: graph.total_edges,
            m: graph.m,
            ef_construction: graph.ef_construction,
            elapsed_ms,
            artifact_bytes,
        }
    }
}
