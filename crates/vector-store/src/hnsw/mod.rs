//! In-process HNSW (multi-layer navigable small-world graph).
//!
//! Built once over the whole collection and immutable afterwards; node ids
//! are the store ordinals of the vectors they were built from. Vectors are
//! L2-normalized by the builder, so the inner product the graph scores with
//! equals cosine similarity. The query is normalized by the caller, never
//! by the index.

mod index;
mod node;
mod serialize;
mod visited;

pub use index::{HnswIndex, HnswParams, HnswStats};
pub use serialize::INDEX_SCHEMA_VERSION;
