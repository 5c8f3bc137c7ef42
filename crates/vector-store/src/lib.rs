//! # Stylefind Vector Store
//!
//! Vector storage and similarity search over image embeddings.
//!
//! ## Architecture
//!
//! ```text
//! EmbeddingRecord[]
//!     │
//!     ├──> VectorStore
//!     │      └─> id / path / ordinal lookup, batched scans
//!     │
//!     ├──> HnswIndex (built offline over normalized vectors)
//!     │      └─> sub-linear ANN search by inner product
//!     │
//!     └──> ExactScan
//!            └─> O(n·D) cosine fallback + correctness oracle
//! ```
//!
//! The HNSW index addresses vectors by their ordinal position at build time;
//! the store keeps that ordinal on every record so index hits resolve in
//! O(1). Adding vectors to the approximate search path requires a rebuild.

mod error;
mod exact;
mod hnsw;
mod record;
mod store;

pub mod math;

pub use error::{Result, VectorStoreError};
pub use exact::ExactScan;
pub use hnsw::{HnswIndex, HnswParams, HnswStats, INDEX_SCHEMA_VERSION};
pub use record::EmbeddingRecord;
pub use store::{VectorStore, STORE_SCHEMA_VERSION};
