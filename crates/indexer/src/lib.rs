//! # Stylefind Indexer
//!
//! Batch ingestion and offline index construction.
//!
//! ## Pipeline
//!
//! ```text
//! embeddings.csv (path, embedding)
//!     │
//!     ├──> CSV Loader (idempotent by path)
//!     │      └─> VectorStore, row order = ordinal
//!     │
//!     └──> Index Builder (one-shot)
//!            └─> normalize → HNSW build → index artifact
//! ```

mod builder;
mod error;
mod loader;
mod stats;

pub use builder::IndexBuilder;
pub use error::{IndexerError, Result};
pub use loader::{load_csv, LoadStats, DEFAULT_BATCH_SIZE};
pub use stats::BuildStats;
