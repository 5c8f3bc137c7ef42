//! # Stylefind Search
//!
//! Filtered similarity search orchestration.
//!
//! A query runs embed → search → filter → assemble: the query vector is
//! normalized, dispatched to the approximate index when one is loaded (the
//! exact fallback otherwise), candidates resolve to records by ordinal
//! position, attribute filters prune them in ranked order, and survivors
//! become hits with similarity clamped to [0, 1].
//!
//! The embedding producer and translator are collaborator traits injected
//! at startup; the loaded index lives behind [`IndexHandle`] and is only
//! ever replaced wholesale after an offline rebuild.

mod embedder;
mod engine;
mod error;
mod resolve;
mod searcher;
mod service;

pub use embedder::Embedder;
pub use engine::IndexHandle;
pub use error::{Result, SearchError};
pub use resolve::{QueryResolver, TermTable, Translator};
pub use searcher::{SearchTuning, Searcher};
pub use service::SearchService;
