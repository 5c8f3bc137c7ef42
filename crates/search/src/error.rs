use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] stylefind_vector_store::VectorStoreError),

    #[error("Upstream collaborator unavailable: {0}")]
    Upstream(String),

    #[error("Empty query")]
    EmptyQuery,

    #[error("{0}")]
    Other(String),
}
