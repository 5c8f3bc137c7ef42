use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] stylefind_vector_store::VectorStoreError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed embedding at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Cannot build an index over an empty store")]
    EmptyStore,

    #[error("{0}")]
    Other(String),
}
