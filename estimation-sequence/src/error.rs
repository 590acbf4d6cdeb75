use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Sequence not found: {0}")]
    SequenceNotFound(String),

    #[error("Value not found: {0}")]
    ValueNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
