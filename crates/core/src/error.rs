use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Unknown segment id: {0}")]
    UnknownSegment(usize),

    #[error("Invalid aggregate input: {0}")]
    InvalidAggregate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for CatalogError {
    fn from(e: config::ConfigError) -> Self {
        CatalogError::Config(e.to_string())
    }
}
