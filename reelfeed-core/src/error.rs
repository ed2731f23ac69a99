use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Ranking error: {0}")]
    Ranking(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
