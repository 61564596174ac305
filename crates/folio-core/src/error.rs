use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to read site content from {path}: {source}")]
    SiteContentIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
