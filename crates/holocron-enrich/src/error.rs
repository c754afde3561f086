use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response from {url} is neither a card array nor {{\"data\": [...]}}")]
    UnexpectedShape { url: String },

    #[error("response from {url} contained no usable cards")]
    EmptyCatalog { url: String },

    #[error("card metadata unavailable; every endpoint failed: {}", attempts.join("; "))]
    MetadataUnavailable { attempts: Vec<String> },

    #[error("metadata cache I/O error at {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
