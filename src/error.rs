use thiserror::Error;

/// Venue document could not be fetched or decoded. Recoverable by reloading.
#[derive(Debug, Error)]
pub enum VenueLoadError {
    #[error("venue request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("venue source answered with status {0}")]
    Status(u16),
    #[error("venue file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("venue document is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A live-update frame that is not a valid protocol message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed live update: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary frames are not part of the protocol")]
    Binary,
}

/// Connection-level failure of the live update channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("live update transport failed: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("selection cache io: {0}")]
    Io(#[from] std::io::Error),
    #[error("selection cache contents are not a list of seat ids: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl VenueLoadError {
    /// Message shown next to the retry affordance.
    pub fn user_message(&self) -> String {
        match self {
            VenueLoadError::Status(code) => {
                format!("Failed to load venue data ({code}). Please try again.")
            }
            _ => "Failed to load venue data. Please try again.".to_string(),
        }
    }
}
