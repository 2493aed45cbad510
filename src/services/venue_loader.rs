use std::path::PathBuf;
use tracing::{error, info};

use crate::error::VenueLoadError;
use crate::models::Venue;

/// Where a venue document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueSource {
    Url(String),
    File(PathBuf),
}

impl VenueSource {
    /// `http(s)://` locations are fetched, anything else is read from disk.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            VenueSource::Url(location.to_string())
        } else {
            VenueSource::File(PathBuf::from(location))
        }
    }
}

/// Loads venue documents. Cheap to clone, shares one HTTP connection pool.
#[derive(Debug, Clone, Default)]
pub struct VenueLoader {
    http: reqwest::Client,
}

impl VenueLoader {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn load(&self, source: &VenueSource) -> Result<Venue, VenueLoadError> {
        let result = match source {
            VenueSource::Url(url) => self.fetch(url).await,
            VenueSource::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
        };
        match &result {
            Ok(venue) => info!("Loaded venue {} from {:?}", venue.name, source),
            Err(e) => error!("Error loading venue from {:?}: {}", source, e),
        }
        result
    }

    async fn fetch(&self, url: &str) -> Result<Venue, VenueLoadError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VenueLoadError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
