use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

// Top-level configuration, one section per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub venue: VenueConfig,
    pub live: LiveConfig,
    pub broadcast: BroadcastConfig,
    pub selection: SelectionConfig,
    pub features: FeatureFlags,
}

// Process settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Where the two venue documents live (http(s) URL or file path)
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    pub small_url: String,
    pub large_url: String,
}

// Live update channel
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    pub url: String,
    pub highlight_ms: u64,
}

// Demo update server broadcast loop
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    pub interval_ms: u64,
    pub tracked_seats: u32,
}

// Selection limits and the client-local cache
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    pub cache_dir: PathBuf,
    pub cache_key: String,
    pub max_seats: usize,
    pub limit_notice_ms: u64,
}

// Initial state of the display toggles
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub heat_map: bool,
    pub live_updates: bool,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(key, default);
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = parse_var("PORT", "8080")?;
        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "seating_map=debug,tower_http=debug"),
            },
            venue: VenueConfig {
                small_url: var_or("VENUE_URL", &format!("http://localhost:{port}/venue.json")),
                large_url: var_or(
                    "VENUE_LARGE_URL",
                    &format!("http://localhost:{port}/venue-large.json"),
                ),
            },
            live: LiveConfig {
                url: var_or("LIVE_UPDATES_URL", &format!("ws://localhost:{port}/ws")),
                highlight_ms: parse_var("LIVE_HIGHLIGHT_MS", "1000")?,
            },
            broadcast: BroadcastConfig {
                interval_ms: parse_var("BROADCAST_INTERVAL_MS", "3000")?,
                tracked_seats: parse_var("BROADCAST_TRACKED_SEATS", "100")?,
            },
            selection: SelectionConfig {
                cache_dir: PathBuf::from(var_or("SELECTION_CACHE_DIR", ".seating-map")),
                cache_key: var_or("SELECTION_CACHE_KEY", "selectedSeats"),
                max_seats: parse_var("SELECTION_MAX_SEATS", "8")?,
                limit_notice_ms: parse_var("SELECTION_LIMIT_NOTICE_MS", "3000")?,
            },
            features: FeatureFlags {
                heat_map: parse_var("ENABLE_HEAT_MAP", "false")?,
                live_updates: parse_var("ENABLE_LIVE_UPDATES", "false")?,
            },
        })
    }
}
