pub mod cache;
pub mod canvas;
pub mod config;
pub mod controllers;
pub mod engine;
pub mod error;
pub mod models;
pub mod runtime;
pub mod services;

use std::sync::Arc;
use tokio::sync::broadcast;

use models::{SeatStatus, ServerMessage};
use services::broadcaster::SeatBoard;
use services::venue_generator::{self, VenueLayout};

const UPDATE_BUFFER: usize = 64;

// Shared state of the demo update server
pub struct AppState {
    pub config: config::Config,
    pub updates: broadcast::Sender<ServerMessage>,
    pub board: SeatBoard,
    pub small_venue: Arc<String>,
    pub large_venue: Arc<String>,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Arc<Self>, serde_json::Error> {
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        let small_venue = serde_json::to_string(&venue_generator::generate(&VenueLayout::small()))?;
        let large_venue = serde_json::to_string(&venue_generator::generate(&VenueLayout::large()))?;
        let board = SeatBoard::new(config.broadcast.tracked_seats, SeatStatus::Available);
        Ok(Arc::new(Self {
            config,
            updates,
            board,
            small_venue: Arc::new(small_venue),
            large_venue: Arc::new(large_venue),
        }))
    }

    /// Connected live-update clients.
    pub fn client_count(&self) -> usize {
        self.updates.receiver_count()
    }
}
