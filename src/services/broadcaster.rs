//! Random seat-status feed for the demo update server.

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

use crate::models::{SeatStatus, ServerMessage};
use crate::AppState;

/// Seats `A-1-1` to `A-1-N` and the status last broadcast for each.
#[derive(Debug)]
pub struct SeatBoard {
    seats: Mutex<Vec<(String, SeatStatus)>>,
}

impl SeatBoard {
    pub fn new(count: u32, initial: SeatStatus) -> Self {
        let seats = (1..=count).map(|i| (format!("A-1-{i}"), initial)).collect();
        Self { seats: Mutex::new(seats) }
    }

    pub fn len(&self) -> usize {
        self.seats.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Give one random seat a random status and return the update to send.
    pub fn shuffle<R: Rng>(&self, rng: &mut R) -> Option<ServerMessage> {
        let mut seats = self.seats.lock().ok()?;
        let (seat_id, status) = seats.choose_mut(rng)?;
        *status = *SeatStatus::ALL.choose(rng)?;
        Some(ServerMessage::SeatUpdate {
            seat_id: seat_id.clone(),
            status: *status,
            timestamp: Utc::now().timestamp_millis(),
        })
    }

    pub fn status(&self, seat_id: &str) -> Option<SeatStatus> {
        let seats = self.seats.lock().ok()?;
        seats.iter().find(|(id, _)| id == seat_id).map(|(_, s)| *s)
    }
}

/// Broadcast one random update per tick while anyone is listening.
pub async fn run(state: Arc<AppState>) {
    let period = Duration::from_millis(state.config.broadcast.interval_ms.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // first tick fires immediately
    ticker.tick().await;
    info!("Broadcasting seat updates every {:?}", period);
    loop {
        ticker.tick().await;
        if state.client_count() == 0 {
            continue;
        }
        let update = {
            let mut rng = rand::thread_rng();
            state.board.shuffle(&mut rng)
        };
        let Some(update) = update else {
            continue;
        };
        if let ServerMessage::SeatUpdate { seat_id, status, .. } = &update {
            debug!("Seat {} -> {}", seat_id, status);
        }
        let _ = state.updates.send(update);
    }
}
