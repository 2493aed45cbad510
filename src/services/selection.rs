use serde::Serialize;
use tracing::debug;

use crate::canvas::SeatSet;
use crate::models::{Seat, Venue, VenueSnapshot};

pub const MAX_SELECTION: usize = 8;
pub const MIN_ADJACENT: usize = 2;
pub const MAX_ADJACENT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Set is full; nothing changed.
    LimitReached,
    /// Seat is not available; nothing changed.
    Unavailable,
}

/// Seat ids picked by the user, in the order they were picked.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    ids: Vec<String>,
    max: usize,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(MAX_SELECTION)
    }
}

impl Selection {
    pub fn new(max: usize) -> Self {
        Self { ids: Vec::new(), max }
    }

    /// Rebuild from cached ids, dropping duplicates and anything past the limit.
    pub fn restore<I>(ids: I, max: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut selection = Self::new(max);
        for id in ids {
            if selection.ids.len() == max {
                break;
            }
            if !selection.contains(&id) {
                selection.ids.push(id);
            }
        }
        selection
    }

    pub fn toggle(&mut self, seat: &Seat) -> ToggleOutcome {
        if !seat.is_available() {
            return ToggleOutcome::Unavailable;
        }
        if let Some(pos) = self.ids.iter().position(|id| *id == seat.id) {
            self.ids.remove(pos);
            return ToggleOutcome::Deselected;
        }
        if self.ids.len() < self.max {
            self.ids.push(seat.id.clone());
            ToggleOutcome::Selected
        } else {
            debug!("Selection full ({}), rejecting {}", self.max, seat.id);
            ToggleOutcome::LimitReached
        }
    }

    pub fn contains(&self, seat_id: &str) -> bool {
        self.ids.iter().any(|id| id == seat_id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Sum of `tier * 10`; ids that no longer resolve count as zero.
    pub fn subtotal(&self, venue: &VenueSnapshot) -> i64 {
        self.ids
            .iter()
            .filter_map(|id| venue.seat(id))
            .map(Seat::price)
            .sum()
    }

    pub fn summary(&self, venue: &VenueSnapshot) -> SelectionSummary {
        let lines = self
            .ids
            .iter()
            .filter_map(|id| venue.seat(id))
            .map(|seat| SelectedSeatLine {
                seat_id: seat.id.clone(),
                price_tier: seat.price_tier,
                price: seat.price(),
            })
            .collect();
        SelectionSummary {
            count: self.len(),
            max: self.max,
            lines,
            subtotal: self.subtotal(venue),
        }
    }
}

impl SeatSet for Selection {
    fn contains_seat(&self, seat_id: &str) -> bool {
        self.contains(seat_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedSeatLine {
    pub seat_id: String,
    pub price_tier: i32,
    pub price: i64,
}

impl std::fmt::Display for SelectedSeatLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - Tier {} - ${}", self.seat_id, self.price_tier, self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    pub count: usize,
    pub max: usize,
    pub lines: Vec<SelectedSeatLine>,
    pub subtotal: i64,
}

/// First run of `n` available seats with consecutive columns.
///
/// Rows are scanned in traversal order and, within a row, only available seats
/// are considered, in their authored order. A column gap breaks a run even if
/// every seat around it is available. The first qualifying run wins.
pub fn find_adjacent(venue: &Venue, n: usize) -> Option<Vec<&Seat>> {
    if n == 0 {
        return None;
    }
    for section in &venue.sections {
        for row in &section.rows {
            let available: Vec<&Seat> = row.seats.iter().filter(|s| s.is_available()).collect();
            let run = available.windows(n).find(|window| {
                window
                    .windows(2)
                    .all(|pair| pair[0].col.checked_add(1) == Some(pair[1].col))
            });
            if let Some(run) = run {
                return Some(run.to_vec());
            }
        }
    }
    None
}

pub fn clamp_adjacent_count(n: usize) -> usize {
    n.clamp(MIN_ADJACENT, MAX_ADJACENT)
}
