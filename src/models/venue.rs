use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::seat::{Seat, SeatStatus};

/// Logical size of the venue map, the coordinate space seats are authored in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub index: i32,
    pub seats: Vec<Seat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: String,
    pub label: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    #[serde(default)]
    pub venue_id: String,
    pub name: String,
    pub map: MapSize,
    pub sections: Vec<Section>,
}

impl Venue {
    /// Seats in traversal order: section, then row, then seat as authored.
    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.sections
            .iter()
            .flat_map(|section| section.rows.iter().flat_map(|row| row.seats.iter()))
    }
}

/// Where a seat sits inside the venue tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatPosition {
    pub section: usize,
    pub row: usize,
    pub seat: usize,
}

/// Seat id -> position, built once per venue load.
#[derive(Debug, Default)]
pub struct SeatIndex {
    positions: HashMap<String, SeatPosition>,
}

impl SeatIndex {
    pub fn build(venue: &Venue) -> Self {
        let mut positions = HashMap::new();
        for (s, section) in venue.sections.iter().enumerate() {
            for (r, row) in section.rows.iter().enumerate() {
                for (i, seat) in row.seats.iter().enumerate() {
                    let pos = SeatPosition { section: s, row: r, seat: i };
                    if positions.contains_key(&seat.id) {
                        // first occurrence wins, same as traversal order
                        warn!("Duplicate seat id {} in venue {}", seat.id, venue.name);
                        continue;
                    }
                    positions.insert(seat.id.clone(), pos);
                }
            }
        }
        Self { positions }
    }

    pub fn get(&self, seat_id: &str) -> Option<SeatPosition> {
        self.positions.get(seat_id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// What the detail panel shows for one seat.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatDetails {
    pub seat_id: String,
    pub section_label: String,
    pub row_index: i32,
    pub col: i32,
    pub price_tier: i32,
    pub status: SeatStatus,
    pub price: i64,
}

impl fmt::Display for SeatDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Section {}, Row {}, Seat {}, Price Tier {}, Status: {}",
            self.section_label, self.row_index, self.col, self.price_tier, self.status
        )
    }
}

/// Immutable view of a loaded venue.
///
/// Status updates never touch a snapshot in place: [`VenueSnapshot::with_status`]
/// returns a new one, so anything holding the old snapshot keeps a consistent tree.
/// The index is shared between snapshots because updates never change structure.
#[derive(Debug, Clone)]
pub struct VenueSnapshot {
    venue: Arc<Venue>,
    index: Arc<SeatIndex>,
    seat_count: usize,
}

impl VenueSnapshot {
    pub fn new(venue: Venue) -> Self {
        let index = SeatIndex::build(&venue);
        let seat_count = venue.seats().count();
        Self {
            venue: Arc::new(venue),
            index: Arc::new(index),
            seat_count,
        }
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }

    pub fn map_size(&self) -> MapSize {
        self.venue.map
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.venue.seats()
    }

    pub fn seat_count(&self) -> usize {
        self.seat_count
    }

    pub fn available_count(&self) -> usize {
        self.seats().filter(|s| s.is_available()).count()
    }

    pub fn seat(&self, seat_id: &str) -> Option<&Seat> {
        let pos = self.index.get(seat_id)?;
        self.venue
            .sections
            .get(pos.section)?
            .rows
            .get(pos.row)?
            .seats
            .get(pos.seat)
    }

    pub fn details(&self, seat_id: &str) -> Option<SeatDetails> {
        let pos = self.index.get(seat_id)?;
        let section = self.venue.sections.get(pos.section)?;
        let row = section.rows.get(pos.row)?;
        let seat = row.seats.get(pos.seat)?;
        Some(SeatDetails {
            seat_id: seat.id.clone(),
            section_label: section.label.clone(),
            row_index: row.index,
            col: seat.col,
            price_tier: seat.price_tier,
            status: seat.status,
            price: seat.price(),
        })
    }

    /// New snapshot with one seat's status replaced, or `None` for an unknown id.
    pub fn with_status(&self, seat_id: &str, status: SeatStatus) -> Option<VenueSnapshot> {
        let pos = self.index.get(seat_id)?;
        let mut venue = Venue::clone(&self.venue);
        let seat = venue
            .sections
            .get_mut(pos.section)?
            .rows
            .get_mut(pos.row)?
            .seats
            .get_mut(pos.seat)?;
        seat.status = status;
        Some(VenueSnapshot {
            venue: Arc::new(venue),
            index: Arc::clone(&self.index),
            seat_count: self.seat_count,
        })
    }

    /// True when both handles point at the very same tree.
    pub fn same_as(&self, other: &VenueSnapshot) -> bool {
        Arc::ptr_eq(&self.venue, &other.venue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(id: &str, col: i32) -> Seat {
        Seat {
            id: id.to_string(),
            col,
            x: f64::from(col) * 20.0,
            y: 10.0,
            price_tier: 2,
            status: SeatStatus::Available,
        }
    }

    fn venue() -> Venue {
        Venue {
            venue_id: "arena".into(),
            name: "Arena".into(),
            map: MapSize { width: 200.0, height: 100.0 },
            sections: vec![
                Section {
                    id: "A".into(),
                    label: "A".into(),
                    rows: vec![Row { index: 1, seats: vec![seat("A-1-1", 1), seat("A-1-2", 2)] }],
                },
                Section {
                    id: "B".into(),
                    label: "B".into(),
                    rows: vec![Row { index: 4, seats: vec![seat("B-4-7", 7)] }],
                },
            ],
        }
    }

    #[test]
    fn details_resolve_section_and_row() {
        let snap = VenueSnapshot::new(venue());
        let details = snap.details("B-4-7").unwrap();
        assert_eq!(
            details.to_string(),
            "Section B, Row 4, Seat 7, Price Tier 2, Status: available"
        );
        assert_eq!(details.price, 20);
        assert!(snap.details("Z-9-9").is_none());
    }

    #[test]
    fn with_status_leaves_original_snapshot_untouched() {
        let old = VenueSnapshot::new(venue());
        let new = old.with_status("A-1-2", SeatStatus::Sold).unwrap();

        assert_eq!(old.seat("A-1-2").unwrap().status, SeatStatus::Available);
        assert_eq!(new.seat("A-1-2").unwrap().status, SeatStatus::Sold);
        assert!(!old.same_as(&new));
        assert_eq!(new.available_count(), 2);
    }

    #[test]
    fn with_status_unknown_id_is_none() {
        let snap = VenueSnapshot::new(venue());
        assert!(snap.with_status("nope", SeatStatus::Sold).is_none());
    }

    #[test]
    fn venue_document_parses() {
        let doc = r#"{
            "venueId": "arena-01",
            "name": "Metropolis Arena",
            "map": { "width": 1024, "height": 768 },
            "sections": [{
                "id": "A", "label": "Lower Bowl A",
                "transform": { "x": 0, "y": 0, "scale": 1 },
                "rows": [{ "index": 1, "seats": [
                    { "id": "A-1-01", "col": 1, "x": 50, "y": 40, "priceTier": 1, "status": "available" }
                ]}]
            }]
        }"#;
        let venue: Venue = serde_json::from_str(doc).unwrap();
        assert_eq!(venue.name, "Metropolis Arena");
        assert_eq!(venue.seats().count(), 1);
    }
}
