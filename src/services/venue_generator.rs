use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::{MapSize, Row, Seat, SeatStatus, Section, Venue};

/// Shape of a generated demo venue.
#[derive(Debug, Clone)]
pub struct VenueLayout {
    pub venue_id: String,
    pub name: String,
    pub sections: usize,
    pub rows_per_section: usize,
    pub seats_per_row: usize,
    /// Distance between neighbouring seats, in venue units.
    pub pitch: f64,
    pub seed: u64,
}

impl VenueLayout {
    pub fn small() -> Self {
        Self {
            venue_id: "arena-01".into(),
            name: "Metropolis Arena".into(),
            sections: 4,
            rows_per_section: 8,
            seats_per_row: 16,
            pitch: 24.0,
            seed: 7,
        }
    }

    /// 15,000 seats.
    pub fn large() -> Self {
        Self {
            venue_id: "arena-15k".into(),
            name: "Metropolis Arena (15K)".into(),
            sections: 10,
            rows_per_section: 30,
            seats_per_row: 50,
            pitch: 12.0,
            seed: 11,
        }
    }
}

const SECTION_GAP: f64 = 40.0;

fn section_label(i: usize) -> String {
    let letter = char::from(b'A' + (i % 26) as u8);
    if i < 26 {
        letter.to_string()
    } else {
        format!("{letter}{}", i / 26)
    }
}

fn random_status(rng: &mut StdRng) -> SeatStatus {
    match rng.gen_range(0..100) {
        0..=69 => SeatStatus::Available,
        70..=79 => SeatStatus::Reserved,
        80..=94 => SeatStatus::Sold,
        _ => SeatStatus::Held,
    }
}

pub fn generate(layout: &VenueLayout) -> Venue {
    let mut rng = StdRng::seed_from_u64(layout.seed);
    let grid_cols = (layout.sections as f64).sqrt().ceil().max(1.0) as usize;
    let grid_rows = layout.sections.div_ceil(grid_cols);
    let section_w = layout.seats_per_row as f64 * layout.pitch + SECTION_GAP;
    let section_h = layout.rows_per_section as f64 * layout.pitch + SECTION_GAP;

    let sections = (0..layout.sections)
        .map(|s| {
            let label = section_label(s);
            let origin_x = (s % grid_cols) as f64 * section_w + SECTION_GAP;
            let origin_y = (s / grid_cols) as f64 * section_h + SECTION_GAP;
            let rows = (1..=layout.rows_per_section)
                .map(|r| {
                    // front rows cost more
                    let tier = 5 - ((r - 1) * 5 / layout.rows_per_section) as i32;
                    let seats = (1..=layout.seats_per_row)
                        .map(|c| Seat {
                            id: format!("{label}-{r}-{c}"),
                            col: c as i32,
                            x: origin_x + (c - 1) as f64 * layout.pitch,
                            y: origin_y + (r - 1) as f64 * layout.pitch,
                            price_tier: tier,
                            status: random_status(&mut rng),
                        })
                        .collect();
                    Row { index: r as i32, seats }
                })
                .collect();
            Section { id: label.clone(), label, rows }
        })
        .collect();

    Venue {
        venue_id: layout.venue_id.clone(),
        name: layout.name.clone(),
        map: MapSize {
            width: grid_cols as f64 * section_w + SECTION_GAP,
            height: grid_rows as f64 * section_h + SECTION_GAP,
        },
        sections,
    }
}
