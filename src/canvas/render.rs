//! Seat map rendering.
//!
//! [`render`] turns read-only views of the venue, the viewport and the per-seat
//! visual state into a [`Frame`] of draw commands. It keeps no state between calls:
//! every frame starts with a full clear, so the host can call it on every change.

use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::hit_test::seat_visual_size;
use super::transform::{base_scale, to_screen, CanvasSize, Point, ViewportTransform};
use crate::models::{Seat, SeatStatus, VenueSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color(0xff, 0xff, 0xff);
    pub const SELECTED: Color = Color(0x3b, 0x82, 0xf6);
    pub const HIGHLIGHTED: Color = Color(0xa8, 0x55, 0xf7);
    pub const AVAILABLE: Color = Color(0x22, 0xc5, 0x5e);
    pub const RESERVED: Color = Color(0xf5, 0x9e, 0x0b);
    pub const SOLD: Color = Color(0xef, 0x44, 0x44);
    pub const NEUTRAL: Color = Color(0x9c, 0xa3, 0xaf);
    pub const FOCUS_RING: Color = Color(0x1e, 0x40, 0xaf);
    pub const UPDATE_RING: Color = Color(0xfb, 0xbf, 0x24);

    /// Price tiers 1..=5, cheapest first.
    pub const HEAT: [Color; 5] = [
        Color(0x22, 0xc5, 0x5e),
        Color(0x84, 0xcc, 0x16),
        Color(0xfb, 0xbf, 0x24),
        Color(0xf9, 0x73, 0x16),
        Color(0xef, 0x44, 0x44),
    ];
}

const CORNER_RATIO: f64 = 0.3;
const UPDATE_RING_RATIO: f64 = 0.8;
const FOCUS_LINE_WIDTH: f64 = 2.0;
const UPDATE_LINE_WIDTH: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    FillRoundRect {
        x: f64,
        y: f64,
        size: f64,
        radius: f64,
        color: Color,
    },
    StrokeRoundRect {
        x: f64,
        y: f64,
        size: f64,
        radius: f64,
        color: Color,
        line_width: f64,
    },
    StrokeCircle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: Color,
        line_width: f64,
    },
}

/// One full repaint. Coordinates are CSS pixels; the host scales by `dpr`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn seat_fills(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRoundRect { .. }))
    }
}

/// Membership test the renderer needs from the selection, highlight and update sets.
pub trait SeatSet {
    fn contains_seat(&self, seat_id: &str) -> bool;
}

impl SeatSet for [String] {
    fn contains_seat(&self, seat_id: &str) -> bool {
        self.iter().any(|id| id == seat_id)
    }
}

impl SeatSet for Vec<String> {
    fn contains_seat(&self, seat_id: &str) -> bool {
        self.as_slice().contains_seat(seat_id)
    }
}

impl SeatSet for HashSet<String> {
    fn contains_seat(&self, seat_id: &str) -> bool {
        self.contains(seat_id)
    }
}

impl<V> SeatSet for HashMap<String, V> {
    fn contains_seat(&self, seat_id: &str) -> bool {
        self.contains_key(seat_id)
    }
}

pub struct RenderInput<'a> {
    pub venue: &'a VenueSnapshot,
    pub transform: ViewportTransform,
    pub canvas: CanvasSize,
    pub dpr: f64,
    pub selection: &'a dyn SeatSet,
    pub focus: Option<&'a str>,
    pub highlighted: &'a dyn SeatSet,
    pub updated: &'a dyn SeatSet,
    pub heat_map: bool,
}

pub fn heat_color(price_tier: i32) -> Color {
    match price_tier {
        1..=5 => palette::HEAT[(price_tier - 1) as usize],
        // unknown tiers read as the top of the ramp
        _ => palette::HEAT[4],
    }
}

pub fn status_color(status: SeatStatus) -> Color {
    match status {
        SeatStatus::Available => palette::AVAILABLE,
        SeatStatus::Reserved => palette::RESERVED,
        SeatStatus::Sold => palette::SOLD,
        SeatStatus::Held => palette::NEUTRAL,
    }
}

/// Fill for one seat: selected > highlighted > heat-map tier > status.
pub fn seat_fill(seat: &Seat, input: &RenderInput<'_>) -> Color {
    if input.selection.contains_seat(&seat.id) {
        palette::SELECTED
    } else if input.highlighted.contains_seat(&seat.id) {
        palette::HIGHLIGHTED
    } else if input.heat_map {
        heat_color(seat.price_tier)
    } else {
        status_color(seat.status)
    }
}

pub fn render(input: &RenderInput<'_>) -> Frame {
    let map = input.venue.map_size();
    let (sx, _) = base_scale(input.canvas, map);
    let size = seat_visual_size(input.venue.seat_count()) * sx * input.transform.zoom;
    let half = size / 2.0;
    let radius = size * CORNER_RATIO;
    let ring = size * UPDATE_RING_RATIO;

    let mut commands = Vec::with_capacity(input.venue.seat_count() + 2);
    commands.push(DrawCommand::Clear { color: palette::BACKGROUND });

    for seat in input.venue.seats() {
        let c = to_screen(Point::new(seat.x, seat.y), &input.transform, input.canvas, map);
        if !visible(c, ring.max(half), input.canvas) {
            continue;
        }
        let (x, y) = (c.x - half, c.y - half);
        commands.push(DrawCommand::FillRoundRect {
            x,
            y,
            size,
            radius,
            color: seat_fill(seat, input),
        });
        if input.focus == Some(seat.id.as_str()) {
            commands.push(DrawCommand::StrokeRoundRect {
                x,
                y,
                size,
                radius,
                color: palette::FOCUS_RING,
                line_width: FOCUS_LINE_WIDTH,
            });
        }
        if input.updated.contains_seat(&seat.id) {
            commands.push(DrawCommand::StrokeCircle {
                cx: c.x,
                cy: c.y,
                radius: ring,
                color: palette::UPDATE_RING,
                line_width: UPDATE_LINE_WIDTH,
            });
        }
    }

    Frame {
        width: input.canvas.width,
        height: input.canvas.height,
        dpr: input.dpr,
        commands,
    }
}

fn visible(c: Point, extent: f64, canvas: CanvasSize) -> bool {
    c.x + extent >= 0.0
        && c.y + extent >= 0.0
        && c.x - extent <= canvas.width
        && c.y - extent <= canvas.height
}

pub fn status_legend() -> Vec<(&'static str, Color)> {
    vec![
        ("Available", palette::AVAILABLE),
        ("Selected", palette::SELECTED),
        ("Reserved", palette::RESERVED),
        ("Sold", palette::SOLD),
        ("Held", palette::NEUTRAL),
    ]
}

pub fn heat_map_legend() -> Vec<(&'static str, Color)> {
    vec![
        ("Tier 1 (Low)", palette::HEAT[0]),
        ("Tier 2", palette::HEAT[1]),
        ("Tier 3", palette::HEAT[2]),
        ("Tier 4", palette::HEAT[3]),
        ("Tier 5 (High)", palette::HEAT[4]),
        ("Selected", palette::SELECTED),
    ]
}
