//! Venue space <-> screen space.
//!
//! `screen = venue * base_scale * zoom + pan`, with `base_scale` computed per axis
//! from the rendered canvas size and the venue's logical map size. Pan is in screen
//! pixels, after scaling. The inverse undoes pan, then zoom, then the base scale.

use serde::{Deserialize, Serialize};

use crate::models::MapSize;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Rendered canvas size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform {
        zoom: 1.0,
        pan_x: 0.0,
        pan_y: 0.0,
    };

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
            ..self
        }
    }

    /// Multiply zoom by `factor` keeping the screen point `anchor` fixed.
    ///
    /// The zoom is clamped before the pan is recomputed, so the fixed point holds
    /// for the zoom actually applied.
    pub fn zoomed_about(self, anchor: Point, factor: f64) -> Self {
        let zoom = clamp_zoom(self.zoom * factor);
        let change = zoom / self.zoom;
        Self {
            zoom,
            pan_x: anchor.x - (anchor.x - self.pan_x) * change,
            pan_y: anchor.y - (anchor.y - self.pan_y) * change,
        }
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoom != 1.0
    }

    pub fn zoom_label(&self) -> String {
        format!("{:.1}x", self.zoom)
    }
}

/// Per-axis ratio between canvas pixels and venue units.
pub fn base_scale(canvas: CanvasSize, map: MapSize) -> (f64, f64) {
    let sx = if map.width > 0.0 { canvas.width / map.width } else { 1.0 };
    let sy = if map.height > 0.0 { canvas.height / map.height } else { 1.0 };
    (sx, sy)
}

pub fn to_screen(p: Point, t: &ViewportTransform, canvas: CanvasSize, map: MapSize) -> Point {
    let (sx, sy) = base_scale(canvas, map);
    Point::new(p.x * sx * t.zoom + t.pan_x, p.y * sy * t.zoom + t.pan_y)
}

pub fn to_venue(p: Point, t: &ViewportTransform, canvas: CanvasSize, map: MapSize) -> Point {
    let (sx, sy) = base_scale(canvas, map);
    Point::new((p.x - t.pan_x) / t.zoom / sx, (p.y - t.pan_y) / t.zoom / sy)
}
