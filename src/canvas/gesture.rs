//! Pointer, touch and wheel input -> viewport transform.
//!
//! ```text
//!            mouse down / 1 touch            2nd touch
//!   Idle ─────────────────────────▶ Panning ───────────▶ Pinching
//!    ▲                                 │  ▲    1 left       │
//!    │     mouse up / 0 touches        │  └─────────────────┘
//!    └─────────────────────────────────┴────────────────────┘
//!                  cancel (any state): back to Idle, gesture undone
//! ```

use serde::{Deserialize, Serialize};

use super::transform::{Point, ViewportTransform};

/// Multiplicative zoom per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;
/// A press that travels less than this is a tap, not a pan.
pub const TAP_SLOP_PX: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    MouseDown { point: Point },
    MouseMove { point: Point },
    MouseUp { point: Point },
    /// `touches` is every touch still on the surface, canvas-relative.
    TouchStart { touches: Vec<Point> },
    TouchMove { touches: Vec<Point> },
    TouchEnd { touches: Vec<Point> },
    Wheel { point: Point, delta_y: f64 },
    /// Pointer capture lost (window blur and the like).
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Panning {
        source: PointerSource,
        start: Point,
        last: Point,
        /// Furthest distance from `start` seen during this press.
        travel: f64,
        origin: ViewportTransform,
    },
    Pinching {
        last_distance: f64,
        last_midpoint: Point,
        origin: ViewportTransform,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOutput {
    pub transform: ViewportTransform,
    /// Set when a press ended without moving: the click path should run here.
    pub tap: Option<Point>,
}

#[derive(Debug, Clone)]
pub struct GestureController {
    state: GestureState,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self { state: GestureState::Idle }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Drop any in-flight gesture without touching the transform.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    pub fn handle(&mut self, event: &GestureEvent, current: ViewportTransform) -> GestureOutput {
        let mut tap = None;
        let transform = match event {
            GestureEvent::MouseDown { point } => {
                if matches!(self.state, GestureState::Idle) {
                    self.begin_pan(PointerSource::Mouse, *point, current);
                }
                current
            }
            GestureEvent::MouseMove { point } => self.pan_to(PointerSource::Mouse, *point, current),
            GestureEvent::MouseUp { .. } => {
                tap = self.finish_press(PointerSource::Mouse);
                current
            }
            GestureEvent::TouchStart { touches } => {
                match touches.as_slice() {
                    [] => {}
                    [only] => {
                        if !matches!(self.state, GestureState::Pinching { .. }) {
                            self.begin_pan(PointerSource::Touch, *only, current);
                        }
                    }
                    [a, b, ..] => self.begin_pinch(*a, *b, self.origin_or(current)),
                }
                current
            }
            GestureEvent::TouchMove { touches } => match touches.as_slice() {
                [] => current,
                [only] => self.pan_to(PointerSource::Touch, *only, current),
                [a, b, ..] => self.pinch_to(*a, *b, current),
            },
            GestureEvent::TouchEnd { touches } => {
                match touches.as_slice() {
                    [] => tap = self.finish_press(PointerSource::Touch),
                    [only] => {
                        if let GestureState::Pinching { origin, .. } = self.state {
                            // the remaining finger keeps panning, never a tap
                            self.state = GestureState::Panning {
                                source: PointerSource::Touch,
                                start: *only,
                                last: *only,
                                travel: f64::INFINITY,
                                origin,
                            };
                        }
                    }
                    _ => {}
                }
                current
            }
            GestureEvent::Wheel { point, delta_y } => {
                if matches!(self.state, GestureState::Pinching { .. }) || *delta_y == 0.0 {
                    current
                } else if *delta_y < 0.0 {
                    current.zoomed_about(*point, WHEEL_ZOOM_STEP)
                } else {
                    current.zoomed_about(*point, 1.0 / WHEEL_ZOOM_STEP)
                }
            }
            GestureEvent::Cancel => {
                let restored = match self.state {
                    GestureState::Idle => current,
                    GestureState::Panning { origin, .. } | GestureState::Pinching { origin, .. } => {
                        origin
                    }
                };
                self.state = GestureState::Idle;
                restored
            }
        };
        GestureOutput { transform, tap }
    }

    fn origin_or(&self, current: ViewportTransform) -> ViewportTransform {
        match self.state {
            GestureState::Idle => current,
            GestureState::Panning { origin, .. } | GestureState::Pinching { origin, .. } => origin,
        }
    }

    fn begin_pan(&mut self, source: PointerSource, at: Point, current: ViewportTransform) {
        self.state = GestureState::Panning {
            source,
            start: at,
            last: at,
            travel: 0.0,
            origin: current,
        };
    }

    fn begin_pinch(&mut self, a: Point, b: Point, origin: ViewportTransform) {
        self.state = GestureState::Pinching {
            last_distance: a.distance(b),
            last_midpoint: a.midpoint(b),
            origin,
        };
    }

    fn pan_to(&mut self, from: PointerSource, point: Point, current: ViewportTransform) -> ViewportTransform {
        match &mut self.state {
            GestureState::Panning { source, start, last, travel, .. } if *source == from => {
                let dx = point.x - last.x;
                let dy = point.y - last.y;
                *last = point;
                *travel = travel.max(start.distance(point));
                current.translated(dx, dy)
            }
            _ => current,
        }
    }

    fn pinch_to(&mut self, a: Point, b: Point, current: ViewportTransform) -> ViewportTransform {
        if !matches!(self.state, GestureState::Pinching { .. }) {
            // two fingers moving without a recorded start: start pinching from here
            let origin = self.origin_or(current);
            self.begin_pinch(a, b, origin);
            return current;
        }
        let GestureState::Pinching { last_distance, last_midpoint, .. } = &mut self.state else {
            return current;
        };
        let distance = a.distance(b);
        let midpoint = a.midpoint(b);
        let next = if *last_distance > f64::EPSILON {
            current.zoomed_about(midpoint, distance / *last_distance)
        } else {
            current
        };
        *last_distance = distance;
        *last_midpoint = midpoint;
        next
    }

    fn finish_press(&mut self, from: PointerSource) -> Option<Point> {
        let tap = match self.state {
            GestureState::Panning { source, last, travel, .. } if source == from && travel < TAP_SLOP_PX => {
                Some(last)
            }
            _ => None,
        };
        self.state = GestureState::Idle;
        tap
    }
}
