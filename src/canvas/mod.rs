pub mod gesture;
pub mod render;
pub mod transform;

pub use gesture::{GestureController, GestureEvent, GestureOutput, GestureState};
pub use hit_test::{hit_test, seat_visual_size};
pub use render::{render, Color, DrawCommand, Frame, RenderInput, SeatSet};
pub use transform::{to_screen, to_venue, CanvasSize, Point, ViewportTransform, MAX_ZOOM, MIN_ZOOM};
