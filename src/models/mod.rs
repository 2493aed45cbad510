pub mod protocol;
pub mod seat;
pub mod venue;

pub use protocol::ServerMessage;
pub use seat::{Seat, SeatStatus};
pub use venue::{MapSize, Row, SeatDetails, SeatIndex, SeatPosition, Section, Venue, VenueSnapshot};
