pub mod broadcaster;
pub mod live_updates;
pub mod selection;
pub mod venue_generator;
pub mod venue_loader;

pub use live_updates::{ChannelEvent, ChannelNotice, LinkState, LiveUpdateHandle};
pub use selection::{find_adjacent, Selection, SelectionSummary, ToggleOutcome};
pub use venue_loader::{VenueLoader, VenueSource};
