//! Seat map state container.
//!
//! All interaction state lives in [`SeatMap`] and changes only through
//! [`SeatMap::apply`]. Transitions are synchronous and never perform I/O: anything
//! that must happen later or elsewhere (timers, sockets, disk, venue loads) is
//! returned as an [`Effect`] for the runtime to carry out. Events are applied one
//! at a time in delivery order, which is the whole ordering story.

use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::canvas::{
    hit_test, render, seat_visual_size, to_venue, CanvasSize, Frame, GestureController,
    GestureEvent, Point, RenderInput, ViewportTransform,
};
use crate::error::VenueLoadError;
use crate::models::{SeatDetails, SeatStatus, ServerMessage, Venue, VenueSnapshot};
use crate::services::live_updates::{ChannelEvent, ChannelNotice, LinkState};
use crate::services::selection::{
    clamp_adjacent_count, find_adjacent, Selection, SelectionSummary, ToggleOutcome, MAX_SELECTION,
    MIN_ADJACENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueChoice {
    Small,
    Large,
}

impl VenueChoice {
    pub fn other(self) -> Self {
        match self {
            VenueChoice::Small => VenueChoice::Large,
            VenueChoice::Large => VenueChoice::Small,
        }
    }
}

#[derive(Debug, Clone)]
pub enum VenueState {
    Loading,
    Ready(VenueSnapshot),
    /// Load failed; `Reload` retries.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjacentOutcome {
    Found(Vec<String>),
    NotFound(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Gesture(GestureEvent),
    Resize { canvas: CanvasSize, dpr: f64 },
    /// Enter or Space on the focused seat.
    Activate,
    Focus(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ResetView,
    FindAdjacent,
    SetAdjacentCount(usize),
    ToggleHeatMap,
    EnableLive,
    DisableLive,
    SwitchVenue,
    Reload,
    ToggleSeat(String),
    ClearSelection,
    DismissLimitNotice,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    UpdateExpired { seat_id: String, generation: u64 },
    LimitNoticeExpired { generation: u64 },
}

#[derive(Debug)]
pub enum Event {
    Input(InputEvent),
    Command(Command),
    Channel(ChannelNotice),
    Timer(TimerEvent),
    VenueLoaded {
        generation: u64,
        result: Result<Venue, VenueLoadError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Redraw,
    PersistSelection(Vec<String>),
    ScheduleUpdateExpiry {
        seat_id: String,
        generation: u64,
        after: Duration,
    },
    CancelUpdateExpiries,
    ScheduleLimitNoticeClear {
        generation: u64,
        after: Duration,
    },
    LoadVenue {
        choice: VenueChoice,
        generation: u64,
    },
    OpenChannel {
        session: u64,
    },
    CloseChannel {
        session: u64,
    },
    Stop,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub max_selection: usize,
    pub update_highlight: Duration,
    pub limit_notice: Duration,
    pub heat_map: bool,
    pub live_updates: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_selection: MAX_SELECTION,
            update_highlight: Duration::from_millis(1000),
            limit_notice: Duration::from_millis(3000),
            heat_map: false,
            live_updates: false,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            max_selection: config.selection.max_seats,
            update_highlight: Duration::from_millis(config.live.highlight_ms),
            limit_notice: Duration::from_millis(config.selection.limit_notice_ms),
            heat_map: config.features.heat_map,
            live_updates: config.features.live_updates,
        }
    }
}

#[derive(Debug)]
pub struct SeatMap {
    settings: EngineSettings,
    choice: VenueChoice,
    venue: VenueState,
    venue_generation: u64,
    transform: ViewportTransform,
    gesture: GestureController,
    canvas: CanvasSize,
    dpr: f64,
    selection: Selection,
    focus: Option<String>,
    highlighted: HashSet<String>,
    adjacent_count: usize,
    adjacent_outcome: Option<AdjacentOutcome>,
    /// Seat id -> generation of its pending expiry.
    updated: HashMap<String, u64>,
    limit_notice: Option<u64>,
    heat_map: bool,
    link: LinkState,
    session: u64,
    next_generation: u64,
}

impl SeatMap {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            choice: VenueChoice::Small,
            venue: VenueState::Loading,
            venue_generation: 0,
            transform: ViewportTransform::IDENTITY,
            gesture: GestureController::new(),
            canvas: CanvasSize::new(1024.0, 768.0),
            dpr: 1.0,
            selection: Selection::new(settings.max_selection),
            focus: None,
            highlighted: HashSet::new(),
            adjacent_count: MIN_ADJACENT,
            adjacent_outcome: None,
            updated: HashMap::new(),
            limit_notice: None,
            heat_map: settings.heat_map,
            link: LinkState::Disabled,
            session: 0,
            next_generation: 0,
            settings,
        }
    }

    /// Seed the selection from the client cache. Called once before `boot`.
    pub fn restore_selection(&mut self, ids: Vec<String>) {
        self.selection = Selection::restore(ids, self.settings.max_selection);
    }

    /// Effects that start the map: first venue load, and the channel if enabled.
    pub fn boot(&mut self) -> Vec<Effect> {
        let mut effects = vec![self.begin_load()];
        if self.settings.live_updates {
            effects.extend(self.enable_live());
        }
        effects
    }

    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Input(input) => self.on_input(input),
            Event::Command(command) => self.on_command(command),
            Event::Channel(notice) => self.on_channel(notice),
            Event::Timer(timer) => self.on_timer(timer),
            Event::VenueLoaded { generation, result } => self.on_venue_loaded(generation, result),
        }
    }

    fn on_input(&mut self, input: InputEvent) -> Vec<Effect> {
        match input {
            InputEvent::Gesture(event) => {
                let out = self.gesture.handle(&event, self.transform);
                let mut effects = Vec::new();
                if out.transform != self.transform {
                    self.transform = out.transform;
                    effects.push(Effect::Redraw);
                }
                if let Some(point) = out.tap {
                    effects.extend(self.click_at(point));
                }
                effects
            }
            InputEvent::Resize { canvas, dpr } => {
                self.canvas = canvas;
                self.dpr = dpr;
                vec![Effect::Redraw]
            }
            InputEvent::Activate => match self.focus.clone() {
                Some(id) => self.activate(&id),
                None => Vec::new(),
            },
            InputEvent::Focus(seat_id) => {
                if self.snapshot().and_then(|v| v.seat(&seat_id)).is_none() {
                    return Vec::new();
                }
                self.focus = Some(seat_id);
                vec![Effect::Redraw]
            }
        }
    }

    fn on_command(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::ResetView => {
                self.gesture.reset();
                self.transform = ViewportTransform::IDENTITY;
                vec![Effect::Redraw]
            }
            Command::FindAdjacent => self.find_adjacent(),
            Command::SetAdjacentCount(n) => {
                self.adjacent_count = clamp_adjacent_count(n);
                Vec::new()
            }
            Command::ToggleHeatMap => {
                self.heat_map = !self.heat_map;
                vec![Effect::Redraw]
            }
            Command::EnableLive => self.enable_live(),
            Command::DisableLive => self.disable_live(),
            Command::SwitchVenue => {
                // the selection carries over; ids the new venue lacks count as zero
                self.choice = self.choice.other();
                self.focus = None;
                self.highlighted.clear();
                self.adjacent_outcome = None;
                let mut effects = vec![Effect::CancelUpdateExpiries];
                self.updated.clear();
                effects.push(self.begin_load());
                effects.push(Effect::Redraw);
                effects
            }
            Command::Reload => vec![self.begin_load(), Effect::Redraw],
            Command::ToggleSeat(seat_id) => self.activate(&seat_id),
            Command::ClearSelection => {
                self.selection.clear();
                self.limit_notice = None;
                vec![Effect::PersistSelection(Vec::new()), Effect::Redraw]
            }
            Command::DismissLimitNotice => {
                self.limit_notice = None;
                Vec::new()
            }
            Command::Shutdown => {
                let mut effects = self.disable_live();
                effects.push(Effect::Stop);
                effects
            }
        }
    }

    fn on_channel(&mut self, notice: ChannelNotice) -> Vec<Effect> {
        if !self.link.is_enabled() || notice.session != self.session {
            debug!("Ignoring notice from stale live session {}", notice.session);
            return Vec::new();
        }
        match notice.event {
            ChannelEvent::Opened => {
                self.link = LinkState::Connected;
                Vec::new()
            }
            ChannelEvent::Closed { reason } => {
                warn!("Live updates disconnected: {}", reason);
                self.link = LinkState::Disconnected;
                Vec::new()
            }
            ChannelEvent::Message(ServerMessage::Connected { message }) => {
                info!("Live update server says: {}", message);
                Vec::new()
            }
            ChannelEvent::Message(ServerMessage::SeatUpdate { seat_id, status, .. }) => {
                self.apply_seat_update(seat_id, status)
            }
        }
    }

    fn on_timer(&mut self, timer: TimerEvent) -> Vec<Effect> {
        match timer {
            TimerEvent::UpdateExpired { seat_id, generation } => {
                if self.updated.get(&seat_id) == Some(&generation) {
                    self.updated.remove(&seat_id);
                    vec![Effect::Redraw]
                } else {
                    Vec::new()
                }
            }
            TimerEvent::LimitNoticeExpired { generation } => {
                if self.limit_notice == Some(generation) {
                    self.limit_notice = None;
                }
                Vec::new()
            }
        }
    }

    fn on_venue_loaded(&mut self, generation: u64, result: Result<Venue, VenueLoadError>) -> Vec<Effect> {
        if generation != self.venue_generation {
            debug!("Discarding superseded venue load {}", generation);
            return Vec::new();
        }
        self.venue = match result {
            Ok(venue) => VenueState::Ready(VenueSnapshot::new(venue)),
            Err(e) => VenueState::Failed(e.user_message()),
        };
        vec![Effect::Redraw]
    }

    fn begin_load(&mut self) -> Effect {
        self.venue_generation += 1;
        self.venue = VenueState::Loading;
        Effect::LoadVenue {
            choice: self.choice,
            generation: self.venue_generation,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn enable_live(&mut self) -> Vec<Effect> {
        if matches!(self.link, LinkState::Connecting | LinkState::Connected) {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if self.link == LinkState::Disconnected {
            effects.push(Effect::CloseChannel { session: self.session });
        }
        self.session += 1;
        self.link = LinkState::Connecting;
        effects.push(Effect::OpenChannel { session: self.session });
        effects
    }

    fn disable_live(&mut self) -> Vec<Effect> {
        if !self.link.is_enabled() {
            return Vec::new();
        }
        self.link = LinkState::Disabled;
        self.updated.clear();
        vec![
            Effect::CloseChannel { session: self.session },
            Effect::CancelUpdateExpiries,
            Effect::Redraw,
        ]
    }

    fn apply_seat_update(&mut self, seat_id: String, status: SeatStatus) -> Vec<Effect> {
        let VenueState::Ready(snapshot) = &self.venue else {
            return Vec::new();
        };
        let Some(next) = snapshot.with_status(&seat_id, status) else {
            debug!("Ignoring update for unknown seat {}", seat_id);
            return Vec::new();
        };
        debug!("Seat update received: {} -> {}", seat_id, status);
        self.venue = VenueState::Ready(next);
        let generation = self.next_generation();
        self.updated.insert(seat_id.clone(), generation);
        vec![
            Effect::ScheduleUpdateExpiry {
                seat_id,
                generation,
                after: self.settings.update_highlight,
            },
            Effect::Redraw,
        ]
    }

    fn click_at(&mut self, screen: Point) -> Vec<Effect> {
        let Some(snapshot) = self.snapshot() else {
            return Vec::new();
        };
        let point = to_venue(screen, &self.transform, self.canvas, snapshot.map_size());
        let size = seat_visual_size(snapshot.seat_count());
        let hit = hit_test(point, snapshot.seats(), size).map(|seat| seat.id.clone());
        match hit {
            Some(id) => self.activate(&id),
            None => Vec::new(),
        }
    }

    /// Click path: focus the seat and toggle it. Unavailable seats are inert.
    fn activate(&mut self, seat_id: &str) -> Vec<Effect> {
        let Some(seat) = self.snapshot().and_then(|v| v.seat(seat_id)).cloned() else {
            return Vec::new();
        };
        if !seat.is_available() {
            return Vec::new();
        }
        self.focus = Some(seat.id.clone());
        let mut effects = Vec::new();
        match self.selection.toggle(&seat) {
            ToggleOutcome::Selected => {
                self.limit_notice = None;
                effects.push(Effect::PersistSelection(self.selection.ids().to_vec()));
            }
            ToggleOutcome::Deselected => {
                effects.push(Effect::PersistSelection(self.selection.ids().to_vec()));
            }
            ToggleOutcome::LimitReached => {
                let generation = self.next_generation();
                self.limit_notice = Some(generation);
                effects.push(Effect::ScheduleLimitNoticeClear {
                    generation,
                    after: self.settings.limit_notice,
                });
            }
            ToggleOutcome::Unavailable => {}
        }
        effects.push(Effect::Redraw);
        effects
    }

    fn find_adjacent(&mut self) -> Vec<Effect> {
        let Some(snapshot) = self.snapshot() else {
            return Vec::new();
        };
        let n = self.adjacent_count;
        let found: Option<Vec<String>> = find_adjacent(snapshot.venue(), n)
            .map(|run| run.iter().map(|seat| seat.id.clone()).collect());
        match found {
            Some(ids) => {
                self.highlighted = ids.iter().cloned().collect();
                self.focus = ids.first().cloned();
                self.adjacent_outcome = Some(AdjacentOutcome::Found(ids));
            }
            None => {
                info!("No {} adjacent seats found", n);
                self.highlighted.clear();
                self.adjacent_outcome = Some(AdjacentOutcome::NotFound(n));
            }
        }
        vec![Effect::Redraw]
    }

    pub fn snapshot(&self) -> Option<&VenueSnapshot> {
        match &self.venue {
            VenueState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn venue_state(&self) -> &VenueState {
        &self.venue
    }

    pub fn venue_choice(&self) -> VenueChoice {
        self.choice
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn focused_details(&self) -> Option<SeatDetails> {
        let id = self.focus.as_deref()?;
        self.snapshot()?.details(id)
    }

    pub fn highlighted(&self) -> &HashSet<String> {
        &self.highlighted
    }

    pub fn adjacent_count(&self) -> usize {
        self.adjacent_count
    }

    pub fn adjacent_outcome(&self) -> Option<&AdjacentOutcome> {
        self.adjacent_outcome.as_ref()
    }

    pub fn is_updated(&self, seat_id: &str) -> bool {
        self.updated.contains_key(seat_id)
    }

    pub fn updated_ids(&self) -> impl Iterator<Item = &str> {
        self.updated.keys().map(String::as_str)
    }

    pub fn limit_notice_visible(&self) -> bool {
        self.limit_notice.is_some()
    }

    pub fn heat_map(&self) -> bool {
        self.heat_map
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn summary(&self) -> Option<SelectionSummary> {
        Some(self.selection.summary(self.snapshot()?))
    }

    /// Current frame, or `None` while there is no venue to draw.
    pub fn frame(&self) -> Option<Frame> {
        let venue = self.snapshot()?;
        Some(render(&RenderInput {
            venue,
            transform: self.transform,
            canvas: self.canvas,
            dpr: self.dpr,
            selection: &self.selection,
            focus: self.focus.as_deref(),
            highlighted: &self.highlighted,
            updated: &self.updated,
            heat_map: self.heat_map,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::render::palette;
    use crate::canvas::DrawCommand;
    use crate::models::{MapSize, Row, Seat, Section};

    // 12 seats 20px apart on one row; seat 5 is sold. With the canvas sized to
    // the map the base scale is 1, so screen and venue coordinates coincide.
    fn venue() -> Venue {
        let seats = (1..=12)
            .map(|c| Seat {
                id: format!("A-1-{c}"),
                col: c,
                x: f64::from(c) * 20.0,
                y: 20.0,
                price_tier: 3,
                status: if c == 5 { SeatStatus::Sold } else { SeatStatus::Available },
            })
            .collect();
        Venue {
            venue_id: "v".into(),
            name: "Test Hall".into(),
            map: MapSize { width: 280.0, height: 40.0 },
            sections: vec![Section {
                id: "A".into(),
                label: "A".into(),
                rows: vec![Row { index: 1, seats }],
            }],
        }
    }

    fn ready() -> SeatMap {
        let mut map = SeatMap::new(EngineSettings::default());
        let effects = map.boot();
        assert_eq!(
            effects,
            vec![Effect::LoadVenue { choice: VenueChoice::Small, generation: 1 }]
        );
        map.apply(Event::Input(InputEvent::Resize {
            canvas: CanvasSize::new(280.0, 40.0),
            dpr: 1.0,
        }));
        map.apply(Event::VenueLoaded { generation: 1, result: Ok(venue()) });
        map
    }

    fn click(map: &mut SeatMap, x: f64, y: f64) -> Vec<Effect> {
        let point = Point::new(x, y);
        map.apply(Event::Input(InputEvent::Gesture(GestureEvent::MouseDown { point })));
        map.apply(Event::Input(InputEvent::Gesture(GestureEvent::MouseUp { point })))
    }

    fn click_seat(map: &mut SeatMap, col: i32) -> Vec<Effect> {
        click(map, f64::from(col) * 20.0, 20.0)
    }

    fn live(map: &mut SeatMap) -> u64 {
        map.apply(Event::Command(Command::EnableLive));
        let session = map.session();
        map.apply(Event::Channel(ChannelNotice { session, event: ChannelEvent::Opened }));
        session
    }

    fn update(map: &mut SeatMap, session: u64, seat_id: &str, status: SeatStatus) -> Vec<Effect> {
        map.apply(Event::Channel(ChannelNotice {
            session,
            event: ChannelEvent::Message(ServerMessage::SeatUpdate {
                seat_id: seat_id.into(),
                status,
                timestamp: 0,
            }),
        }))
    }

    #[test]
    fn tap_on_available_seat_selects_and_focuses() {
        let mut map = ready();
        let effects = click_seat(&mut map, 2);
        assert!(effects.contains(&Effect::PersistSelection(vec!["A-1-2".into()])));
        assert_eq!(map.focus(), Some("A-1-2"));
        assert_eq!(
            map.focused_details().unwrap().to_string(),
            "Section A, Row 1, Seat 2, Price Tier 3, Status: available"
        );

        click_seat(&mut map, 2);
        assert!(map.selection().is_empty());
    }

    #[test]
    fn tap_on_sold_seat_changes_nothing() {
        let mut map = ready();
        let effects = click_seat(&mut map, 5);
        assert!(effects.is_empty());
        assert!(map.selection().is_empty());
        assert_eq!(map.focus(), None);
    }

    #[test]
    fn tap_off_the_row_hits_nothing() {
        let mut map = ready();
        click(&mut map, 30.0, 35.0);
        assert!(map.selection().is_empty());
    }

    #[test]
    fn drag_is_not_a_tap() {
        let mut map = ready();
        let start = Point::new(40.0, 20.0);
        map.apply(Event::Input(InputEvent::Gesture(GestureEvent::MouseDown { point: start })));
        map.apply(Event::Input(InputEvent::Gesture(GestureEvent::MouseMove {
            point: Point::new(50.0, 20.0),
        })));
        map.apply(Event::Input(InputEvent::Gesture(GestureEvent::MouseMove { point: start })));
        map.apply(Event::Input(InputEvent::Gesture(GestureEvent::MouseUp { point: start })));
        assert!(map.selection().is_empty());
        assert_eq!(map.transform().pan_x, 0.0);
    }

    #[test]
    fn ninth_seat_raises_limit_notice_until_timer() {
        let mut map = ready();
        for col in [1, 2, 3, 4, 6, 7, 8, 9] {
            click_seat(&mut map, col);
        }
        assert_eq!(map.selection().len(), 8);

        let effects = click_seat(&mut map, 10);
        assert_eq!(map.selection().len(), 8);
        assert!(!map.selection().contains("A-1-10"));
        assert!(map.limit_notice_visible());
        let generation = effects
            .iter()
            .find_map(|e| match e {
                Effect::ScheduleLimitNoticeClear { generation, .. } => Some(*generation),
                _ => None,
            })
            .unwrap();

        // a second rejection restarts the notice; the first timer is now stale
        click_seat(&mut map, 11);
        map.apply(Event::Timer(TimerEvent::LimitNoticeExpired { generation }));
        assert!(map.limit_notice_visible());

        map.apply(Event::Command(Command::DismissLimitNotice));
        assert!(!map.limit_notice_visible());
    }

    #[test]
    fn deselect_below_limit_clears_notice_on_next_select() {
        let mut map = ready();
        for col in [1, 2, 3, 4, 6, 7, 8, 9, 10] {
            click_seat(&mut map, col);
        }
        assert!(map.limit_notice_visible());
        click_seat(&mut map, 1);
        click_seat(&mut map, 10);
        assert!(!map.limit_notice_visible());
        assert!(map.selection().contains("A-1-10"));
    }

    #[test]
    fn keyboard_activation_toggles_focused_seat() {
        let mut map = ready();
        map.apply(Event::Input(InputEvent::Focus("A-1-3".into())));
        map.apply(Event::Input(InputEvent::Activate));
        assert!(map.selection().contains("A-1-3"));

        map.apply(Event::Input(InputEvent::Focus("nope".into())));
        assert_eq!(map.focus(), Some("A-1-3"));
    }

    #[test]
    fn seat_update_replaces_snapshot_and_expires() {
        let mut map = ready();
        let session = live(&mut map);
        assert_eq!(map.link_state(), LinkState::Connected);
        let before = map.snapshot().unwrap().clone();

        let effects = update(&mut map, session, "A-1-1", SeatStatus::Sold);
        let after = map.snapshot().unwrap();
        assert!(!after.same_as(&before));
        assert_eq!(after.seat("A-1-1").unwrap().status, SeatStatus::Sold);
        assert_eq!(before.seat("A-1-1").unwrap().status, SeatStatus::Available);
        assert!(map.is_updated("A-1-1"));

        let first = match &effects[0] {
            Effect::ScheduleUpdateExpiry { generation, after, .. } => {
                assert_eq!(*after, Duration::from_millis(1000));
                *generation
            }
            other => panic!("unexpected effect {other:?}"),
        };

        // second update restarts the highlight, so the first expiry is ignored
        update(&mut map, session, "A-1-1", SeatStatus::Available);
        map.apply(Event::Timer(TimerEvent::UpdateExpired {
            seat_id: "A-1-1".into(),
            generation: first,
        }));
        assert!(map.is_updated("A-1-1"));

        map.apply(Event::Timer(TimerEvent::UpdateExpired {
            seat_id: "A-1-1".into(),
            generation: first + 1,
        }));
        assert!(!map.is_updated("A-1-1"));
    }

    #[test]
    fn unknown_seat_update_is_ignored() {
        let mut map = ready();
        let session = live(&mut map);
        let before = map.snapshot().unwrap().clone();
        let effects = update(&mut map, session, "Z-9-9", SeatStatus::Sold);
        assert!(effects.is_empty());
        assert!(map.snapshot().unwrap().same_as(&before));
        assert_eq!(map.updated_ids().count(), 0);
    }

    #[test]
    fn notices_from_old_sessions_are_dropped() {
        let mut map = ready();
        let old = live(&mut map);
        map.apply(Event::Command(Command::DisableLive));
        let new = live(&mut map);
        assert_ne!(old, new);

        let effects = update(&mut map, old, "A-1-1", SeatStatus::Sold);
        assert!(effects.is_empty());
        map.apply(Event::Channel(ChannelNotice {
            session: old,
            event: ChannelEvent::Closed { reason: "bye".into() },
        }));
        assert_eq!(map.link_state(), LinkState::Connected);
    }

    #[test]
    fn disabling_live_clears_highlights() {
        let mut map = ready();
        let session = live(&mut map);
        update(&mut map, session, "A-1-1", SeatStatus::Held);
        let effects = map.apply(Event::Command(Command::DisableLive));
        assert!(effects.contains(&Effect::CloseChannel { session }));
        assert!(effects.contains(&Effect::CancelUpdateExpiries));
        assert_eq!(map.updated_ids().count(), 0);
        assert_eq!(map.link_state(), LinkState::Disabled);
        // status change itself stays
        assert_eq!(map.snapshot().unwrap().seat("A-1-1").unwrap().status, SeatStatus::Held);
    }

    #[test]
    fn lost_connection_can_be_reenabled() {
        let mut map = ready();
        let session = live(&mut map);
        map.apply(Event::Channel(ChannelNotice {
            session,
            event: ChannelEvent::Closed { reason: "gone".into() },
        }));
        assert_eq!(map.link_state(), LinkState::Disconnected);
        let effects = map.apply(Event::Command(Command::EnableLive));
        assert_eq!(
            effects,
            vec![
                Effect::CloseChannel { session },
                Effect::OpenChannel { session: session + 1 },
            ]
        );
    }

    #[test]
    fn find_adjacent_highlights_first_run() {
        let mut map = ready();
        map.apply(Event::Command(Command::SetAdjacentCount(5)));
        map.apply(Event::Command(Command::FindAdjacent));
        // seat 5 is sold, so 1..=4 is too short and 6..=10 is the first run
        let expected: Vec<String> = (6..=10).map(|c| format!("A-1-{c}")).collect();
        assert_eq!(map.adjacent_outcome(), Some(&AdjacentOutcome::Found(expected)));
        assert_eq!(map.focus(), Some("A-1-6"));
        assert_eq!(map.highlighted().len(), 5);

        map.apply(Event::Command(Command::SetAdjacentCount(8)));
        map.apply(Event::Command(Command::FindAdjacent));
        assert_eq!(map.adjacent_outcome(), Some(&AdjacentOutcome::NotFound(8)));
        assert!(map.highlighted().is_empty());
    }

    #[test]
    fn adjacent_count_is_clamped() {
        let mut map = ready();
        map.apply(Event::Command(Command::SetAdjacentCount(0)));
        assert_eq!(map.adjacent_count(), 2);
        map.apply(Event::Command(Command::SetAdjacentCount(40)));
        assert_eq!(map.adjacent_count(), 8);
    }

    #[test]
    fn superseded_venue_load_is_ignored() {
        let mut map = SeatMap::new(EngineSettings::default());
        map.boot();
        let effects = map.apply(Event::Command(Command::Reload));
        assert!(effects.contains(&Effect::LoadVenue { choice: VenueChoice::Small, generation: 2 }));

        map.apply(Event::VenueLoaded { generation: 1, result: Ok(venue()) });
        assert!(matches!(map.venue_state(), VenueState::Loading));

        map.apply(Event::VenueLoaded {
            generation: 2,
            result: Err(VenueLoadError::Status(503)),
        });
        match map.venue_state() {
            VenueState::Failed(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected state {other:?}"),
        }
        assert!(map.frame().is_none());
    }

    #[test]
    fn switching_venue_keeps_selection() {
        let mut map = ready();
        click_seat(&mut map, 1);
        let effects = map.apply(Event::Command(Command::SwitchVenue));
        assert!(!effects.iter().any(|e| matches!(e, Effect::PersistSelection(_))));
        assert!(effects.contains(&Effect::LoadVenue { choice: VenueChoice::Large, generation: 2 }));
        assert_eq!(map.venue_choice(), VenueChoice::Large);
        assert!(map.focus().is_none());
        assert!(map.selection().contains("A-1-1"));

        let mut other = venue();
        for seat in &mut other.sections[0].rows[0].seats {
            seat.id = seat.id.replace("A-", "B-");
        }
        map.apply(Event::VenueLoaded { generation: 2, result: Ok(other) });
        let summary = map.summary().unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.subtotal, 0);
    }

    #[test]
    fn restored_selection_survives_load() {
        let mut map = SeatMap::new(EngineSettings::default());
        map.restore_selection(vec!["A-1-1".into(), "gone".into()]);
        map.boot();
        map.apply(Event::VenueLoaded { generation: 1, result: Ok(venue()) });
        let summary = map.summary().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.subtotal, 30);
        assert_eq!(summary.lines[0].to_string(), "A-1-1 - Tier 3 - $30");
    }

    #[test]
    fn frame_paints_selection_and_rings() {
        let mut map = ready();
        let session = live(&mut map);
        click_seat(&mut map, 2);
        update(&mut map, session, "A-1-3", SeatStatus::Reserved);

        let frame = map.frame().unwrap();
        let fills: Vec<_> = frame
            .seat_fills()
            .filter_map(|c| match c {
                DrawCommand::FillRoundRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 12);
        assert_eq!(fills[1], palette::SELECTED);
        assert_eq!(fills[2], palette::RESERVED);
        assert!(frame.commands.iter().any(|c| matches!(
            c,
            DrawCommand::StrokeRoundRect { color, .. } if *color == palette::FOCUS_RING
        )));
        assert!(frame.commands.iter().any(|c| matches!(
            c,
            DrawCommand::StrokeCircle { color, .. } if *color == palette::UPDATE_RING
        )));
    }

    #[test]
    fn reset_view_restores_identity() {
        let mut map = ready();
        map.apply(Event::Input(InputEvent::Gesture(GestureEvent::Wheel {
            point: Point::new(100.0, 20.0),
            delta_y: -1.0,
        })));
        assert!(map.transform().is_zoomed());
        map.apply(Event::Command(Command::ResetView));
        assert_eq!(map.transform(), ViewportTransform::IDENTITY);
    }
}
