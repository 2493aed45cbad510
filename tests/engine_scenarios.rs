use seating_map::canvas::{CanvasSize, GestureEvent, Point};
use seating_map::engine::{
    AdjacentOutcome, Command, EngineSettings, Event, InputEvent, SeatMap, TimerEvent,
};
use seating_map::models::{MapSize, Row, Seat, SeatStatus, Section, ServerMessage, Venue};
use seating_map::services::{ChannelEvent, ChannelNotice};

fn one_row(count: i32) -> Venue {
    let seats = (1..=count)
        .map(|c| Seat {
            id: format!("S{c}"),
            col: c,
            x: f64::from(c) * 30.0,
            y: 30.0,
            price_tier: 2,
            status: SeatStatus::Available,
        })
        .collect();
    Venue {
        venue_id: "scenario".into(),
        name: "Scenario".into(),
        map: MapSize { width: f64::from(count + 1) * 30.0, height: 60.0 },
        sections: vec![Section {
            id: "A".into(),
            label: "A".into(),
            rows: vec![Row { index: 1, seats }],
        }],
    }
}

fn loaded(venue: Venue) -> SeatMap {
    let mut map = SeatMap::new(EngineSettings::default());
    map.boot();
    let canvas = CanvasSize::new(venue.map.width, venue.map.height);
    map.apply(Event::Input(InputEvent::Resize { canvas, dpr: 1.0 }));
    map.apply(Event::VenueLoaded { generation: 1, result: Ok(venue) });
    map
}

fn click(map: &mut SeatMap, col: i32) {
    let point = Point::new(f64::from(col) * 30.0, 30.0);
    map.apply(Event::Input(InputEvent::Gesture(GestureEvent::MouseDown { point })));
    map.apply(Event::Input(InputEvent::Gesture(GestureEvent::MouseUp { point })));
}

#[test]
fn adjacent_pair_then_toggle_first_seat() {
    let mut map = loaded(one_row(5));

    map.apply(Event::Command(Command::SetAdjacentCount(2)));
    map.apply(Event::Command(Command::FindAdjacent));
    let mut highlighted: Vec<&String> = map.highlighted().iter().collect();
    highlighted.sort();
    assert_eq!(highlighted, ["S1", "S2"]);
    assert_eq!(map.focus(), Some("S1"));
    assert_eq!(
        map.adjacent_outcome(),
        Some(&AdjacentOutcome::Found(vec!["S1".into(), "S2".into()]))
    );

    click(&mut map, 1);
    assert_eq!(map.selection().ids(), ["S1".to_string()]);
    click(&mut map, 1);
    assert!(map.selection().is_empty());
}

#[test]
fn ninth_seat_is_rejected_with_notice() {
    let mut map = loaded(one_row(12));
    for col in 1..=8 {
        click(&mut map, col);
    }
    let before = map.selection().clone();
    click(&mut map, 9);
    assert_eq!(map.selection(), &before);
    assert!(map.limit_notice_visible());

    map.apply(Event::Command(Command::ClearSelection));
    assert!(map.selection().is_empty());
    assert!(!map.limit_notice_visible());
    assert_eq!(map.summary().unwrap().subtotal, 0);
}

#[test]
fn update_for_unknown_seat_changes_nothing() {
    let mut map = loaded(one_row(5));
    map.apply(Event::Command(Command::EnableLive));
    let session = map.session();
    let before = map.snapshot().unwrap().clone();

    let effects = map.apply(Event::Channel(ChannelNotice {
        session,
        event: ChannelEvent::Message(ServerMessage::SeatUpdate {
            seat_id: "X-1-1".into(),
            status: SeatStatus::Sold,
            timestamp: 1_700_000_000_000,
        }),
    }));
    assert!(effects.is_empty());
    assert!(map.snapshot().unwrap().same_as(&before));
    assert_eq!(map.updated_ids().count(), 0);
}

#[test]
fn expiry_only_clears_its_own_seat() {
    let mut map = loaded(one_row(5));
    map.apply(Event::Command(Command::EnableLive));
    let session = map.session();
    let mut generations = Vec::new();
    for id in ["S1", "S2"] {
        let effects = map.apply(Event::Channel(ChannelNotice {
            session,
            event: ChannelEvent::Message(ServerMessage::SeatUpdate {
                seat_id: id.into(),
                status: SeatStatus::Reserved,
                timestamp: 0,
            }),
        }));
        generations.extend(effects.iter().filter_map(|e| match e {
            seating_map::engine::Effect::ScheduleUpdateExpiry { generation, .. } => Some(*generation),
            _ => None,
        }));
    }
    assert_eq!(generations.len(), 2);

    map.apply(Event::Timer(TimerEvent::UpdateExpired {
        seat_id: "S1".into(),
        generation: generations[0],
    }));
    assert!(!map.is_updated("S1"));
    assert!(map.is_updated("S2"));
}

#[test]
fn sold_seat_cannot_be_selected_by_keyboard() {
    let mut venue = one_row(3);
    venue.sections[0].rows[0].seats[1].status = SeatStatus::Sold;
    let mut map = loaded(venue);
    map.apply(Event::Input(InputEvent::Focus("S2".into())));
    map.apply(Event::Input(InputEvent::Activate));
    assert!(map.selection().is_empty());
    assert_eq!(
        map.focused_details().unwrap().to_string(),
        "Section A, Row 1, Seat 2, Price Tier 2, Status: sold"
    );
}

#[test]
fn heat_map_toggle_and_zoom_label() {
    let mut map = loaded(one_row(5));
    assert!(!map.heat_map());
    map.apply(Event::Command(Command::ToggleHeatMap));
    assert!(map.heat_map());

    assert_eq!(map.transform().zoom_label(), "1.0x");
    map.apply(Event::Input(InputEvent::Gesture(GestureEvent::Wheel {
        point: Point::new(10.0, 10.0),
        delta_y: -120.0,
    })));
    assert_eq!(map.transform().zoom_label(), "1.1x");
}
