//! Headless seat map client.
//!
//! Loads the configured venue, turns on live updates, asks for a block of
//! adjacent seats and selects it, then logs what the map looks like every few
//! seconds. Usage: `headless [SECONDS] [ADJACENT]`.

use clap::Parser;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seating_map::config::Config;
use seating_map::engine::{AdjacentOutcome, Command, Event, VenueState};
use seating_map::runtime::{Runtime, RuntimeOptions};
use seating_map::services::VenueLoader;

const REPORT_EVERY: Duration = Duration::from_secs(3);

#[derive(Debug, Parser)]
#[command(name = "headless")]
#[command(about = "Drive a seat map against the configured venue and update server")]
struct Args {
    /// How long to run, in seconds
    #[arg(default_value_t = 10)]
    seconds: u64,

    /// Size of the adjacent block to look for and select (clamped to 2..=8)
    #[arg(default_value_t = 4)]
    adjacent: usize,
}

fn report(runtime: &Runtime) {
    let engine = runtime.engine();
    let Some(venue) = engine.snapshot() else {
        info!("Venue not loaded: {:?}", engine.venue_state());
        return;
    };
    info!(
        "{}: {} seats, {} available, zoom {}, live: {}",
        venue.venue().name,
        venue.seat_count(),
        venue.available_count(),
        engine.transform().zoom_label(),
        engine.link_state().banner().unwrap_or("off"),
    );
    if let Some(summary) = engine.summary() {
        info!("Selected {}/{}", summary.count, summary.max);
        for line in &summary.lines {
            info!("  {}", line);
        }
        info!("  Subtotal: ${}", summary.subtotal);
    }
    if let Some(details) = engine.focused_details() {
        info!("Focused: {}", details);
    }
    let updated: Vec<&str> = engine.updated_ids().collect();
    if !updated.is_empty() {
        info!("Recently updated: {}", updated.join(", "));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = RuntimeOptions::from_config(&config);
    let mut runtime = Runtime::new(options, VenueLoader::default()).await;
    let handle = runtime.handle();
    let mut frames = handle.frames();
    runtime.boot();

    let deadline = tokio::time::sleep(Duration::from_secs(args.seconds));
    tokio::pin!(deadline);
    let mut ticker = tokio::time::interval(REPORT_EVERY);
    let mut searched = false;
    let mut selected = false;

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = ticker.tick() => report(&runtime),
            Ok(()) = frames.changed() => {
                if let Some(frame) = frames.borrow_and_update().as_ref() {
                    debug!(
                        "Frame: {} seats drawn, {} commands",
                        frame.seat_fills().count(),
                        frame.commands.len()
                    );
                }
            }
            event = runtime.next_event() => match event {
                Some(event) => runtime.dispatch(event),
                None => break,
            },
        }

        if !searched && matches!(runtime.engine().venue_state(), VenueState::Ready(_)) {
            searched = true;
            handle.command(Command::EnableLive);
            handle.command(Command::SetAdjacentCount(args.adjacent));
            handle.command(Command::FindAdjacent);
        }
        if !selected {
            if let Some(AdjacentOutcome::Found(ids)) = runtime.engine().adjacent_outcome().cloned() {
                selected = true;
                if runtime.engine().selection().is_empty() {
                    for id in ids {
                        handle.send(Event::Command(Command::ToggleSeat(id)));
                    }
                }
            }
        }
        if runtime.is_stopped() {
            break;
        }
    }

    report(&runtime);
    runtime.shutdown().await;
    Ok(())
}
