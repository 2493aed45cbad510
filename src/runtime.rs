//! Drives a [`SeatMap`] on tokio.
//!
//! A single task owns the engine and feeds it events one at a time, so the engine
//! never needs a lock. Effects are executed here: timers become sleeping tasks that
//! post a [`TimerEvent`] back, venue loads run on their own task, the live channel
//! is a [`LiveUpdateHandle`], and selection writes go through the cache writer.
//! Hosts talk to the loop through a [`RuntimeHandle`] and watch rendered frames.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{SelectionCache, SelectionWriter};
use crate::canvas::Frame;
use crate::config::Config;
use crate::engine::{Command, Effect, EngineSettings, Event, SeatMap, TimerEvent, VenueChoice};
use crate::services::live_updates::{ChannelNotice, LiveUpdateHandle};
use crate::services::venue_loader::{VenueLoader, VenueSource};

#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub settings: EngineSettings,
    pub small_venue: VenueSource,
    pub large_venue: VenueSource,
    pub live_url: String,
    pub cache: SelectionCache,
}

impl RuntimeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            settings: EngineSettings::from_config(config),
            small_venue: VenueSource::parse(&config.venue.small_url),
            large_venue: VenueSource::parse(&config.venue.large_url),
            live_url: config.live.url.clone(),
            cache: SelectionCache::new(
                config.selection.cache_dir.clone(),
                config.selection.cache_key.clone(),
            ),
        }
    }

    fn source(&self, choice: VenueChoice) -> &VenueSource {
        match choice {
            VenueChoice::Small => &self.small_venue,
            VenueChoice::Large => &self.large_venue,
        }
    }
}

/// Host side of a running map.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    events: mpsc::UnboundedSender<Event>,
    frames: watch::Receiver<Option<Arc<Frame>>>,
}

impl RuntimeHandle {
    /// Queue an event; returns false once the loop has stopped.
    pub fn send(&self, event: Event) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn command(&self, command: Command) -> bool {
        self.send(Event::Command(command))
    }

    pub fn frames(&self) -> watch::Receiver<Option<Arc<Frame>>> {
        self.frames.clone()
    }
}

pub struct Runtime {
    engine: SeatMap,
    options: RuntimeOptions,
    loader: VenueLoader,
    writer: Option<SelectionWriter>,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    notices_tx: mpsc::UnboundedSender<ChannelNotice>,
    notices_rx: mpsc::UnboundedReceiver<ChannelNotice>,
    frames: watch::Sender<Option<Arc<Frame>>>,
    expiries: HashMap<String, JoinHandle<()>>,
    limit_timer: Option<JoinHandle<()>>,
    channel: Option<LiveUpdateHandle>,
    stopped: bool,
}

impl Runtime {
    /// Build the runtime and restore the cached selection. A cache that cannot
    /// be read starts the map with an empty selection.
    pub async fn new(options: RuntimeOptions, loader: VenueLoader) -> Self {
        let mut engine = SeatMap::new(options.settings.clone());
        match options.cache.load().await {
            Ok(ids) => {
                if !ids.is_empty() {
                    info!("Restored {} selected seats", ids.len());
                }
                engine.restore_selection(ids);
            }
            Err(e) => warn!("Ignoring unreadable selection cache: {}", e),
        }
        let writer = options.cache.clone().spawn_writer();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let (frames, _) = watch::channel(None);
        Self {
            engine,
            options,
            loader,
            writer: Some(writer),
            events_tx,
            events_rx,
            notices_tx,
            notices_rx,
            frames,
            expiries: HashMap::new(),
            limit_timer: None,
            channel: None,
            stopped: false,
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            events: self.events_tx.clone(),
            frames: self.frames.subscribe(),
        }
    }

    pub fn engine(&self) -> &SeatMap {
        &self.engine
    }

    /// Highlight expiry timers still tracked.
    pub fn pending_expiries(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Kick off the first venue load (and the channel when enabled at startup).
    pub fn boot(&mut self) {
        let effects = self.engine.boot();
        self.execute(effects);
    }

    /// Apply one event and carry out whatever it asks for.
    pub fn dispatch(&mut self, event: Event) {
        let expired = match &event {
            Event::Timer(TimerEvent::UpdateExpired { seat_id, .. }) => Some(seat_id.clone()),
            _ => None,
        };
        let effects = self.engine.apply(event);
        // an accepted expiry leaves the seat un-highlighted; a stale one does not
        if let Some(seat_id) = expired {
            if !self.engine.is_updated(&seat_id) {
                self.expiries.remove(&seat_id);
            }
        }
        self.execute(effects);
    }

    /// Next event from the host, a timer, a venue load or the live channel.
    pub async fn next_event(&mut self) -> Option<Event> {
        tokio::select! {
            event = self.events_rx.recv() => event,
            notice = self.notices_rx.recv() => notice.map(Event::Channel),
        }
    }

    /// Process events until a `Shutdown` command, then tear everything down.
    pub async fn run(mut self) {
        self.boot();
        while !self.stopped {
            match self.next_event().await {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
        self.shutdown().await;
    }

    /// Close the channel, drop pending timers and flush the last selection write.
    pub async fn shutdown(mut self) {
        self.cancel_expiries();
        if let Some(timer) = self.limit_timer.take() {
            timer.abort();
        }
        if let Some(channel) = self.channel.take() {
            channel.close().await;
        }
        if let Some(writer) = self.writer.take() {
            writer.finish().await;
        }
        info!("Seat map runtime stopped");
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        let mut redraw = false;
        for effect in effects {
            match effect {
                Effect::Redraw => redraw = true,
                Effect::PersistSelection(ids) => {
                    if let Some(writer) = &self.writer {
                        writer.persist(ids);
                    }
                }
                Effect::ScheduleUpdateExpiry { seat_id, generation, after } => {
                    let tx = self.events_tx.clone();
                    let id = seat_id.clone();
                    let task = tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(Event::Timer(TimerEvent::UpdateExpired { seat_id: id, generation }));
                    });
                    if let Some(previous) = self.expiries.insert(seat_id, task) {
                        previous.abort();
                    }
                }
                Effect::CancelUpdateExpiries => self.cancel_expiries(),
                Effect::ScheduleLimitNoticeClear { generation, after } => {
                    let tx = self.events_tx.clone();
                    let task = tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(Event::Timer(TimerEvent::LimitNoticeExpired { generation }));
                    });
                    if let Some(previous) = self.limit_timer.replace(task) {
                        previous.abort();
                    }
                }
                Effect::LoadVenue { choice, generation } => {
                    let loader = self.loader.clone();
                    let source = self.options.source(choice).clone();
                    let tx = self.events_tx.clone();
                    debug!("Loading {:?} venue from {:?}", choice, source);
                    tokio::spawn(async move {
                        let result = loader.load(&source).await;
                        let _ = tx.send(Event::VenueLoaded { generation, result });
                    });
                }
                Effect::OpenChannel { session } => {
                    let handle = LiveUpdateHandle::connect(
                        self.options.live_url.clone(),
                        session,
                        self.notices_tx.clone(),
                    );
                    if let Some(previous) = self.channel.replace(handle) {
                        tokio::spawn(previous.begin_close());
                    }
                }
                Effect::CloseChannel { session } => {
                    let current = self.channel.as_ref().map(LiveUpdateHandle::session);
                    if current == Some(session) {
                        if let Some(channel) = self.channel.take() {
                            tokio::spawn(channel.begin_close());
                        }
                    }
                }
                Effect::Stop => self.stopped = true,
            }
        }
        if redraw {
            self.publish_frame();
        }
    }

    fn cancel_expiries(&mut self) {
        for (_, task) in self.expiries.drain() {
            task.abort();
        }
    }

    fn publish_frame(&self) {
        let frame = self.engine.frame().map(Arc::new);
        self.frames.send_replace(frame);
    }
}
