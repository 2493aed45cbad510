//! Client side of the live update channel.
//!
//! One [`LiveUpdateHandle`] per enabled session. The socket lives in its own task
//! and reports back through an unbounded channel; every notice carries the session
//! number so the engine can ignore stragglers from a session it already closed.

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::{ChannelError, ProtocolError};
use crate::models::ServerMessage;

const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Channel lifecycle as the user sees it.
///
/// `Connecting` and `Disconnected` share a banner but stay distinct states: the
/// first is waiting on a handshake, the second has lost (or never got) a socket
/// and needs the user to toggle the channel again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Disabled,
    Connecting,
    Connected,
    Disconnected,
}

impl LinkState {
    pub fn is_enabled(self) -> bool {
        !matches!(self, LinkState::Disabled)
    }

    pub fn banner(self) -> Option<&'static str> {
        match self {
            LinkState::Disabled => None,
            LinkState::Connected => Some("Live updates connected"),
            LinkState::Connecting | LinkState::Disconnected => Some("Connecting to live updates..."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Opened,
    Message(ServerMessage),
    Closed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelNotice {
    pub session: u64,
    pub event: ChannelEvent,
}

/// Owns one running connection. Dropping it aborts the socket task.
#[derive(Debug)]
pub struct LiveUpdateHandle {
    session: u64,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LiveUpdateHandle {
    pub fn connect(url: String, session: u64, notices: mpsc::UnboundedSender<ChannelNotice>) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_session(url, session, notices, shutdown_rx));
        Self {
            session,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Send a normal close frame and wait for the socket task to finish.
    pub async fn close(self) {
        self.begin_close().await
    }

    /// Signal the socket task to close right away. The returned future waits up
    /// to the close grace for the task, then aborts it.
    pub fn begin_close(mut self) -> impl Future<Output = ()> + Send + 'static {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let session = self.session;
        let task = self.task.take();
        async move {
            if let Some(mut task) = task {
                if tokio::time::timeout(CLOSE_GRACE, &mut task).await.is_err() {
                    warn!("Live update session {} did not close in time, aborting", session);
                    task.abort();
                }
            }
            info!("Live update session {} closed", session);
        }
    }
}

impl Drop for LiveUpdateHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_session(
    url: String,
    session: u64,
    notices: mpsc::UnboundedSender<ChannelNotice>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let notify = |event: ChannelEvent| {
        let _ = notices.send(ChannelNotice { session, event });
    };

    info!("Establishing live update connection to {}", url);
    let stream = tokio::select! {
        _ = &mut shutdown => return,
        res = connect_async(url.as_str()) => match res {
            Ok((stream, _)) => stream,
            Err(source) => {
                let err = ChannelError::Connect { url: url.clone(), source };
                warn!("{}", err);
                notify(ChannelEvent::Closed { reason: err.to_string() });
                return;
            }
        },
    };
    info!("Live update session {} connected", session);
    notify(ChannelEvent::Opened);

    let (mut write, mut read) = stream.split();
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "live updates disabled".into(),
                };
                if let Err(e) = write.send(Message::Close(Some(frame))).await {
                    debug!("Close frame not delivered: {}", e);
                }
                return;
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match ServerMessage::parse(&text) {
                    Ok(msg) => notify(ChannelEvent::Message(msg)),
                    Err(e) => warn!("Dropping live update {:?}: {}", text, e),
                },
                Some(Ok(Message::Binary(_))) => warn!("Dropping live update: {}", ProtocolError::Binary),
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("closed by server ({}): {}", u16::from(f.code), f.reason))
                        .unwrap_or_else(|| "closed by server".to_string());
                    info!("Live update session {} {}", session, reason);
                    notify(ChannelEvent::Closed { reason });
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let err = ChannelError::Transport(e);
                    warn!("{}", err);
                    notify(ChannelEvent::Closed { reason: err.to_string() });
                    return;
                }
                None => {
                    notify(ChannelEvent::Closed { reason: "connection ended".to_string() });
                    return;
                }
            },
        }
    }
}
