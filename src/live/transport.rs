//! Transport seam between the session and the remote agent

use crate::live::protocol::{ClientMessage, ServerMessage, SetupPayload};
use crate::Result;
use crossbeam_channel::Receiver;
use std::thread::JoinHandle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Events raised by an open transport
#[derive(Debug, Clone)]
pub enum LiveEvent {
    /// Setup acknowledged; the session may start streaming
    Opened,

    /// A decoded server message
    Message(ServerMessage),

    /// The remote side closed the session
    Closed { reason: String },

    /// Transport-level failure; no further events follow
    Error(String),
}

/// Fire-and-forget handle for outgoing messages
#[derive(Debug, Clone)]
pub struct OutboundSender {
    tx: UnboundedSender<ClientMessage>,
}

impl OutboundSender {
    pub fn new(tx: UnboundedSender<ClientMessage>) -> Self {
        Self { tx }
    }

    /// Queue a message. Returns false once the transport is gone.
    pub fn send(&self, message: ClientMessage) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(_) => {
                debug!("Outbound channel closed, dropping message");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// An open live session
pub struct LiveConnection {
    pub outbound: OutboundSender,
    pub events: Receiver<LiveEvent>,
    worker: Option<JoinHandle<()>>,
}

impl LiveConnection {
    pub fn new(outbound: OutboundSender, events: Receiver<LiveEvent>) -> Self {
        Self {
            outbound,
            events,
            worker: None,
        }
    }

    pub fn with_worker(mut self, worker: JoinHandle<()>) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Drop the outbound queue and wait for the transport worker to exit
    pub fn close(self) {
        let Self {
            outbound,
            events,
            worker,
        } = self;
        drop(outbound);
        drop(events);

        if let Some(handle) = worker {
            if handle.join().is_err() {
                warn!("Live transport thread panicked");
            }
        }
    }

    pub fn is_worker_finished(&self) -> bool {
        self.worker
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }
}

pub trait LiveTransport: Send + Sync {
    /// Start a session; `Opened` is raised once the server acknowledges `setup`
    fn open(&self, api_key: &str, setup: SetupPayload) -> Result<LiveConnection>;
}
