//! State shared between the session workers and the UI

use crate::messages::{LogEntry, LogStore};
use crate::robot::UnitState;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    /// Connecting or connected
    pub fn is_active(self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "DISCONNECTED",
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Cheap-to-clone handle; every clone sees the same state
#[derive(Clone, Default)]
pub struct SessionState {
    connection: Arc<RwLock<ConnectionState>>,
    log: LogStore,
    unit: Arc<RwLock<UnitState>>,
    /// f32 bits of the last capture level
    volume: Arc<AtomicU32>,
    last_error: Arc<RwLock<Option<String>>>,
    watchers: Arc<Mutex<Vec<Sender<ConnectionState>>>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.read()
    }

    pub(crate) fn set_connection_state(&self, next: ConnectionState) {
        let previous = {
            let mut current = self.connection.write();
            std::mem::replace(&mut *current, next)
        };
        if previous == next {
            return;
        }

        debug!("Connection state: {} -> {}", previous, next);
        self.watchers.lock().retain(|tx| tx.send(next).is_ok());
    }

    /// Receive every subsequent connection state change
    pub fn watch_connection(&self) -> Receiver<ConnectionState> {
        let (tx, rx) = unbounded();
        self.watchers.lock().push(tx);
        rx
    }

    pub fn log(&self) -> &LogStore {
        &self.log
    }

    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.log.get_all()
    }

    pub(crate) fn push_log(&self, entry: LogEntry) {
        self.log.add(entry);
    }

    /// Snapshot of the unit
    pub fn unit(&self) -> UnitState {
        self.unit.read().clone()
    }

    pub(crate) fn update_unit<R>(&self, f: impl FnOnce(&mut UnitState) -> R) -> R {
        f(&mut self.unit.write())
    }

    /// Last capture level in [0, 1]
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub(crate) fn set_volume(&self, level: f32) {
        self.volume.store(level.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    pub(crate) fn set_last_error(&self, message: impl Into<String>) {
        *self.last_error.write() = Some(message.into());
    }

    /// Fresh log, unit at the origin, silent meter
    pub(crate) fn reset_for_connect(&self) {
        self.log.reset();
        *self.unit.write() = UnitState::default();
        self.set_volume(0.0);
        *self.last_error.write() = None;
    }
}
