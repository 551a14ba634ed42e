use super::types::LogEntry;
use std::sync::Arc;
use parking_lot::RwLock;

/// Append-only communication log shared between the session and the UI
#[derive(Debug, Clone)]
pub struct LogStore {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl LogStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add(&self, entry: LogEntry) {
        self.entries.write().push(entry);
    }

    pub fn get_all(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    /// Drop all entries. Only called when a new session starts.
    pub(crate) fn reset(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}
