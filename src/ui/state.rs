//! Per-frame view of the session for rendering

use crate::messages::LogEntry;
use crate::robot::UnitState;
use crate::session::{ConnectionState, SessionState};

/// Everything a frame draws, read once so components see one consistent state
#[derive(Debug, Clone, Default)]
pub struct UiSnapshot {
    pub connection: ConnectionState,
    pub logs: Vec<LogEntry>,
    pub unit: UnitState,
    pub volume: f32,
    pub last_error: Option<String>,
}

impl UiSnapshot {
    pub fn capture(state: &SessionState) -> Self {
        Self {
            connection: state.connection_state(),
            logs: state.log_entries(),
            unit: state.unit(),
            volume: state.volume(),
            last_error: state.last_error(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// The error is only relevant while the session sits in Error
    pub fn visible_error(&self) -> Option<&str> {
        match self.connection {
            ConnectionState::Error => self.last_error.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_fresh_state() {
        let snapshot = UiSnapshot::capture(&SessionState::new());
        assert_eq!(snapshot.connection, ConnectionState::Disconnected);
        assert!(snapshot.logs.is_empty());
        assert!(!snapshot.is_online());
        assert_eq!(snapshot.unit, UnitState::default());
    }

    #[test]
    fn test_error_only_visible_in_error_state() {
        let mut snapshot = UiSnapshot {
            last_error: Some("Microphone unavailable".into()),
            ..Default::default()
        };
        assert!(snapshot.visible_error().is_none());

        snapshot.connection = ConnectionState::Error;
        assert_eq!(snapshot.visible_error(), Some("Microphone unavailable"));
    }
}
