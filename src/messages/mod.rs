pub mod storage;
pub mod types;

pub use storage::LogStore;
pub use types::{AudioData, LogEntry, LogSource};
