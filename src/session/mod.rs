pub mod capture;
pub mod controller;
pub mod dispatcher;
pub mod state;

pub use capture::CaptureWorker;
pub use controller::Session;
pub use dispatcher::{EventDispatcher, SessionFlags, INTERRUPTED_MARKER};
pub use state::{ConnectionState, SessionState};
