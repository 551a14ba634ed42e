pub mod client;
pub mod prompts;
pub mod protocol;
pub mod tools;
pub mod transport;

pub use client::{GeminiLiveClient, DEFAULT_ENDPOINT};
pub use protocol::{ClientMessage, FunctionCall, FunctionResponse, ServerContent, ServerMessage, SetupPayload, ToolResponse};
pub use tools::ToolCommand;
pub use transport::{LiveConnection, LiveEvent, LiveTransport, OutboundSender};
