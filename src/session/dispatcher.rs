//! Single consumer of inbound live events
//!
//! All state changes driven by the remote agent happen here, in arrival
//! order: transcripts, tool calls, audio scheduling and interruptions.

use crate::audio::codec::decode_frame;
use crate::audio::PlaybackScheduler;
use crate::live::protocol::{ServerContent, ServerMessage, ToolCall, ToolResponse};
use crate::live::tools::{ToolCommand, DEFAULT_TOOL_RESULT};
use crate::live::{ClientMessage, FunctionResponse, LiveEvent, OutboundSender};
use crate::messages::LogEntry;
use crate::robot::{self, TurnDirection};
use crate::session::state::{ConnectionState, SessionState};
use crossbeam_channel::{select, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Log text for a cut-off agent turn
pub const INTERRUPTED_MARKER: &str = "⛔ [INTERRUPTED]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherCommand {
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Flags shared with the capture worker
#[derive(Debug, Clone, Default)]
pub struct SessionFlags {
    /// Captured audio is forwarded only while set
    pub streaming: Arc<AtomicBool>,
    /// Set once by `disconnect`; everything after is a no-op
    pub torn_down: Arc<AtomicBool>,
}

impl SessionFlags {
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    pub fn tear_down(&self) {
        self.streaming.store(false, Ordering::SeqCst);
        self.torn_down.store(true, Ordering::SeqCst);
    }
}

pub struct EventDispatcher {
    state: SessionState,
    outbound: OutboundSender,
    playback: PlaybackScheduler,
    flags: SessionFlags,
    greeting: String,
    playback_rate: u32,
    pending_user: String,
    pending_agent: String,
}

impl EventDispatcher {
    pub fn new(
        state: SessionState,
        outbound: OutboundSender,
        playback: PlaybackScheduler,
        flags: SessionFlags,
        greeting: impl Into<String>,
        playback_rate: u32,
    ) -> Self {
        Self {
            state,
            outbound,
            playback,
            flags,
            greeting: greeting.into(),
            playback_rate,
            pending_user: String::new(),
            pending_agent: String::new(),
        }
    }

    /// Drain events until shutdown, remote close or a dropped event channel
    pub fn run(mut self, events: Receiver<LiveEvent>, control: Receiver<DispatcherCommand>) {
        info!("Session dispatcher started");

        loop {
            select! {
                recv(control) -> command => {
                    match command {
                        Ok(DispatcherCommand::Shutdown) => debug!("Dispatcher shutdown requested"),
                        Err(_) => warn!("Dispatcher control channel disconnected"),
                    }
                    break;
                }
                recv(events) -> event => match event {
                    Ok(event) => {
                        if self.handle(event) == Flow::Stop {
                            break;
                        }
                    }
                    Err(_) => {
                        if !self.flags.is_torn_down() {
                            warn!("Live event channel dropped without a close");
                            self.flags.streaming.store(false, Ordering::SeqCst);
                            self.state.set_connection_state(ConnectionState::Disconnected);
                        }
                        break;
                    }
                },
            }
        }

        let stopped = self.playback.interrupt();
        info!("Session dispatcher stopped ({} clip(s) cancelled)", stopped);
    }

    pub fn handle(&mut self, event: LiveEvent) -> Flow {
        if self.flags.is_torn_down() {
            debug!("Ignoring event after teardown");
            return Flow::Stop;
        }

        match event {
            LiveEvent::Opened => {
                self.on_opened();
                Flow::Continue
            }
            LiveEvent::Message(message) => {
                self.on_message(message);
                Flow::Continue
            }
            LiveEvent::Closed { reason } => {
                info!("Live session closed: {}", reason);
                self.flags.streaming.store(false, Ordering::SeqCst);
                self.state.set_connection_state(ConnectionState::Disconnected);
                Flow::Stop
            }
            LiveEvent::Error(message) => {
                error!("Live session error: {}", message);
                self.flags.streaming.store(false, Ordering::SeqCst);
                self.state.set_last_error(message);
                self.state.set_connection_state(ConnectionState::Error);
                Flow::Stop
            }
        }
    }

    fn on_opened(&mut self) {
        if self.state.connection_state() == ConnectionState::Connected {
            debug!("Duplicate session-open ignored");
            return;
        }

        self.state.set_connection_state(ConnectionState::Connected);
        if !self.greeting.is_empty() {
            self.outbound.send(ClientMessage::text(self.greeting.clone()));
        }
        self.flags.streaming.store(true, Ordering::SeqCst);
        info!("Session connected, streaming microphone");
    }

    fn on_message(&mut self, message: ServerMessage) {
        if let Some(content) = &message.server_content {
            self.collect_transcripts(content);
        }

        if let Some(call) = &message.tool_call {
            self.handle_tool_call(call);
        }

        if let Some(cancellation) = &message.tool_call_cancellation {
            debug!("Tool calls cancelled by server: {:?}", cancellation.ids);
        }

        if let Some(content) = &message.server_content {
            self.schedule_audio(content);

            if content.interrupted {
                // The cut-off agent utterance is never logged; user speech waits for turnComplete
                self.pending_agent.clear();
                let stopped = self.playback.interrupt();
                debug!("Interrupted, stopped {} clip(s)", stopped);
                self.state.push_log(LogEntry::agent(INTERRUPTED_MARKER));
            }

            if content.turn_complete {
                self.flush_transcripts();
            }
        }

        if let Some(go_away) = &message.go_away {
            warn!(
                "Server is ending the session (time left: {})",
                go_away.time_left.as_deref().unwrap_or("unknown")
            );
        }
    }

    fn collect_transcripts(&mut self, content: &ServerContent) {
        if let Some(text) = content.input_transcription.as_ref().and_then(|t| t.text.as_deref()) {
            self.pending_user.push_str(text);
        }
        if let Some(text) = content.output_transcription.as_ref().and_then(|t| t.text.as_deref()) {
            self.pending_agent.push_str(text);
        }
    }

    fn flush_transcripts(&mut self) {
        let user = std::mem::take(&mut self.pending_user);
        let agent = std::mem::take(&mut self.pending_agent);

        if !user.trim().is_empty() {
            self.state.push_log(LogEntry::user(user.trim()));
        }
        if !agent.trim().is_empty() {
            self.state.push_log(LogEntry::agent(agent.trim()));
        }
    }

    fn handle_tool_call(&mut self, call: &ToolCall) {
        if call.function_calls.is_empty() {
            return;
        }

        let mut responses = Vec::with_capacity(call.function_calls.len());

        for function in &call.function_calls {
            let result = match ToolCommand::from_call(function) {
                ToolCommand::Move { steps } => {
                    let steps = steps.unwrap_or_else(|| {
                        warn!("moveRobot called without numeric steps: {}", function.args);
                        0.0
                    });
                    let result = self
                        .state
                        .update_unit(|unit| robot::move_forward(unit, steps));
                    self.state
                        .push_log(LogEntry::agent(format!("⚡ Advancing: {}m", steps)));
                    result
                }
                ToolCommand::Turn { direction } => {
                    if !TurnDirection::is_recognized(&direction) {
                        warn!("Unrecognized turn direction {:?}, turning left", direction);
                    }
                    let result = self.state.update_unit(|unit| robot::turn(unit, &direction));
                    self.state
                        .push_log(LogEntry::agent(format!("⚡ Adjusting Bearing: {}", direction)));
                    result
                }
                ToolCommand::Unknown { name } => {
                    warn!("Unknown tool requested: {}", name);
                    DEFAULT_TOOL_RESULT
                }
            };

            debug!("Tool {} ({}) -> {}", function.name, function.id, result);
            responses.push(FunctionResponse::new(function, result));
        }

        self.outbound.send(ClientMessage::ToolResponse(ToolResponse {
            function_responses: responses,
        }));
    }

    fn schedule_audio(&mut self, content: &ServerContent) {
        for part in content.audio_payloads() {
            match decode_frame(&part.data, self.playback_rate) {
                Ok(clip) if !clip.is_empty() => {
                    self.playback.schedule(clip);
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping audio part: {}", e),
            }
        }
    }
}
