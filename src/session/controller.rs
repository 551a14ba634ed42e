//! Session lifecycle: acquire hardware and transport, run the workers,
//! release everything on disconnect.

use crate::audio::{AudioBackend, InputDevice, OutputDevice, PlaybackScheduler};
use crate::config::SumyConfig;
use crate::live::{LiveConnection, LiveTransport, SetupPayload};
use crate::session::capture::CaptureWorker;
use crate::session::dispatcher::{DispatcherCommand, EventDispatcher, SessionFlags};
use crate::session::state::{ConnectionState, SessionState};
use crate::Result;
use crossbeam_channel::{bounded, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Raw capture blocks buffered between the device callback and the worker
const CAPTURE_QUEUE: usize = 64;

struct ActiveSession {
    input: Box<dyn InputDevice>,
    output: Box<dyn OutputDevice>,
    connection: LiveConnection,
    control_tx: Sender<DispatcherCommand>,
    dispatcher: Option<JoinHandle<()>>,
    capture: Option<JoinHandle<()>>,
    flags: SessionFlags,
}

pub struct Session {
    config: SumyConfig,
    backend: Arc<dyn AudioBackend>,
    transport: Arc<dyn LiveTransport>,
    state: SessionState,
    active: Option<ActiveSession>,
}

impl Session {
    pub fn new(config: SumyConfig, backend: Arc<dyn AudioBackend>, transport: Arc<dyn LiveTransport>) -> Self {
        Self {
            config,
            backend,
            transport,
            state: SessionState::new(),
            active: None,
        }
    }

    /// Session over the default audio devices and the Gemini Live endpoint
    #[cfg(feature = "audio-io")]
    pub fn with_defaults(config: SumyConfig) -> Self {
        let transport = crate::live::GeminiLiveClient::new(config.endpoint.clone(), config.setup_timeout());
        Self::new(config, Arc::new(crate::audio::CpalBackend), Arc::new(transport))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SumyConfig {
        &self.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.connection_state()
    }

    /// True while devices or the transport are held
    pub fn holds_resources(&self) -> bool {
        self.active.is_some()
    }

    pub fn connect(&mut self) -> Result<()> {
        let current = self.state.connection_state();
        if current.is_active() {
            warn!("Connect ignored, session is already {}", current);
            return Ok(());
        }

        // Left over from a remote close that poll() has not seen yet
        self.release();

        self.state.reset_for_connect();
        self.state.set_connection_state(ConnectionState::Connecting);
        info!("Connecting live session");

        match self.start() {
            Ok(active) => {
                self.active = Some(active);
                Ok(())
            }
            Err(e) => {
                error!("Failed to start session: {}", e);
                self.state.set_last_error(e.user_message());
                self.state.set_connection_state(ConnectionState::Error);
                Err(e)
            }
        }
    }

    fn start(&self) -> Result<ActiveSession> {
        let mut output = self.backend.open_output(self.config.output_sample_rate)?;

        let mut input = match self.backend.open_input(self.config.input_sample_rate) {
            Ok(input) => input,
            Err(e) => {
                output.close();
                return Err(e);
            }
        };

        let connection = match self.open_transport() {
            Ok(connection) => connection,
            Err(e) => {
                input.close();
                output.close();
                return Err(e);
            }
        };

        let flags = SessionFlags::default();
        match self.spawn_workers(input.as_mut(), output.as_ref(), &connection, &flags) {
            Ok((capture, dispatcher, control_tx)) => Ok(ActiveSession {
                input,
                output,
                connection,
                control_tx,
                dispatcher: Some(dispatcher),
                capture: Some(capture),
                flags,
            }),
            Err(e) => {
                flags.tear_down();
                input.close();
                output.close();
                Err(e)
            }
        }
    }

    fn open_transport(&self) -> Result<LiveConnection> {
        let api_key = self.config.api_key()?;
        let setup = SetupPayload::new(
            &self.config.model,
            &self.config.voice_name,
            &self.config.system_instruction,
            self.config.enable_transcription,
        );
        self.transport.open(api_key, setup)
    }

    fn spawn_workers(
        &self,
        input: &mut dyn InputDevice,
        output: &dyn OutputDevice,
        connection: &LiveConnection,
        flags: &SessionFlags,
    ) -> Result<(JoinHandle<()>, JoinHandle<()>, Sender<DispatcherCommand>)> {
        let capture = CaptureWorker::new(
            input.sample_rate(),
            self.config.input_sample_rate,
            self.config.capture_chunk_size,
            connection.outbound.clone(),
            self.state.clone(),
            flags.clone(),
        )?;

        let (block_tx, block_rx) = bounded(CAPTURE_QUEUE);
        input.start(block_tx)?;
        let capture = capture.spawn(block_rx)?;

        let dispatcher = EventDispatcher::new(
            self.state.clone(),
            connection.outbound.clone(),
            PlaybackScheduler::new(output.sink()),
            flags.clone(),
            self.config.greeting_nudge.clone(),
            self.config.output_sample_rate,
        );
        let (control_tx, control_rx) = bounded(1);
        let events = connection.events.clone();

        let spawned = thread::Builder::new()
            .name("session-dispatcher".into())
            .spawn(move || dispatcher.run(events, control_rx));

        match spawned {
            Ok(handle) => Ok((capture, handle, control_tx)),
            Err(e) => {
                flags.tear_down();
                let _ = capture.join();
                Err(e.into())
            }
        }
    }

    /// Release everything and return to Disconnected. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        if self.release() {
            info!("Session disconnected");
        }
        self.state.set_volume(0.0);
        self.state.set_connection_state(ConnectionState::Disconnected);
    }

    /// Release hardware after the remote side ended the session.
    /// Call once per UI frame.
    pub fn poll(&mut self) {
        if self.active.is_none() {
            return;
        }

        let finished = matches!(
            self.state.connection_state(),
            ConnectionState::Disconnected | ConnectionState::Error
        );
        if finished {
            debug!("Remote session ended, releasing devices");
            self.release();
            self.state.set_volume(0.0);
        }
    }

    fn release(&mut self) -> bool {
        let Some(mut active) = self.active.take() else {
            return false;
        };

        active.flags.tear_down();
        let _ = active.control_tx.send(DispatcherCommand::Shutdown);

        active.input.close();

        // The dispatcher stops scheduled clips on its way out
        if let Some(handle) = active.dispatcher.take() {
            if handle.join().is_err() {
                warn!("Dispatcher thread panicked");
            }
        }

        active.output.close();

        if let Some(handle) = active.capture.take() {
            if handle.join().is_err() {
                warn!("Capture thread panicked");
            }
        }

        // Worker threads held the other outbound senders
        active.connection.close();
        true
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.disconnect();
    }
}
