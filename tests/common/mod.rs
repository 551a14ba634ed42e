//! In-memory audio backend and live transport shared by the integration tests

#![allow(dead_code)]

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use sumy_command::audio::{AudioBackend, AudioSink, ClipId, InputDevice, OutputDevice};
use sumy_command::config::SumyConfig;
use sumy_command::live::{ClientMessage, LiveConnection, LiveEvent, LiveTransport, OutboundSender, SetupPayload};
use sumy_command::messages::AudioData;
use sumy_command::session::Session;
use sumy_command::{Result, SumyError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

pub const WAIT: Duration = Duration::from_secs(3);

/// Poll `condition` until it holds or `WAIT` elapses
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[derive(Default)]
pub struct FakeSink {
    next_id: AtomicU64,
    pub active: Mutex<HashSet<ClipId>>,
    pub starts: Mutex<Vec<f64>>,
    pub stopped: Mutex<Vec<ClipId>>,
}

impl FakeSink {
    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }
}

impl AudioSink for FakeSink {
    fn current_time(&self) -> f64 {
        0.0
    }

    fn play_at(&self, _clip: AudioData, start: f64) -> ClipId {
        let id = ClipId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.active.lock().insert(id);
        self.starts.lock().push(start);
        id
    }

    fn stop(&self, id: ClipId) {
        self.active.lock().remove(&id);
        self.stopped.lock().push(id);
    }

    fn is_active(&self, id: ClipId) -> bool {
        self.active.lock().contains(&id)
    }
}

/// Counts devices currently held so tests can assert nothing leaks
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub deny_microphone: Arc<AtomicBool>,
    pub open_devices: Arc<AtomicIsize>,
    pub inputs_opened: Arc<AtomicUsize>,
    pub outputs_opened: Arc<AtomicUsize>,
    pub mic: Arc<Mutex<Option<Sender<Vec<f32>>>>>,
    pub sink: Arc<FakeSink>,
}

impl FakeBackend {
    pub fn denying_microphone() -> Self {
        let backend = Self::default();
        backend.deny_microphone.store(true, Ordering::SeqCst);
        backend
    }

    pub fn open_devices(&self) -> isize {
        self.open_devices.load(Ordering::SeqCst)
    }

    /// Feed samples as if the microphone produced them
    pub fn speak(&self, samples: Vec<f32>) -> bool {
        match self.mic.lock().as_ref() {
            Some(tx) => tx.send(samples).is_ok(),
            None => false,
        }
    }
}

struct FakeInput {
    rate: u32,
    closed: bool,
    open_devices: Arc<AtomicIsize>,
    mic: Arc<Mutex<Option<Sender<Vec<f32>>>>>,
}

impl InputDevice for FakeInput {
    fn sample_rate(&self) -> u32 {
        self.rate
    }

    fn start(&mut self, tx: Sender<Vec<f32>>) -> Result<()> {
        *self.mic.lock() = Some(tx);
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.mic.lock().take();
            self.open_devices.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

struct FakeOutput {
    sink: Arc<FakeSink>,
    closed: bool,
    open_devices: Arc<AtomicIsize>,
}

impl OutputDevice for FakeOutput {
    fn sink(&self) -> Arc<dyn AudioSink> {
        self.sink.clone()
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open_devices.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl AudioBackend for FakeBackend {
    fn open_output(&self, _sample_rate: u32) -> Result<Box<dyn OutputDevice>> {
        self.outputs_opened.fetch_add(1, Ordering::SeqCst);
        self.open_devices.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeOutput {
            sink: self.sink.clone(),
            closed: false,
            open_devices: self.open_devices.clone(),
        }))
    }

    fn open_input(&self, sample_rate: u32) -> Result<Box<dyn InputDevice>> {
        if self.deny_microphone.load(Ordering::SeqCst) {
            return Err(SumyError::MicrophoneUnavailable("permission denied".into()));
        }
        self.inputs_opened.fetch_add(1, Ordering::SeqCst);
        self.open_devices.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeInput {
            rate: sample_rate,
            closed: false,
            open_devices: self.open_devices.clone(),
            mic: self.mic.clone(),
        }))
    }
}

/// The test's end of an opened fake session
pub struct RemoteEnd {
    pub api_key: String,
    pub setup: SetupPayload,
    pub events: Sender<LiveEvent>,
    pub outbound: UnboundedReceiver<ClientMessage>,
}

impl RemoteEnd {
    pub fn send(&self, event: LiveEvent) {
        let _ = self.events.send(event);
    }

    pub fn send_json(&self, raw: &str) {
        let message = sumy_command::live::ServerMessage::parse(raw).expect("valid server json");
        self.send(LiveEvent::Message(message));
    }

    /// Everything the session has queued so far, as JSON
    pub fn drain_sent(&mut self) -> Vec<String> {
        let mut sent = Vec::new();
        while let Ok(message) = self.outbound.try_recv() {
            sent.push(message.to_json().expect("encodable"));
        }
        sent
    }
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    pub fail_with: Arc<Mutex<Option<SumyError>>>,
    pub opened: Arc<AtomicUsize>,
    pub remote: Arc<Mutex<Option<RemoteEnd>>>,
}

impl FakeTransport {
    pub fn failing(error: SumyError) -> Self {
        let transport = Self::default();
        *transport.fail_with.lock() = Some(error);
        transport
    }

    pub fn take_remote(&self) -> RemoteEnd {
        self.remote.lock().take().expect("transport was opened")
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl LiveTransport for FakeTransport {
    fn open(&self, api_key: &str, setup: SetupPayload) -> Result<LiveConnection> {
        if let Some(error) = self.fail_with.lock().clone() {
            return Err(error);
        }
        self.opened.fetch_add(1, Ordering::SeqCst);

        let (outbound_tx, outbound_rx) = unbounded_channel();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();

        *self.remote.lock() = Some(RemoteEnd {
            api_key: api_key.to_string(),
            setup,
            events: event_tx,
            outbound: outbound_rx,
        });

        Ok(LiveConnection::new(OutboundSender::new(outbound_tx), event_rx))
    }
}

pub fn test_config() -> SumyConfig {
    SumyConfig::default()
        .with_api_key("test-key")
        .with_endpoint("ws://127.0.0.1:9/live")
}

pub fn session_with(backend: &FakeBackend, transport: &FakeTransport, config: SumyConfig) -> Session {
    Session::new(config, Arc::new(backend.clone()), Arc::new(transport.clone()))
}
