//! Audio hardware seams
//!
//! The session only talks to these traits. The cpal implementations live in
//! `input` and `output`; tests provide in-memory fakes.

use crate::messages::AudioData;
use crate::Result;
use crossbeam_channel::Sender;
use std::sync::Arc;

/// Identifier of a clip handed to an [`AudioSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(pub u64);

/// Clip player with its own clock, shared with the session dispatcher
pub trait AudioSink: Send + Sync {
    /// Seconds elapsed on the playback clock
    fn current_time(&self) -> f64;

    /// Schedule a clip to start at `start` seconds on the playback clock
    fn play_at(&self, clip: AudioData, start: f64) -> ClipId;

    /// Stop a clip immediately. Unknown or finished ids are ignored.
    fn stop(&self, id: ClipId);

    /// Whether the clip is still scheduled or playing
    fn is_active(&self, id: ClipId) -> bool;
}

/// Microphone capture handle
pub trait InputDevice {
    /// Native sample rate of the samples sent to the channel
    fn sample_rate(&self) -> u32;

    /// Start streaming mono sample blocks into `tx`
    fn start(&mut self, tx: Sender<Vec<f32>>) -> Result<()>;

    /// Stop capturing and release the device. Idempotent.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Speaker output handle
pub trait OutputDevice {
    fn sink(&self) -> Arc<dyn AudioSink>;

    /// Stop all clips and release the device. Idempotent.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Factory for the two audio contexts a session needs
pub trait AudioBackend: Send + Sync {
    /// Open the playback context; clips are delivered at `sample_rate`
    fn open_output(&self, sample_rate: u32) -> Result<Box<dyn OutputDevice>>;

    /// Acquire the microphone, requesting `sample_rate` mono
    fn open_input(&self, sample_rate: u32) -> Result<Box<dyn InputDevice>>;
}
