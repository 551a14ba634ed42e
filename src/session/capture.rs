use crate::audio::codec::{compute_volume, encode_frame};
use crate::audio::{AudioResampler, ChunkBuffer};
use crate::live::{ClientMessage, OutboundSender};
use crate::session::dispatcher::SessionFlags;
use crate::session::state::SessionState;
use crate::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Chunks kept before the oldest samples are dropped
const BUFFERED_CHUNKS: usize = 8;

/// Turns raw microphone blocks into uploaded PCM frames
pub struct CaptureWorker {
    device_rate: u32,
    target_rate: u32,
    buffer: ChunkBuffer,
    resampler: Option<AudioResampler>,
    outbound: OutboundSender,
    state: SessionState,
    flags: SessionFlags,
    frames_sent: u64,
}

impl CaptureWorker {
    pub fn new(
        device_rate: u32,
        target_rate: u32,
        chunk_size: usize,
        outbound: OutboundSender,
        state: SessionState,
        flags: SessionFlags,
    ) -> Result<Self> {
        let resampler = if device_rate != target_rate {
            debug!("Capture resampling {} Hz -> {} Hz", device_rate, target_rate);
            Some(AudioResampler::new(device_rate, target_rate)?)
        } else {
            None
        };

        Ok(Self {
            device_rate,
            target_rate,
            buffer: ChunkBuffer::new(chunk_size * BUFFERED_CHUNKS, chunk_size),
            resampler,
            outbound,
            state,
            flags,
            frames_sent: 0,
        })
    }

    pub fn spawn(mut self, blocks: Receiver<Vec<f32>>) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name("capture-worker".into())
            .spawn(move || {
                info!("Capture worker started ({} Hz device)", self.device_rate);
                self.run(blocks);
                info!("Capture worker stopped after {} frame(s)", self.frames_sent);
            })?;
        Ok(handle)
    }

    fn run(&mut self, blocks: Receiver<Vec<f32>>) {
        loop {
            match blocks.recv_timeout(POLL_INTERVAL) {
                Ok(block) => {
                    if self.flags.is_torn_down() {
                        break;
                    }
                    self.process_block(&block);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.flags.is_torn_down() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Capture channel closed");
                    break;
                }
            }
        }
    }

    /// Buffer one device block and send every complete chunk
    pub fn process_block(&mut self, block: &[f32]) {
        let samples = match self.resampler.as_mut() {
            Some(resampler) => match resampler.push(block) {
                Ok(samples) => samples,
                Err(e) => {
                    warn!("Capture resampling failed: {}", e);
                    return;
                }
            },
            None => block.to_vec(),
        };

        let dropped = self.buffer.push(&samples);
        if dropped > 0 {
            debug!("Capture buffer overflow, dropped {} sample(s)", dropped);
        }

        while let Some(chunk) = self.buffer.pop_chunk() {
            // Audio before setup completes is discarded, not queued
            if !self.flags.is_streaming() || self.flags.is_torn_down() {
                continue;
            }

            self.state.set_volume(compute_volume(&chunk));
            if self.outbound.send(ClientMessage::audio(encode_frame(&chunk))) {
                self.frames_sent += 1;
            }
        }
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}
