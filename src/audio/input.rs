use crate::audio::device::InputDevice;
use crate::{Result, SumyError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default microphone via cpal
pub struct CpalInput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    is_recording: Arc<AtomicBool>,
    closed: bool,
}

impl CpalInput {
    /// Acquire the default input device, preferring a mono config at `requested_rate`
    pub fn new(requested_rate: u32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| SumyError::MicrophoneUnavailable("No input device available".into()))?;

        info!("Using input device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

        let config = Self::pick_config(&device, requested_rate)?;
        debug!(
            "Input config: {} Hz, {} channel(s)",
            config.sample_rate.0, config.channels
        );

        Ok(Self {
            device,
            config,
            stream: None,
            is_recording: Arc::new(AtomicBool::new(false)),
            closed: false,
        })
    }

    fn pick_config(device: &Device, requested_rate: u32) -> Result<StreamConfig> {
        let requested = SampleRate(requested_rate);

        if let Ok(mut configs) = device.supported_input_configs() {
            if let Some(range) = configs.find(|range| {
                range.channels() == 1
                    && range.sample_format() == cpal::SampleFormat::F32
                    && range.min_sample_rate() <= requested
                    && range.max_sample_rate() >= requested
            }) {
                return Ok(range.with_sample_rate(requested).into());
            }
        }

        // Fall back to the device default; the capture worker resamples
        device
            .default_input_config()
            .map(Into::into)
            .map_err(|e| SumyError::MicrophoneUnavailable(format!("Failed to get input config: {}", e)))
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }
}

impl InputDevice for CpalInput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if self.closed {
            return Err(SumyError::MicrophoneUnavailable("Input device already released".into()));
        }
        if self.is_recording() {
            warn!("Already capturing");
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let is_recording = Arc::clone(&self.is_recording);

        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !is_recording.load(Ordering::Relaxed) {
                        return;
                    }

                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = audio_tx.try_send(samples) {
                        debug!("Dropped capture block: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| SumyError::MicrophoneUnavailable(format!("Failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| SumyError::MicrophoneUnavailable(format!("Failed to start input stream: {}", e)))?;

        self.is_recording.store(true, Ordering::SeqCst);
        self.stream = Some(stream);

        info!("Started microphone capture");
        Ok(())
    }

    fn close(&mut self) {
        self.is_recording.store(false, Ordering::SeqCst);

        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!("Failed to pause input stream: {}", e);
            }
            drop(stream);
            info!("Released microphone");
        }
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for CpalInput {
    fn drop(&mut self) {
        self.close();
    }
}
