use crate::audio::device::{AudioSink, ClipId, OutputDevice};
use crate::audio::resampler::AudioResampler;
use crate::messages::AudioData;
use crate::{Result, SumyError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

struct MixClip {
    id: ClipId,
    start_frame: u64,
    samples: Vec<f32>,
}

impl MixClip {
    fn end_frame(&self) -> u64 {
        self.start_frame + self.samples.len() as u64
    }
}

/// Frame-clocked mixer fed by the output callback
struct Mixer {
    sample_rate: u32,
    clock_frames: u64,
    clips: Vec<MixClip>,
    next_id: u64,
    closed: bool,
}

impl Mixer {
    fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            clock_frames: 0,
            clips: Vec::new(),
            next_id: 0,
            closed: false,
        }
    }

    /// Fill one interleaved output buffer and advance the clock
    fn render(&mut self, data: &mut [f32], channels: usize) {
        data.fill(0.0);
        if self.closed || channels == 0 {
            return;
        }

        let frames = (data.len() / channels) as u64;
        let window_start = self.clock_frames;
        let window_end = window_start + frames;

        for clip in &self.clips {
            let from = clip.start_frame.max(window_start);
            let to = clip.end_frame().min(window_end);
            for frame in from..to {
                let sample = clip.samples[(frame - clip.start_frame) as usize];
                let offset = (frame - window_start) as usize * channels;
                for value in &mut data[offset..offset + channels] {
                    *value += sample;
                }
            }
        }

        for value in data.iter_mut() {
            *value = value.clamp(-1.0, 1.0);
        }

        self.clock_frames = window_end;
        self.clips.retain(|clip| clip.end_frame() > window_end);
    }
}

/// Shared handle to the mixer; this is what the session schedules against
pub struct MixerSink {
    mixer: Arc<Mutex<Mixer>>,
    resampler: Mutex<Option<AudioResampler>>,
}

impl MixerSink {
    fn device_rate(&self) -> u32 {
        self.mixer.lock().sample_rate
    }

    fn convert(&self, clip: AudioData) -> Vec<f32> {
        let device_rate = self.device_rate();
        if clip.sample_rate == device_rate {
            return clip.samples;
        }

        let mut guard = self.resampler.lock();
        let needs_new = guard
            .as_ref()
            .map(|r| r.input_rate() != clip.sample_rate)
            .unwrap_or(true);
        if needs_new {
            match AudioResampler::new(clip.sample_rate, device_rate) {
                Ok(resampler) => *guard = Some(resampler),
                Err(e) => {
                    warn!("Cannot resample clip: {}", e);
                    return Vec::new();
                }
            }
        }

        match guard.as_mut().map(|r| r.resample_clip(&clip.samples)) {
            Some(Ok(samples)) => samples,
            Some(Err(e)) => {
                warn!("Clip resampling failed: {}", e);
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}

impl AudioSink for MixerSink {
    fn current_time(&self) -> f64 {
        let mixer = self.mixer.lock();
        mixer.clock_frames as f64 / mixer.sample_rate as f64
    }

    fn play_at(&self, clip: AudioData, start: f64) -> ClipId {
        let samples = self.convert(clip);

        let mut mixer = self.mixer.lock();
        mixer.next_id += 1;
        let id = ClipId(mixer.next_id);
        if mixer.closed {
            return id;
        }

        let start_frame = (start.max(0.0) * mixer.sample_rate as f64).round() as u64;
        mixer.clips.push(MixClip {
            id,
            start_frame,
            samples,
        });
        id
    }

    fn stop(&self, id: ClipId) {
        self.mixer.lock().clips.retain(|clip| clip.id != id);
    }

    fn is_active(&self, id: ClipId) -> bool {
        self.mixer.lock().clips.iter().any(|clip| clip.id == id)
    }
}

/// Default speaker output via cpal
pub struct CpalOutput {
    stream: Option<Stream>,
    sink: Arc<MixerSink>,
    closed: bool,
}

impl CpalOutput {
    /// Open the default output device and start the mixer.
    ///
    /// `clip_rate` is the rate clips usually arrive at; the resampler for it
    /// is built up front so the first clip does not pay for it.
    pub fn new(clip_rate: u32) -> Result<Self> {
        let host = cpal::default_host();

        let device: Device = host
            .default_output_device()
            .ok_or_else(|| SumyError::AudioDeviceError("No output device available".into()))?;

        info!("Using output device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

        let config: StreamConfig = device
            .default_output_config()
            .map_err(|e| SumyError::AudioDeviceError(format!("Failed to get output config: {}", e)))?
            .into();

        let device_rate = config.sample_rate.0;
        let channels = config.channels as usize;
        let mixer = Arc::new(Mutex::new(Mixer::new(device_rate)));

        let resampler = if clip_rate != device_rate {
            Some(AudioResampler::new(clip_rate, device_rate)?)
        } else {
            None
        };

        let callback_mixer = Arc::clone(&mixer);
        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback_mixer.lock().render(data, channels);
                },
                err_fn,
                None,
            )
            .map_err(|e| SumyError::AudioDeviceError(format!("Failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| SumyError::AudioDeviceError(format!("Failed to start output stream: {}", e)))?;

        debug!("Playback mixer running at {} Hz, {} channel(s)", device_rate, channels);

        Ok(Self {
            stream: Some(stream),
            sink: Arc::new(MixerSink {
                mixer,
                resampler: Mutex::new(resampler),
            }),
            closed: false,
        })
    }
}

impl OutputDevice for CpalOutput {
    fn sink(&self) -> Arc<dyn AudioSink> {
        self.sink.clone()
    }

    fn close(&mut self) {
        {
            let mut mixer = self.sink.mixer.lock();
            mixer.clips.clear();
            mixer.closed = true;
        }

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Closed playback device");
        }
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.close();
    }
}
