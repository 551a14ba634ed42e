use crate::{Result, SumyError};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_FRAMES: usize = 1024;

/// Mono sample-rate converter
///
/// `push` converts a continuous stream (capture), carrying leftover frames
/// between calls. `resample_clip` converts one self-contained clip (playback).
pub struct AudioResampler {
    resampler: SincFixedIn<f32>,
    input_rate: u32,
    output_rate: u32,
    pending: Vec<f32>,
}

impl AudioResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(SumyError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        let params = SincInterpolationParameters {
            sinc_len: 128,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 128,
            window: WindowFunction::BlackmanHarris2,
        };

        let resampler = SincFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            2.0,
            params,
            CHUNK_FRAMES,
            1,
        )
        .map_err(|e| SumyError::AudioProcessingError(format!("Failed to create resampler: {}", e)))?;

        debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
            pending: Vec::with_capacity(CHUNK_FRAMES * 2),
        })
    }

    /// Feed streaming input; returns whatever output full chunks produced.
    pub fn push(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        self.pending.extend_from_slice(input);

        let chunk = self.resampler.input_frames_next();
        let mut output = Vec::new();

        while self.pending.len() >= chunk {
            let block: Vec<f32> = self.pending.drain(..chunk).collect();
            let processed = self
                .resampler
                .process(&[block], None)
                .map_err(|e| SumyError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&processed[0]);
        }

        Ok(output)
    }

    /// Convert a complete clip, compensating for the filter delay
    pub fn resample_clip(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        self.reset();

        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let expected = (input.len() as f64 * ratio).round() as usize;
        let delay = self.resampler.output_delay();
        let chunk = self.resampler.input_frames_next();

        let mut output = Vec::with_capacity(expected + delay + chunk);
        let mut offset = 0;

        // Keep feeding zero padding until the delayed tail has been flushed
        while output.len() < expected + delay {
            let mut block = vec![0.0f32; chunk];
            if offset < input.len() {
                let take = (input.len() - offset).min(chunk);
                block[..take].copy_from_slice(&input[offset..offset + take]);
                offset += take;
            }

            let processed = self
                .resampler
                .process(&[block], None)
                .map_err(|e| SumyError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&processed[0]);
        }

        output.drain(..delay.min(output.len()));
        output.truncate(expected);

        self.reset();
        Ok(output)
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Reset filter state and drop buffered streaming input
    pub fn reset(&mut self) {
        self.resampler.reset();
        self.pending.clear();
    }
}
