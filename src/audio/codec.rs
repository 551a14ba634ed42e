//! PCM16 wire codec for the realtime voice session
//!
//! Outbound capture audio is 16-bit little-endian PCM, base64 encoded and
//! tagged with its sample rate. Inbound response audio uses the same layout.

use crate::messages::AudioData;
use crate::{Result, SumyError};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Capture sample rate expected by the remote service
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// Sample rate of streamed response audio
pub const PLAYBACK_SAMPLE_RATE: u32 = 24_000;

/// Mime tag attached to every outbound audio chunk
pub const CAPTURE_MIME_TYPE: &str = "audio/pcm;rate=16000";

const I16_SCALE: f32 = 32768.0;

/// Base64 audio payload with its mime tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmBlob {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

/// Quantize float samples to PCM16 and base64 encode them
pub fn encode_frame(samples: &[f32]) -> PcmBlob {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clamped = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
        // `as` saturates at the i16 bounds, so +1.0 maps to 32767
        let quantized = (clamped * I16_SCALE) as i16;
        bytes.extend_from_slice(&quantized.to_le_bytes());
    }

    PcmBlob {
        mime_type: CAPTURE_MIME_TYPE.to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
    }
}

/// Decode a base64 PCM16 payload into mono float samples at `sample_rate`
pub fn decode_frame(payload: &str, sample_rate: u32) -> Result<AudioData> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| SumyError::AudioProcessingError(format!("Invalid base64 audio: {}", e)))?;

    // A trailing odd byte cannot form a sample and is dropped
    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / I16_SCALE)
        .collect();

    Ok(AudioData::mono(samples, sample_rate))
}

/// Root-mean-square amplitude, clamped to [0, 1]
pub fn compute_volume(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|&s| s * s).sum();
    let rms = (sum_squares / samples.len() as f32).sqrt();

    if rms.is_nan() {
        0.0
    } else {
        rms.clamp(0.0, 1.0)
    }
}
