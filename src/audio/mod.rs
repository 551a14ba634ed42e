pub mod buffer;
pub mod codec;
pub mod device;
#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod playback;
pub mod resampler;

pub use buffer::ChunkBuffer;
pub use codec::{compute_volume, decode_frame, encode_frame, PcmBlob};
pub use device::{AudioBackend, AudioSink, ClipId, InputDevice, OutputDevice};
#[cfg(feature = "audio-io")]
pub use input::CpalInput;
#[cfg(feature = "audio-io")]
pub use output::CpalOutput;
pub use playback::PlaybackScheduler;
pub use resampler::AudioResampler;

/// Audio backend over the host's default cpal devices
#[cfg(feature = "audio-io")]
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalBackend;

#[cfg(feature = "audio-io")]
impl AudioBackend for CpalBackend {
    fn open_output(&self, sample_rate: u32) -> crate::Result<Box<dyn OutputDevice>> {
        Ok(Box::new(CpalOutput::new(sample_rate)?))
    }

    fn open_input(&self, sample_rate: u32) -> crate::Result<Box<dyn InputDevice>> {
        Ok(Box::new(CpalInput::new(sample_rate)?))
    }
}
