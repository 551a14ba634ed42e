pub mod audio;
pub mod config;
pub mod live;
pub mod messages;
pub mod robot;
pub mod session;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SumyError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Microphone unavailable: {0}")]
    MicrophoneUnavailable(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Credentials missing: {0}")]
    CredentialsMissing(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for SumyError {
    fn from(e: std::io::Error) -> Self {
        SumyError::IOError(e.to_string())
    }
}

impl SumyError {
    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            SumyError::AudioDeviceError(_) => {
                "Audio device error. Please check your speakers.".to_string()
            }
            SumyError::MicrophoneUnavailable(_) => {
                "Microphone unavailable. Check permissions and try again.".to_string()
            }
            SumyError::AudioProcessingError(_) => {
                "Audio processing failed. The frame was skipped.".to_string()
            }
            SumyError::CredentialsMissing(_) => {
                "API key missing. Set GEMINI_API_KEY and reconnect.".to_string()
            }
            SumyError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            SumyError::ConnectionError(_) => {
                "Link to the command uplink failed. Reinitialize to retry.".to_string()
            }
            SumyError::ProtocolError(_) => {
                "Unexpected message from the uplink.".to_string()
            }
            SumyError::ChannelError(_) => {
                "Internal communication error. Reinitialize to retry.".to_string()
            }
            SumyError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SumyError>;
