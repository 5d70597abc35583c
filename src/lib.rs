pub mod config;
pub mod dictation;
pub mod messages;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DeskchatError {
    #[error("Recognition capability error: {0}")]
    Recognition(String),

    #[error("Capture device error: {0}")]
    CaptureDevice(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IO(String),
}

impl From<std::io::Error> for DeskchatError {
    fn from(e: std::io::Error) -> Self {
        DeskchatError::IO(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeskchatError>;
