use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid MIDI file: {0}")]
    Midi(#[from] midly::Error),

    #[error("Invalid settings file: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("Failed to write settings: {0}")]
    ConfigWrite(#[from] ron::Error),

    #[error("No audio output device")]
    NoOutputDevice,

    #[error("Unsupported output device configuration: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to open audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The audio thread has not drained the command queue fast enough.
    #[error("Voice command queue is full")]
    QueueFull,

    #[error("Unknown note name '{0}'")]
    UnknownNoteName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
