use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NpkError {
    /// Payload holds no digit; nothing was changed.
    #[error("invalid pump instruction: {0:?}")]
    InvalidCommand(String),
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("publish failed: {0}")]
    Publish(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing publisher")]
    MissingPublisher,
    #[error("expected exactly {expected} channels, got {got}")]
    ChannelCount { expected: usize, got: usize },
    #[error("duplicate channel id: {0}")]
    DuplicateChannel(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
