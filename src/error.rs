use thiserror::Error;

/// Rejected round operations. These are caller contract violations, never game events.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum RoundError {
    #[error("switch index {0} is out of range")]
    SwitchOutOfRange(usize),

    #[error("cannot guess before the bulb has been revealed")]
    GuessBeforeReveal,

    #[error("round already completed")]
    AlreadyCompleted,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
