use thiserror::Error;

/// Errors that can occur while searching an environment
#[derive(Error, Debug)]
pub enum BruteError {
    #[error("Action space is empty")]
    EmptyActionSpace,

    #[error("Invalid action {action} for action space of size {n}")]
    InvalidAction { action: usize, n: usize },

    #[error("Malformed action sequence: expected {expected} actions, got {actual}")]
    MalformedSequence { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Environment failure: {0}")]
    Environment(String),

    #[error("Recorder failure: {0}")]
    Recorder(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for Brute operations
pub type Result<T> = std::result::Result<T, BruteError>;
