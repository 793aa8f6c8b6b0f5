/*!
 * Error types for the page auto-translation engine.
 *
 * Lookup errors never leave the engine: they are logged and degraded to
 * "no information". Controller errors and contract violations halt the
 * reconciliation loop and surface through the context lifecycle.
 */

use thiserror::Error;

/// Errors reported by preference lookups and page language detectors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The backing service could not be reached
    #[error("Lookup unavailable: {0}")]
    Unavailable(String),

    /// The backing service answered with something unusable
    #[error("Invalid lookup response: {0}")]
    InvalidResponse(String),
}

/// Errors reported by DOM and selection translator controllers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The controller failed to perform the requested operation
    #[error("Controller operation failed: {0}")]
    Failed(String),
}

/// Errors raised by the orchestration context
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A controller disagrees with the tracked model; the model is no longer trustworthy
    #[error("Controller contract violation: {0}")]
    ContractViolation(String),

    /// A controller operation failed
    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    /// `start` was called on a context that is already running
    #[error("Orchestration context already started")]
    AlreadyStarted,

    /// An operation needs a started context
    #[error("Orchestration context not started")]
    NotStarted,

    /// The reconciliation loop has stopped after a fatal error
    #[error("Reconciliation loop halted")]
    Halted,

    /// A background task panicked or was cancelled
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the orchestration engine
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
