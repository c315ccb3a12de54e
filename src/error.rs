//! Error Types
//!
//! One error per boundary: marshaller, stream setup, reader, writer and the
//! caller's filter. `TransformError` is what a transformation run reports.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransformError>;

/// The template could not be serialized
#[derive(Debug, Error)]
#[error("marshalling failed: {0}")]
pub struct MarshalError(pub String);

impl MarshalError {
    pub fn new(message: impl Into<String>) -> Self {
        MarshalError(message.into())
    }
}

/// The event source or sink could not be opened
#[derive(Debug, Error)]
pub enum StreamInitError {
    #[error("unsupported document encoding: {0}")]
    Encoding(String),

    #[error("could not open output: {0}")]
    Output(#[from] io::Error),
}

/// Malformed input encountered while reading events
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

/// The sink rejected an event
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("output error: {0}")]
    Io(#[from] io::Error),

    #[error("end tag </{found}> does not match <{expected}>")]
    Unbalanced { expected: String, found: String },

    #[error("end tag </{0}> has no open element")]
    NothingOpen(String),

    #[error("namespace prefix '{0}' is not bound")]
    UnboundPrefix(String),

    #[error("sink is closed")]
    Closed,
}

/// A failure raised by the caller's filter
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("spliced fragment is malformed: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl DecisionError {
    /// Abort the run with a message
    pub fn failed(message: impl Into<String>) -> Self {
        DecisionError::Failed(message.into())
    }

    /// Abort the run with a caller error
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DecisionError::Other(Box::new(err))
    }
}

/// Why a transformation run failed
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error(transparent)]
    StreamInit(#[from] StreamInitError),

    #[error("malformed document: {0}")]
    Parse(#[from] ParseError),

    #[error("write failed: {0}")]
    Write(#[from] WriteError),

    #[error("filter failed: {0}")]
    Decision(DecisionError),
}

impl From<DecisionError> for TransformError {
    fn from(err: DecisionError) -> Self {
        match err {
            // The sink rejected a write the filter made
            DecisionError::Write(err) => TransformError::Write(err),
            other => TransformError::Decision(other),
        }
    }
}
