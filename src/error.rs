//! Error types for the cache library.
//!
//! The taxonomy is deliberately small. Absent values are not errors: `get`
//! returns `None` for missing and expired keys alike. Errors cover the
//! background eviction lifecycle and the protocol glue in the binaries.

use std::fmt;
use std::io;

/// The main error type for cache operations.
#[derive(Debug)]
pub enum CacheError {
    /// `start_eviction` was called while a background eviction task is
    /// already active. Call `stop_eviction` first.
    EvictionRunning,

    /// The command received was invalid or malformed.
    InvalidCommand(String),

    /// Failed to parse the input buffer or protocol message.
    ParseError(String),

    /// An I/O error occurred (network, thread spawn, etc.).
    IoError(io::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::EvictionRunning => {
                write!(f, "background eviction already running; stop it first")
            }
            CacheError::InvalidCommand(cmd) => write!(f, "invalid command: '{}'", cmd),
            CacheError::ParseError(msg) => write!(f, "parse error: {}", msg),
            CacheError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CacheError {
    fn from(err: io::Error) -> Self {
        CacheError::IoError(err)
    }
}

/// A specialized Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
