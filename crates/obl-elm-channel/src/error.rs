//! Channel-layer error types.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur while running commands against the adapter.
#[derive(Debug, Error)]
pub enum ElmError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("adapter initialization failed at {command}: {source}")]
    Init {
        command: &'static str,
        #[source]
        source: Box<ElmError>,
    },
}

/// Convenience alias for channel results.
pub type ElmResult<T> = Result<T, ElmError>;
