//! OBD-II decode error types.

use thiserror::Error;

use crate::pid::Pid;

/// Errors that can occur while decoding OBD-II response text.
#[derive(Debug, Error)]
pub enum ObdError {
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("unknown PID 0x{pid}")]
    UnknownPid { pid: Pid },

    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
}

/// Convenience alias for decode results.
pub type ObdResult<T> = Result<T, ObdError>;
