//! Pure OBD-II decode layer for ObdLink BLE.
//!
//! Everything in this crate is I/O-free text and byte decoding:
//! - `Pid` and the static Mode-01 descriptor table
//! - `interpret` for turning raw adapter responses into readings
//! - `bitmap` for supported-PID probe decoding
//! - `dtc` for Mode-03 trouble-code decoding
//! - `response` for adapter-text cleanup helpers
//!
//! The async channel layer lives in `obl-elm-channel`.

pub mod bitmap;
pub mod dtc;
pub mod error;
pub mod interpret;
pub mod pid;
pub mod response;

// Re-exports for convenience.
pub use dtc::{DtcCategory, DtcCode, decode_dtcs};
pub use error::{ObdError, ObdResult};
pub use interpret::{InterpretedReading, interpret};
pub use pid::{Pid, PidDescriptor, descriptor};
