//! ELM327-style command channel over a BLE write/notify transport.
//!
//! Turns a fragmented, notification-based byte stream into a serialized
//! request/response protocol:
//! - `Transport` trait for the BLE write/notify pair (mockable in tests)
//! - `ResponseFramer` for terminator-based frame accumulation
//! - `CommandChannel` enforcing the one-command-in-flight invariant
//! - adapter initialization, supported-PID discovery, and the high-level
//!   `ObdSession` facade
//! - `EcuProbe` for broadcast header discovery outside the one-shot contract

pub mod channel;
pub mod config;
pub mod discovery;
pub mod error;
pub mod framer;
pub mod init;
pub mod mock;
pub mod probe;
pub mod session;
pub mod transport;

// Re-exports for convenience.
pub use channel::CommandChannel;
pub use config::SessionConfig;
pub use error::{ElmError, ElmResult};
pub use framer::ResponseFramer;
pub use mock::MockTransport;
pub use probe::{EcuHeader, EcuProbe};
pub use session::ObdSession;
pub use transport::{Notifications, Transport, TransportError, TransportResult};
