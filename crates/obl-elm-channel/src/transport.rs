//! BLE transport abstraction.
//!
//! Models an already-connected ELM327-style BLE adapter as a write
//! characteristic plus a notify characteristic. Delivery is fragmented and
//! order-preserving within one subscription; the channel layer above does
//! the framing. Device discovery, pairing, and reconnection belong to a
//! connection-lifecycle collaborator, not this trait.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Stream of notification fragments, in delivery order.
pub type Notifications = mpsc::UnboundedReceiver<Vec<u8>>;

/// Errors at the transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("write failed: {0}")]
    Write(String),

    #[error("subscribe failed: {0}")]
    Subscribe(String),

    #[error("notification stream closed")]
    Closed,
}

/// Convenience alias for transport results.
pub type TransportResult<T> = Result<T, TransportError>;

/// An already-connected BLE write/notify characteristic pair.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write raw command bytes to the adapter.
    async fn write(&self, bytes: &[u8]) -> TransportResult<()>;

    /// Start notification delivery. Fragments arrive on the returned
    /// receiver in the order the adapter emitted them.
    async fn subscribe(&self) -> TransportResult<Notifications>;

    /// Stop notification delivery.
    async fn unsubscribe(&self) -> TransportResult<()>;
}
