//! Serialized command execution against the adapter.
//!
//! The wire protocol has no request IDs: correlation is purely "one command
//! out, one frame back". Any overlap between two in-flight commands produces
//! unattributable cross-talk, so serialization here is a correctness
//! requirement, not a performance choice.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::{ElmError, ElmResult};
use crate::framer::ResponseFramer;
use crate::transport::{Notifications, Transport, TransportError};

/// Command terminator appended to every outgoing command.
const COMMAND_EOL: u8 = b'\r';

/// One serialized command/response conversation with a connected adapter.
///
/// Owns the single notification subscription for the adapter's lifetime —
/// established once in [`CommandChannel::new`], torn down once in
/// [`CommandChannel::shutdown`], never re-subscribed between commands.
/// Overlapping `execute` calls queue on an internal async mutex and run one
/// at a time; the in-flight frame accumulator is owned exclusively by the
/// invocation holding the lock.
pub struct CommandChannel {
    transport: Arc<dyn Transport>,
    /// Holding this lock is holding the command slot.
    notifications: Mutex<Notifications>,
    config: SessionConfig,
    /// Number of commands that hit the response deadline (observability).
    timeouts: AtomicU64,
}

impl CommandChannel {
    /// Open a channel over an already-connected transport, establishing the
    /// notification subscription.
    pub async fn new(transport: Arc<dyn Transport>, config: SessionConfig) -> ElmResult<Self> {
        let notifications = transport.subscribe().await?;
        Ok(Self {
            transport,
            notifications: Mutex::new(notifications),
            config,
            timeouts: AtomicU64::new(0),
        })
    }

    /// Execute a data-query command with the configured default timeout.
    pub async fn execute(&self, command: &str) -> ElmResult<String> {
        self.execute_with_timeout(command, self.config.command_timeout())
            .await
    }

    /// Execute one command and return the response frame text.
    ///
    /// Writes `command` plus a `\r`, then races frame completion against the
    /// deadline. On completion the frame is returned with the trailing `'>'`
    /// stripped. On deadline expiry whatever partial text accumulated is
    /// returned as `Ok` — timeout degrades to best-effort data, but the
    /// event is counted (see [`CommandChannel::timeouts`]) and logged.
    ///
    /// A transport write failure is fatal to this command only; the command
    /// slot is released for the next caller either way.
    pub async fn execute_with_timeout(
        &self,
        command: &str,
        timeout: Duration,
    ) -> ElmResult<String> {
        let mut rx = self.notifications.lock().await;

        // Fragments still in flight from a previous timed-out exchange
        // belong to no one; drop them before writing.
        while rx.try_recv().is_ok() {}

        let mut frame = ResponseFramer::new();
        let mut wire = command.as_bytes().to_vec();
        wire.push(COMMAND_EOL);
        self.transport.write(&wire).await?;

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, rx.recv()).await {
                Ok(Some(fragment)) => {
                    frame.push(&String::from_utf8_lossy(&fragment));
                    if frame.is_complete() {
                        let text = frame.into_text();
                        debug!(%command, response = %text, "command complete");
                        return Ok(text);
                    }
                }
                Ok(None) => return Err(ElmError::Transport(TransportError::Closed)),
                Err(_) => {
                    self.timeouts.fetch_add(1, Ordering::Relaxed);
                    let partial = frame.into_text();
                    warn!(
                        %command,
                        timeout_ms = timeout.as_millis() as u64,
                        partial = %partial,
                        "response timeout, returning partial frame"
                    );
                    return Ok(partial);
                }
            }
        }
    }

    /// Timeout for adapter-configuration commands.
    pub fn init_timeout(&self) -> Duration {
        self.config.init_timeout()
    }

    /// Session configuration this channel was opened with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// How many commands have hit the response deadline so far.
    pub fn timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    /// Drain any in-flight command, then tear down the subscription.
    ///
    /// Unsubscribing while a response is pending would silently lose it, so
    /// the command slot is acquired first.
    pub async fn shutdown(&self) -> ElmResult<()> {
        let _slot = self.notifications.lock().await;
        self.transport.unsubscribe().await?;
        Ok(())
    }
}
