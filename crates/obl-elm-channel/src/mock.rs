//! Mock transport for testing without a BLE stack.
//!
//! Supports scripted notification bursts per write, write recording, write
//! failure injection, and unsolicited notification injection. All tests use
//! this instead of real hardware so the suite runs in CI on any platform.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::transport::{Notifications, Transport, TransportError, TransportResult};

/// Mock BLE transport with scripted responses.
///
/// Each `write` pops the next scripted burst and delivers its fragments as
/// notifications, preserving fragment order. A write with no scripted burst
/// delivers nothing, which is how tests exercise the timeout path.
pub struct MockTransport {
    /// Scripted notification bursts, one per write (FIFO order).
    scripted: Mutex<VecDeque<Vec<Vec<u8>>>>,
    /// All byte strings passed to `write` (for test assertions).
    writes: Mutex<Vec<Vec<u8>>>,
    /// Sender half of the active subscription, if any.
    notify: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    /// When set, `write` fails with a transport error.
    fail_writes: AtomicBool,
    /// Whether `unsubscribe` has been called.
    unsubscribed: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            writes: Mutex::new(Vec::new()),
            notify: Mutex::new(None),
            fail_writes: AtomicBool::new(false),
            unsubscribed: AtomicBool::new(false),
        }
    }

    /// Script a response delivered as a single notification fragment.
    pub fn script_frame(&self, text: &str) {
        self.script_fragments(&[text]);
    }

    /// Script a response delivered as multiple notification fragments.
    pub fn script_fragments(&self, fragments: &[&str]) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(fragments.iter().map(|f| f.as_bytes().to_vec()).collect());
    }

    /// Script a write that produces no notifications at all (timeout path).
    pub fn script_silence(&self) {
        self.scripted.lock().unwrap().push_back(Vec::new());
    }

    /// Inject an unsolicited notification, outside any write.
    pub fn push_notification(&self, text: &str) {
        if let Some(tx) = self.notify.lock().unwrap().as_ref() {
            let _ = tx.send(text.as_bytes().to_vec());
        }
    }

    /// Make subsequent writes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Get copies of all written byte strings, decoded as text.
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Get the last written command text, if any.
    pub fn last_write(&self) -> Option<String> {
        self.writes().last().cloned()
    }

    /// Whether `unsubscribe` was called.
    pub fn is_unsubscribed(&self) -> bool {
        self.unsubscribed.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&self, bytes: &[u8]) -> TransportResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Write("injected write failure".into()));
        }

        self.writes.lock().unwrap().push(bytes.to_vec());

        let burst = self.scripted.lock().unwrap().pop_front();
        if let Some(fragments) = burst {
            if let Some(tx) = self.notify.lock().unwrap().as_ref() {
                for fragment in fragments {
                    let _ = tx.send(fragment);
                }
            }
        }
        Ok(())
    }

    async fn subscribe(&self) -> TransportResult<Notifications> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.notify.lock().unwrap() = Some(tx);
        self.unsubscribed.store(false, Ordering::SeqCst);
        Ok(rx)
    }

    async fn unsubscribe(&self) -> TransportResult<()> {
        *self.notify.lock().unwrap() = None;
        self.unsubscribed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
