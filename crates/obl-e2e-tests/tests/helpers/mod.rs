//! Shared test harness for E2E integration tests.
//!
//! Scripts a complete, healthy adapter conversation on a `MockTransport`
//! so tests can drive real session flows end to end.

use std::sync::Arc;

use obl_elm_channel::init::INIT_COMMANDS;
use obl_elm_channel::{MockTransport, ObdSession, SessionConfig};

/// A mock adapter pre-scripted for the standard connect flow.
pub struct ScriptedAdapter {
    pub transport: Arc<MockTransport>,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self {
            transport: Arc::new(MockTransport::new()),
        }
    }

    /// Script acknowledgements for the full init sequence.
    pub fn script_init(&self) -> &Self {
        for _ in 0..INIT_COMMANDS.len() {
            self.transport.script_frame("OK\r\r>");
        }
        self
    }

    /// Script the four mandatory probes: block 0x00 supports PIDs
    /// 0C, 0D, 05 (bitmap 0x08180000); the remaining blocks are empty.
    pub fn script_discovery(&self) -> &Self {
        self.transport.script_frame("41 00 08 18 00 00\r\r>");
        self.transport.script_frame("41 20 00 00 00 00\r\r>");
        self.transport.script_frame("41 40 00 00 00 00\r\r>");
        self.transport.script_frame("41 60 00 00 00 00\r\r>");
        self
    }

    /// Open a session over the scripted transport with default config.
    pub async fn connect(&self) -> ObdSession {
        ObdSession::connect(
            self.transport.clone() as Arc<dyn obl_elm_channel::Transport>,
            SessionConfig::default(),
        )
        .await
        .expect("mock connect cannot fail")
    }
}
