//! High-level adapter session: initialize, discover, query, interpret.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use obl_protocol::dtc::{DtcCode, decode_dtcs};
use obl_protocol::error::ObdError;
use obl_protocol::interpret::{InterpretedReading, interpret};
use obl_protocol::pid::{Pid, descriptor};

use crate::channel::CommandChannel;
use crate::config::SessionConfig;
use crate::discovery;
use crate::error::ElmResult;
use crate::init;
use crate::transport::Transport;

/// A connected OBD-II session over one adapter.
///
/// Everything this type returns is plain data for a presentation layer to
/// render; it holds no UI or persistence concerns. One session per device;
/// concurrent devices each get their own session with no shared state.
pub struct ObdSession {
    channel: CommandChannel,
    supported: BTreeSet<Pid>,
}

impl ObdSession {
    /// Open a session over an already-connected transport. Subscribes to
    /// notifications once, for the session's lifetime.
    pub async fn connect(transport: Arc<dyn Transport>, config: SessionConfig) -> ElmResult<Self> {
        let channel = CommandChannel::new(transport, config).await?;
        Ok(Self {
            channel,
            supported: BTreeSet::new(),
        })
    }

    /// Run the adapter configuration sequence.
    pub async fn initialize(&self) -> ElmResult<()> {
        init::initialize(&self.channel).await
    }

    /// Probe for supported PIDs and remember the result.
    pub async fn discover(&mut self) -> ElmResult<&BTreeSet<Pid>> {
        let extended = self.channel.config().extended_probes;
        self.supported = discovery::discover(&self.channel, extended).await?;
        info!(count = self.supported.len(), "PID discovery complete");
        Ok(&self.supported)
    }

    /// The supported-PID set from the last discovery pass.
    pub fn supported(&self) -> &BTreeSet<Pid> {
        &self.supported
    }

    /// Query one PID and interpret the response.
    ///
    /// `Ok(None)` means the item was dropped: no descriptor is known for the
    /// PID. A malformed response degrades to an absent-value reading, and
    /// `NO DATA` is a valid absent-value reading — both keep the PID visible
    /// to the caller. Transport failures propagate.
    pub async fn read_reading(&self, pid: Pid) -> ElmResult<Option<InterpretedReading>> {
        let command = format!("01{pid}");
        let raw = self.channel.execute(&command).await?;

        match interpret(pid, &raw) {
            Ok(reading) => Ok(Some(reading)),
            Err(ObdError::UnknownPid { pid }) => {
                warn!(%pid, "no descriptor for PID, dropping reading");
                Ok(None)
            }
            Err(e) => {
                warn!(%pid, error = %e, "uninterpretable response, reporting absent value");
                // UnknownPid was handled above, so the descriptor exists.
                let desc = descriptor(pid).expect("descriptor checked by interpret");
                Ok(Some(InterpretedReading {
                    pid,
                    description: desc.description,
                    unit: desc.unit,
                    value: None,
                }))
            }
        }
    }

    /// Query every discovered PID (excluding the probe bases themselves) and
    /// interpret the responses. Item-level decode failures never abort the
    /// batch; transport failures do.
    pub async fn read_all(&self) -> ElmResult<Vec<InterpretedReading>> {
        let mut readings = Vec::new();
        for &pid in &self.supported {
            if pid.is_probe_base() {
                continue;
            }
            if let Some(reading) = self.read_reading(pid).await? {
                readings.push(reading);
            }
        }
        Ok(readings)
    }

    /// Read stored Diagnostic Trouble Codes (Mode 03).
    pub async fn read_dtcs(&self) -> ElmResult<Vec<DtcCode>> {
        let raw = self.channel.execute("03").await?;
        Ok(decode_dtcs(&raw))
    }

    /// Underlying command channel, for direct command access.
    pub fn channel(&self) -> &CommandChannel {
        &self.channel
    }

    /// Drain any in-flight command and tear down the subscription.
    pub async fn shutdown(&self) -> ElmResult<()> {
        self.channel.shutdown().await
    }
}
