//! Broadcast ECU header discovery.
//!
//! A single broadcast Mode-01 query draws one response per listening ECU, so
//! this path is inherently multi-response and cannot go through the one-shot
//! `CommandChannel` contract. It runs on its own subscription for a fixed
//! listen window instead, and must not run concurrently with an open
//! channel on the same transport.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ElmResult;
use crate::transport::Transport;

/// A 3-hex-digit ECU bus address (e.g., 7E8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct EcuHeader(u16);

impl EcuHeader {
    pub fn new(address: u16) -> Self {
        Self(address)
    }

    pub fn address(self) -> u16 {
        self.0
    }
}

impl fmt::Display for EcuHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03X}", self.0)
    }
}

impl From<EcuHeader> for String {
    fn from(header: EcuHeader) -> Self {
        header.to_string()
    }
}

/// A response line with headers on: 3-hex-digit bus address, an optional
/// length byte, then the `41 00` echo of the broadcast query. Requiring the
/// echo keeps headerless lines (stale pre-ATH1 traffic, `410C...` payloads)
/// from being misread as bus addresses.
fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9A-F]{3})\s*(?:[0-9A-F]{2}\s*)?41\s*00").unwrap())
}

/// Discovers which ECUs answer a broadcast query, by bus address.
#[derive(Debug, Default)]
pub struct EcuProbe {
    discovered: BTreeSet<EcuHeader>,
}

impl EcuProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers discovered so far, across all runs.
    pub fn discovered(&self) -> &BTreeSet<EcuHeader> {
        &self.discovered
    }

    /// Turn headers on, broadcast a Mode-01 probe, and collect responding
    /// ECU addresses for the length of the listen window. Headers are
    /// switched back off before the subscription is torn down so later
    /// channel traffic parses cleanly.
    pub async fn run(&mut self, transport: &dyn Transport, window: Duration) -> ElmResult<()> {
        let mut rx = transport.subscribe().await?;

        transport.write(b"ATH1\r").await?;
        transport.write(b"0100\r").await?;

        let deadline = Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match tokio::time::timeout(remaining, rx.recv()).await {
                Ok(Some(fragment)) => {
                    let text = String::from_utf8_lossy(&fragment).to_ascii_uppercase();
                    for line in text.split(['\r', '\n']) {
                        self.collect_header(line.trim());
                    }
                }
                Ok(None) => {
                    warn!("notification stream closed during ECU probe");
                    break;
                }
                Err(_) => break, // window elapsed
            }
        }

        // Restore the headers-off convention the channel relies on.
        if let Err(e) = transport.write(b"ATH0\r").await {
            warn!(error = %e, "failed to restore ATH0 after probe");
        }
        transport.unsubscribe().await?;
        Ok(())
    }

    fn collect_header(&mut self, line: &str) {
        let Some(caps) = header_regex().captures(line) else {
            return;
        };
        // Regex limits the capture to 3 hex digits.
        let address = u16::from_str_radix(&caps[1], 16).expect("3-digit hex capture");
        if self.discovered.insert(EcuHeader::new(address)) {
            debug!(header = %EcuHeader::new(address), "discovered ECU");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mock::MockTransport;

    #[tokio::test(start_paused = true)]
    async fn collects_headers_from_broadcast_responses() {
        let mock = Arc::new(MockTransport::new());
        mock.script_silence(); // ATH1 ack not needed
        mock.script_fragments(&[
            "7E8 06 41 00 BE 3F A8 13\r",
            "7E9 06 41 00 98 18 80 11\r",
            "7E8 06 41 00 BE 3F A8 13\r", // duplicate
            ">",
        ]);

        let mut probe = EcuProbe::new();
        probe
            .run(mock.as_ref(), Duration::from_millis(500))
            .await
            .unwrap();

        let headers: Vec<String> = probe.discovered().iter().map(|h| h.to_string()).collect();
        assert_eq!(headers, vec!["7E8", "7E9"]);
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_noise_lines() {
        let mock = Arc::new(MockTransport::new());
        mock.script_silence();
        mock.script_fragments(&["SEARCHING...\rOK\r7E8064100BE3FA813\r>"]);

        let mut probe = EcuProbe::new();
        probe
            .run(mock.as_ref(), Duration::from_millis(500))
            .await
            .unwrap();

        assert_eq!(probe.discovered().len(), 1);
        assert!(probe.discovered().contains(&EcuHeader::new(0x7E8)));
    }

    #[tokio::test(start_paused = true)]
    async fn headerless_lines_yield_no_phantom_addresses() {
        let mock = Arc::new(MockTransport::new());
        mock.script_silence();
        // Stale headerless traffic mixed in with one real headered response.
        mock.script_fragments(&["410C1AF8\r4100BE3FA813\r7E8064100BE3FA813\r>"]);

        let mut probe = EcuProbe::new();
        probe
            .run(mock.as_ref(), Duration::from_millis(200))
            .await
            .unwrap();

        let headers: Vec<String> = probe.discovered().iter().map(|h| h.to_string()).collect();
        assert_eq!(headers, vec!["7E8"]);
    }

    #[tokio::test(start_paused = true)]
    async fn restores_headers_off_and_unsubscribes() {
        let mock = Arc::new(MockTransport::new());

        let mut probe = EcuProbe::new();
        probe
            .run(mock.as_ref(), Duration::from_millis(200))
            .await
            .unwrap();

        assert_eq!(mock.writes(), vec!["ATH1\r", "0100\r", "ATH0\r"]);
        assert!(mock.is_unsubscribed());
    }

    #[tokio::test(start_paused = true)]
    async fn accumulates_across_runs() {
        let mock = Arc::new(MockTransport::new());
        mock.script_silence();
        mock.script_frame("7E8064100BE3FA813\r>");

        let mut probe = EcuProbe::new();
        probe
            .run(mock.as_ref(), Duration::from_millis(200))
            .await
            .unwrap();

        mock.script_silence();
        mock.script_frame("7E906410098188011\r>");
        probe
            .run(mock.as_ref(), Duration::from_millis(200))
            .await
            .unwrap();

        assert_eq!(probe.discovered().len(), 2);
    }

    #[test]
    fn header_renders_three_digits() {
        assert_eq!(EcuHeader::new(0x7E8).to_string(), "7E8");
        assert_eq!(EcuHeader::new(0x012).to_string(), "012");
    }
}
