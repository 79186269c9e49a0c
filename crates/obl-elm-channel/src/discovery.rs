//! Supported-PID discovery via Mode-01 availability probes.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use obl_protocol::bitmap::decode_support_bitmap;
use obl_protocol::pid::Pid;
use obl_protocol::response;

use crate::channel::CommandChannel;
use crate::error::ElmResult;

/// Mandatory probe bases.
pub const PROBE_BASES: [u8; 4] = [0x00, 0x20, 0x40, 0x60];

/// Extended probe bases, scanned only when enabled in config.
pub const EXTENDED_PROBE_BASES: [u8; 2] = [0x80, 0xA0];

/// Matches the Mode-01 availability payload: SID echo, probe echo, and the
/// 8 hex digits of the 32-bit bitmap, anywhere in the cleaned response.
fn payload_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"41([0-9A-F]{2})([0-9A-F]{8})").unwrap())
}

/// Probe the adapter for its supported Mode-01 PIDs.
///
/// One probe failing to parse is recorded and skipped — discovery returns
/// whatever subset succeeded. An all-zero bitmap is a valid "nothing in this
/// block" answer. Transport errors abort the whole pass. Two runs against an
/// unchanged adapter yield the same set.
pub async fn discover(channel: &CommandChannel, extended: bool) -> ElmResult<BTreeSet<Pid>> {
    let mut probes: Vec<u8> = PROBE_BASES.to_vec();
    if extended {
        probes.extend_from_slice(&EXTENDED_PROBE_BASES);
    }

    let mut supported = BTreeSet::new();
    for base in probes {
        let command = format!("01{base:02X}");
        let raw = channel.execute(&command).await?;
        let cleaned = response::clean_payload(&raw);

        let Some(caps) = payload_regex().captures(&cleaned) else {
            warn!(probe = %command, response = %cleaned, "no availability payload in probe response");
            continue;
        };
        let echoed = u8::from_str_radix(&caps[1], 16).unwrap_or(0xFF);
        if echoed != base {
            warn!(probe = %command, %echoed, "probe echo mismatch, skipping");
            continue;
        }

        let bytes = match response::hex_to_bytes(&caps[2]) {
            Ok(b) => b,
            Err(e) => {
                warn!(probe = %command, error = %e, "bad bitmap hex, skipping");
                continue;
            }
        };
        let bitmap: [u8; 4] = bytes.try_into().expect("regex guarantees 4 bytes");

        let pids = decode_support_bitmap(base, &bitmap);
        debug!(probe = %command, count = pids.len(), "probe decoded");
        supported.extend(pids);
    }

    Ok(supported)
}
