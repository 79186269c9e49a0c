//! Mode-01 value interpretation: raw response text to a physical reading.

use serde::Serialize;

use crate::error::{ObdError, ObdResult};
use crate::pid::{Pid, descriptor};
use crate::response;

/// Response SID echoed for Mode-01 queries ("41").
const MODE_01_RESPONSE: &str = "41";

/// One decoded parameter reading.
///
/// `value: None` means the adapter explicitly reported NO DATA for this PID —
/// a valid state, distinct from a zero value.
#[derive(Debug, Clone, Serialize)]
pub struct InterpretedReading {
    pub pid: Pid,
    pub description: &'static str,
    pub unit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Interpret the raw frame text of a Mode-01 query for `pid`.
///
/// Errors:
/// - `UnknownPid` when the descriptor table has no entry — callers running a
///   batch drop the item with a warning and continue.
/// - `MalformedResponse` when the SID/PID echo is wrong or the payload is
///   shorter than the descriptor's byte count.
pub fn interpret(pid: Pid, raw: &str) -> ObdResult<InterpretedReading> {
    let desc = descriptor(pid).ok_or(ObdError::UnknownPid { pid })?;

    if response::is_no_data(raw) {
        return Ok(InterpretedReading {
            pid,
            description: desc.description,
            unit: desc.unit,
            value: None,
        });
    }

    let cleaned = response::clean_payload(raw);
    let expected_prefix = format!("{MODE_01_RESPONSE}{pid}");
    let payload = cleaned
        .strip_prefix(&expected_prefix)
        .ok_or_else(|| {
            ObdError::MalformedResponse(format!(
                "expected prefix {expected_prefix}, got {cleaned:?}"
            ))
        })?;

    let bytes = response::hex_to_bytes(payload)?;
    if bytes.len() < desc.byte_count {
        return Err(ObdError::MalformedResponse(format!(
            "PID {pid}: need {} data bytes, got {}",
            desc.byte_count,
            bytes.len()
        )));
    }

    // Extra trailing bytes are ignored; the formula sees exactly its arity.
    let value = (desc.decode)(&bytes[..desc.byte_count]);
    Ok(InterpretedReading {
        pid,
        description: desc.description,
        unit: desc.unit,
        value: Some(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_load_from_frame() {
        // PID 04, payload 0x7F -> 0x7F * 100 / 255 ≈ 49.8 %
        let reading = interpret(Pid::new(0x04), "41047F>").unwrap();
        assert_eq!(reading.description, "Calculated engine load");
        assert!((reading.value.unwrap() - 49.8).abs() < 0.1);
    }

    #[test]
    fn rpm_from_spaced_frame() {
        let reading = interpret(Pid::new(0x0C), "41 0C 1A F8 \r>").unwrap();
        // (0x1A * 256 + 0xF8) / 4 = 1726
        assert!((reading.value.unwrap() - 1726.0).abs() < 0.01);
    }

    #[test]
    fn no_data_wins_over_payload() {
        let reading = interpret(Pid::new(0x0C), "410C NO DATA>").unwrap();
        assert!(reading.value.is_none());
        assert_eq!(reading.unit, "rpm");
    }

    #[test]
    fn searching_noise_is_stripped() {
        let reading = interpret(Pid::new(0x0D), "SEARCHING...\r410D3C>").unwrap();
        assert!((reading.value.unwrap() - 60.0).abs() < 0.01);
    }

    #[test]
    fn unknown_pid_is_error() {
        let err = interpret(Pid::new(0xFF), "41FF00>").unwrap_err();
        assert!(matches!(err, ObdError::UnknownPid { .. }));
    }

    #[test]
    fn wrong_echo_is_malformed() {
        let err = interpret(Pid::new(0x0C), "410D3C>").unwrap_err();
        assert!(matches!(err, ObdError::MalformedResponse(_)));
    }

    #[test]
    fn short_payload_is_malformed() {
        // RPM needs two bytes, only one present
        let err = interpret(Pid::new(0x0C), "410C1A>").unwrap_err();
        assert!(matches!(err, ObdError::MalformedResponse(_)));
    }

    #[test]
    fn extra_bytes_are_ignored() {
        let reading = interpret(Pid::new(0x0D), "410D3CFFFF>").unwrap();
        assert!((reading.value.unwrap() - 60.0).abs() < 0.01);
    }

    #[test]
    fn garbled_payload_degrades_to_error() {
        // A notification with invalid UTF-8 reaches us as U+FFFD after lossy
        // decoding; it must come back as a decode error, never a panic.
        let err = interpret(Pid::new(0x0D), "410D1\u{FFFD}>").unwrap_err();
        assert!(matches!(err, ObdError::InvalidHex(_)));
    }

    #[test]
    fn reading_serializes_to_json() {
        let reading = interpret(Pid::new(0x0D), "410D3C>").unwrap();
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["pid"], "0D");
        assert_eq!(json["unit"], "km/h");
    }
}
