//! Adapter response-text cleanup helpers.
//!
//! ELM-style adapters interleave status noise ("SEARCHING...", echoed
//! prompts, line breaks) with payload hex. Cleaning happens here, after
//! framing — the framer delivers raw accumulated text untouched.

use crate::error::{ObdError, ObdResult};

/// End-of-response marker the adapter appends to every reply.
pub const TERMINATOR: char = '>';

/// Status token emitted while the adapter hunts for a protocol.
pub const SEARCHING_TOKEN: &str = "SEARCHING...";

/// Token reported when the vehicle has no value for a PID.
pub const NO_DATA_TOKEN: &str = "NODATA";

/// Whether the raw response reports "NO DATA" anywhere.
///
/// Matched with and without internal spaces since ATS0 may or may not have
/// taken effect when the response was produced.
pub fn is_no_data(raw: &str) -> bool {
    let squashed: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    squashed.contains(NO_DATA_TOKEN)
}

/// Reduce raw response text to uppercase hex suitable for payload parsing:
/// strips the terminator, all whitespace/line breaks, and status noise.
pub fn clean_payload(raw: &str) -> String {
    let mut text: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != TERMINATOR)
        .collect();
    text = text.to_ascii_uppercase();
    // "SEARCHING..." loses its dots only if the adapter strips them; remove
    // both spellings.
    text = text.replace(SEARCHING_TOKEN, "");
    text.replace("SEARCHING", "")
}

/// Decode a run of hex digit pairs into bytes.
pub fn hex_to_bytes(hex: &str) -> ObdResult<Vec<u8>> {
    // Garbled notification bytes surface as U+FFFD after lossy decoding, so
    // non-ASCII input is reachable here and must not be sliced blindly.
    if !hex.is_ascii() {
        return Err(ObdError::InvalidHex(format!(
            "non-ASCII hex payload: {hex:?}"
        )));
    }
    if hex.len() % 2 != 0 {
        return Err(ObdError::InvalidHex(format!(
            "odd-length hex payload: {hex:?}"
        )));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ObdError::InvalidHex(hex[i..i + 2].to_string()))
        })
        .collect()
}
