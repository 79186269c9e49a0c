//! Mode-03 Diagnostic Trouble Code decoding.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::response;

/// Response SID for Mode-03 queries ("43").
const MODE_03_RESPONSE: &str = "43";

/// One decoded Diagnostic Trouble Code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtcCode {
    /// Standard DTC string (e.g., "P0134").
    pub code: String,
    /// Category derived from the first character.
    pub category: DtcCategory,
}

/// DTC category based on the system letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtcCategory {
    /// P — Powertrain (engine, transmission).
    Powertrain,
    /// C — Chassis (ABS, steering).
    Chassis,
    /// B — Body (airbags, AC, lighting).
    Body,
    /// U — Network/Communication.
    Network,
}

impl DtcCategory {
    fn letter(self) -> char {
        match self {
            DtcCategory::Powertrain => 'P',
            DtcCategory::Chassis => 'C',
            DtcCategory::Body => 'B',
            DtcCategory::Network => 'U',
        }
    }
}

/// Decode a raw Mode-03 response into the DTCs it reports.
///
/// The cleaned response must begin with the Mode-03 SID echo (`43`); anything
/// else is rejected wholesale with a warning and an empty result. After the
/// SID, hex is consumed in 4-digit groups: the first digit selects the system
/// letter and the leading numeric digit, the remaining three digits complete
/// the code. Trailing partial groups and zero padding are discarded.
pub fn decode_dtcs(raw: &str) -> Vec<DtcCode> {
    let cleaned = response::clean_payload(raw);
    let Some(groups) = cleaned.strip_prefix(MODE_03_RESPONSE) else {
        warn!(response = %cleaned, "unexpected Mode-03 response, expected 43 prefix");
        return Vec::new();
    };

    let mut dtcs = Vec::new();
    let chars: Vec<char> = groups.chars().collect();
    for group in chars.chunks_exact(4) {
        let group: String = group.iter().collect();
        if group == "0000" {
            continue; // padding
        }
        match decode_group(&group) {
            Some(dtc) => dtcs.push(dtc),
            None => warn!(%group, "skipping undecodable DTC group"),
        }
    }
    dtcs
}

/// Decode one 4-hex-digit DTC group.
///
/// First digit: `0,1 -> P`, `2,3 -> C`, `4,5 -> B`, `6,7 -> U`, with the low
/// bit carried as the first numeric digit ("0134" -> P0134, "1134" -> P1134).
fn decode_group(group: &str) -> Option<DtcCode> {
    let mut chars = group.chars();
    let selector = chars.next()?.to_digit(16)?;
    let rest: String = chars.collect();
    if rest.len() != 3 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let category = match selector / 2 {
        0 => DtcCategory::Powertrain,
        1 => DtcCategory::Chassis,
        2 => DtcCategory::Body,
        3 => DtcCategory::Network,
        _ => return None, // selector 8-F has no defined system letter
    };

    Some(DtcCode {
        code: format!("{}{}{rest}", category.letter(), selector % 2),
        category,
    })
}
