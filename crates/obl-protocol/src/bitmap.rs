//! Supported-PID availability bitmap decoding.
//!
//! A probe response (`0100`, `0120`, ...) carries four payload bytes read as
//! a 32-bit bitmap, MSB first: bit at MSB-offset `k` of byte `j` marks PID
//! `base + j*8 + k + 1` as supported. The MSB of byte 0 therefore maps to
//! the first PID after the probe base (0xE0 at base 0x00 -> 01, 02, 03),
//! matching the SAE J1979 documented bit order.

use crate::pid::Pid;

/// Decode one probe's 4-byte bitmap into the PIDs it declares supported.
///
/// An all-zero bitmap is valid and yields an empty list.
pub fn decode_support_bitmap(base: u8, bytes: &[u8; 4]) -> Vec<Pid> {
    let mut pids = Vec::new();
    for (j, byte) in bytes.iter().enumerate() {
        for k in 0..8u16 {
            if byte & (0x80 >> k) != 0 {
                let code = base as u16 + j as u16 * 8 + k + 1;
                if code <= 0xFF {
                    pids.push(Pid::new(code as u8));
                }
            }
        }
    }
    pids
}
