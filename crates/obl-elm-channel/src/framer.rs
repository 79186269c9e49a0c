//! Terminator-based response framing.

use obl_protocol::response::TERMINATOR;

/// Accumulates raw notification fragments into one protocol frame.
///
/// A frame is complete the instant the accumulated text ends with `'>'`.
/// No other framing is assumed: embedded whitespace, echoed headers, and
/// multi-line content stay in the payload and are cleaned downstream.
/// Fragments are kept exactly in arrival order, never reordered or deduped.
#[derive(Debug, Default)]
pub struct ResponseFramer {
    buf: String,
}

impl ResponseFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment in arrival order.
    pub fn push(&mut self, fragment: &str) {
        self.buf.push_str(fragment);
    }

    /// Whether the accumulated text ends with the terminator.
    pub fn is_complete(&self) -> bool {
        self.buf.trim_end().ends_with(TERMINATOR)
    }

    /// Discard everything accumulated so far.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Consume the framer, yielding the frame text with the trailing
    /// terminator stripped. For an incomplete frame this is whatever
    /// partial text accumulated before the caller gave up.
    pub fn into_text(self) -> String {
        self.buf
            .trim_end()
            .trim_end_matches(TERMINATOR)
            .trim_end()
            .to_string()
    }
}
