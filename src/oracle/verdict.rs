//! Parser for the oracle's free-text reply convention
//!
//! The oracle is a text generator, so the only structure we rely on is a
//! leading `BENAR:` marker. Everything else is conversational text.

/// Marker that opens an accepting reply. Case-sensitive, no leading whitespace.
pub const ACCEPT_MARKER: &str = "BENAR:";

/// What the state machine sees of an oracle reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The guess matches; `canonical_text` is the oracle's claim of which answer
    Accepted { canonical_text: String },
    /// The guess does not match; `reply` is sent to the chat verbatim
    Rejected { reply: String },
    /// The reply cannot be acted on (blank, or accepted with nothing after the marker)
    Malformed { raw: String },
}

/// Classify a raw oracle reply.
///
/// Only the first colon splits; the accepted payload keeps any later colons.
pub fn parse_verdict(raw: &str) -> Verdict {
    if let Some(payload) = raw.strip_prefix(ACCEPT_MARKER) {
        let canonical_text = payload.trim();
        if canonical_text.is_empty() {
            return Verdict::Malformed {
                raw: raw.to_string(),
            };
        }
        return Verdict::Accepted {
            canonical_text: canonical_text.to_string(),
        };
    }

    if raw.trim().is_empty() {
        return Verdict::Malformed {
            raw: raw.to_string(),
        };
    }

    Verdict::Rejected {
        reply: raw.to_string(),
    }
}
