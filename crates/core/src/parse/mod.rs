//! Callgrind format parsing.
//!
//! [`session`] holds the top-level stage machine ([`session::ParserSession`]),
//! [`record`] the body-record dispatcher, and [`names`] the per-category
//! identifier compression tables. [`parse_str`] drives a session over a
//! complete input string.

/// Identifier compression tables.
pub mod names;
pub(crate) mod record;
/// The parse session and its stage machine.
pub mod session;

use callgrind_toolchain_diagnostics::Diagnostic;

use crate::profile::Profile;
use session::ParserSession;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}
pub(crate) use ctx;

/// Result of parsing one Callgrind input.
#[derive(Debug, serde::Serialize)]
pub struct ParseResult {
    /// The parsed profile. `None` when the input never created one (no
    /// `cmd:` header and no function records); when present it may still be
    /// invalid — check [`Profile::is_valid`].
    pub profile: Option<Profile>,
    /// Diagnostics (errors, warnings, info) produced during parsing.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Whether a valid profile was produced and no error diagnostics were
    /// recorded.
    pub fn is_ok(&self) -> bool {
        self.profile.as_ref().is_some_and(Profile::is_valid)
            && !self
                .diagnostics
                .iter()
                .any(|d| matches!(d.severity, callgrind_toolchain_diagnostics::Severity::Error))
    }
}

/// Parse a complete Callgrind input string.
///
/// Splits the input into lines (handling both LF and CRLF terminators),
/// feeds them to a [`ParserSession`] in order, and finishes the session.
/// Diagnostic spans refer to byte offsets in `input`.
pub fn parse_str(input: &str) -> ParseResult {
    let mut session = ParserSession::new();
    let mut start = 0usize;
    for raw in input.split_inclusive('\n') {
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let more = session.parse_line_at(line, start, raw.len() - line.len());
        start += raw.len();
        if !more {
            break;
        }
    }
    session.finish()
}
