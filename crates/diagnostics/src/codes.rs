//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. Each constant has a matching entry in
//! [`explain`](crate::explain).

/// A compressed-id reference (`(<digits>)` with no trailing name) named an id
/// that was never defined in that symbol category's table.
pub const UNRESOLVED_NAME_REF: &str = "CGP1001";

/// A `fn=`/`cfn=`/`ob=`/`cob=` record carried neither an id reference nor a
/// non-empty name.
pub const MALFORMED_RECORD: &str = "CGP1002";

/// A second `cmd:` header line was seen; the first command is kept.
pub const DUPLICATE_COMMAND: &str = "CGP1003";

/// The input ended without any `cmd:` header line, so no valid profile
/// exists.
pub const MISSING_COMMAND: &str = "CGP1004";
