//! Callgrind toolchain core library.
//!
//! Provides streaming, stateful parsing of Callgrind profiling output into an
//! in-memory profile model. The main entry points are [`parse_str`] for
//! whole-input parsing and [`ParserSession`] for feeding lines one at a time
//! as an external source delivers them.
//!
//! The core never performs I/O: file reading lives in the loader crate, and
//! this crate only ever sees complete, ordered lines.

#![warn(missing_docs)]

/// Profile serialization helpers.
pub mod dump;
/// Callgrind format parsing: session state machine, record dispatch, and
/// identifier compression tables.
pub mod parse;
/// The parse result model: profiles and function descriptors.
pub mod profile;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parser
pub use parse::names::NameTable;
pub use parse::session::{ParserSession, ReadingStage};
pub use parse::{ParseResult, parse_str};

// Model
pub use profile::{FunctionDescriptor, Profile};

// Diagnostics (re-exported from the diagnostics crate)
pub use callgrind_toolchain_diagnostics::{Diagnostic, Severity, Span, codes};

// Serialization helpers
pub use dump::to_pretty_json;
