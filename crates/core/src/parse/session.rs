use callgrind_toolchain_diagnostics::{Diagnostic, Span, codes};

use super::names::NameTable;
use super::record::{RecordEffect, dispatch_body_line};
use super::{ParseResult, ctx};
use crate::profile::Profile;

/// The phase of the top-level state machine a session is in.
///
/// Transitions only move forward for the lifetime of one session: once a
/// line has driven the session into [`Body`](ReadingStage::Body), no later
/// line is processed as header content, even if it looks like one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadingStage {
    /// Expecting the optional `version: 1` first line.
    FormatVersion,
    /// Expecting the optional `creator:` line.
    Creator,
    /// Consuming header lines (`cmd:`, comments, unknown `key: value`).
    Header,
    /// Terminal stage: every remaining line is a body record.
    Body,
}

/// One parse session for one Callgrind file.
///
/// The session is a strictly sequential state machine: feed complete lines
/// (without their terminators) in file order via
/// [`parse_line`](Self::parse_line), then call [`finish`](Self::finish) at
/// end of input to take the result. All state — the stage, the two
/// compression tables, the object context, and the profile under
/// construction — is private to the session; sessions share nothing.
#[derive(Debug)]
pub struct ParserSession {
    stage: ReadingStage,
    function_names: NameTable,
    object_names: NameTable,
    /// The currently active object/binary, carried across body lines until
    /// the next `ob=` record redefines it.
    object_context: String,
    profile: Option<Profile>,
    diags: Vec<Diagnostic>,
    /// 1-based number of the line currently being processed.
    line_no: usize,
    /// Byte offset of the next line's start, assuming one-byte terminators
    /// when lines are fed directly via `parse_line`.
    cursor: usize,
}

impl Default for ParserSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserSession {
    /// Create a session at the start of its input.
    pub fn new() -> Self {
        Self {
            stage: ReadingStage::FormatVersion,
            function_names: NameTable::new(),
            object_names: NameTable::new(),
            object_context: String::new(),
            profile: None,
            diags: Vec::new(),
            line_no: 0,
            cursor: 0,
        }
    }

    /// Process one line, excluding its terminator.
    ///
    /// The caller guarantees lines arrive in file order, none skipped, none
    /// split, and never concurrently. Returns whether the caller should keep
    /// feeding lines; today this is always `true`, the `false` case being
    /// reserved for future fatal conditions.
    pub fn parse_line(&mut self, line: &str) -> bool {
        let start = self.cursor;
        self.parse_line_at(line, start, 1)
    }

    /// Process one line whose bytes start at `start` in the overall input,
    /// followed by a terminator of `terminator_len` bytes. Lets whole-input
    /// callers keep diagnostic spans exact on CRLF input.
    pub(crate) fn parse_line_at(
        &mut self,
        line: &str,
        start: usize,
        terminator_len: usize,
    ) -> bool {
        self.line_no += 1;
        self.cursor = start + line.len() + terminator_len;
        let span = Span::new(start, start + line.len());
        match self.stage {
            ReadingStage::FormatVersion => self.process_format_version(line, span),
            ReadingStage::Creator => self.process_creator(line, span),
            ReadingStage::Header => self.process_header(line, span),
            ReadingStage::Body => self.process_body(line, span),
        }
    }

    /// The current stage. Monotonically non-decreasing across calls.
    pub fn stage(&self) -> ReadingStage {
        self.stage
    }

    /// The profile under construction, if any line has created one yet.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Diagnostics accumulated so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diags
    }

    /// End the input and take the result, transferring ownership of the
    /// profile to the caller.
    ///
    /// When no valid profile was produced (no `cmd:` header line was ever
    /// seen), a [`codes::MISSING_COMMAND`] error is appended.
    pub fn finish(mut self) -> ParseResult {
        if !self.profile.as_ref().is_some_and(Profile::is_valid) {
            self.diags.push(Diagnostic::error(
                codes::MISSING_COMMAND,
                "no cmd: header line; input does not describe a valid profile",
                None,
            ));
        }
        ParseResult {
            profile: self.profile,
            diagnostics: self.diags,
        }
    }

    // ── Stage handlers ──────────────────────────────────────────────────
    //
    // Each stage either consumes its line or advances the stage and hands
    // the same line to the next handler. Body has no fallthrough, so the
    // chain terminates for any line.

    fn process_format_version(&mut self, line: &str, span: Span) -> bool {
        self.stage = ReadingStage::Creator;
        if line == "version: 1" {
            return true;
        }
        self.process_creator(line, span)
    }

    fn process_creator(&mut self, line: &str, span: Span) -> bool {
        self.stage = ReadingStage::Header;
        // "creator:" alone (8 bytes) is not consumed; the generic header
        // rule picks it up instead.
        if line.len() > 8 && line.starts_with("creator:") {
            return true;
        }
        self.process_header(line, span)
    }

    fn process_header(&mut self, line: &str, span: Span) -> bool {
        if line.is_empty() {
            return true;
        }
        if line.starts_with('#') {
            return true;
        }
        // "cmd: " with an empty remainder falls to the generic `:` rule.
        if line.len() > 5 && line.starts_with("cmd: ") {
            let command = &line[5..];
            if self.profile.as_ref().is_some_and(Profile::is_valid) {
                self.diags.push(
                    Diagnostic::warn(
                        codes::DUPLICATE_COMMAND,
                        "duplicate cmd: header line; keeping the first command",
                        Some(span),
                    )
                    .with_context(ctx!(
                        "command" => command,
                        "line" => self.line_no.to_string(),
                    )),
                );
                return true;
            }
            self.profile
                .get_or_insert_with(Profile::new)
                .set_command(command);
            return true;
        }
        // Any other `key: value` header is accepted and ignored; header
        // kinds beyond cmd: are not modeled.
        if line.contains(':') {
            return true;
        }
        self.stage = ReadingStage::Body;
        self.process_body(line, span)
    }

    fn process_body(&mut self, line: &str, span: Span) -> bool {
        let resolved = dispatch_body_line(
            line,
            span,
            self.line_no,
            &mut self.function_names,
            &mut self.object_names,
            &mut self.diags,
        );
        let Some((effect, name)) = resolved else {
            return true;
        };
        match effect {
            RecordEffect::EnterFunction => {
                // Function records before any cmd: line still collect into a
                // profile; it stays invalid without a command.
                self.profile
                    .get_or_insert_with(Profile::new)
                    .add_function(name, self.object_context.clone());
            }
            RecordEffect::SetObjectContext => {
                self.object_context = name;
            }
            // Call-edge modeling is not implemented; the callee symbols are
            // resolved above so the compression tables stay consistent.
            RecordEffect::CalledFunction | RecordEffect::CalledObject => {}
        }
        true
    }
}
