//! File loading for the Callgrind toolchain.
//!
//! The parser core never performs I/O; this crate is the external line
//! source. It opens a byte source, splits it into ordered lines, feeds each
//! line to one [`ParserSession`], and delivers the outcome either through
//! callbacks on a background thread ([`FileLoader`]) or synchronously
//! ([`load_path`]).
//!
//! Cancellation is a loader concern: a [`CancelToken`] is consulted before
//! each read step and before invoking either callback, so a cancelled load
//! simply stops feeding lines and discards its session.

#![warn(missing_docs)]

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use callgrind_toolchain_core::{Diagnostic, ParseResult, ParserSession, Profile};
use thiserror::Error;

/// Errors surfaced by the loader. The core parser itself never raises these;
/// it reports problems as diagnostics inside [`ParseResult`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The byte source could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file being loaded.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The input parsed but produced no valid profile (no `cmd:` header).
    #[error("{path}: input does not contain a valid profile")]
    InvalidProfile {
        /// Path of the file being loaded.
        path: PathBuf,
        /// The diagnostics the parse session accumulated.
        diagnostics: Vec<Diagnostic>,
    },
}

/// Shared cancellation flag for an in-flight load.
///
/// Cloning yields a handle to the same flag. Once cancelled, a token never
/// resets.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Feed every line of `reader` to a fresh parse session, in order.
///
/// Line terminators (`\n` or `\r\n`) are stripped before each line reaches
/// the parser. Returns `Ok(None)` when `token` was cancelled before the
/// input was exhausted.
pub fn feed_reader<R: BufRead>(
    reader: &mut R,
    token: &CancelToken,
) -> io::Result<Option<ParseResult>> {
    let mut session = ParserSession::new();
    let mut buf = String::new();
    loop {
        if token.is_cancelled() {
            return Ok(None);
        }
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.strip_suffix('\n').unwrap_or(&buf);
        let line = line.strip_suffix('\r').unwrap_or(line);
        if !session.parse_line(line) {
            break;
        }
    }
    Ok(Some(session.finish()))
}

fn load_with_token(path: &Path, token: &CancelToken) -> Result<Option<Profile>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let result = feed_reader(&mut reader, token).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    let Some(result) = result else {
        return Ok(None);
    };
    match result.profile {
        Some(profile) if profile.is_valid() => Ok(Some(profile)),
        _ => Err(LoadError::InvalidProfile {
            path: path.to_owned(),
            diagnostics: result.diagnostics,
        }),
    }
}

/// Load a Callgrind file synchronously.
pub fn load_path(path: impl AsRef<Path>) -> Result<Profile, LoadError> {
    let token = CancelToken::new();
    load_with_token(path.as_ref(), &token)
        .map(|profile| profile.expect("load without cancellation always completes"))
}

/// An in-flight background load of one Callgrind file.
///
/// Exactly one of the two callbacks fires at end of input: `on_success` with
/// the completed profile, or `on_error` with an I/O or invalid-profile
/// error. After [`cancel`](Self::cancel), neither fires. Dropping the loader
/// detaches from the worker without cancelling it.
#[derive(Debug)]
pub struct FileLoader {
    token: CancelToken,
    handle: Option<JoinHandle<()>>,
}

impl FileLoader {
    /// Start reading `path` on a background thread.
    pub fn spawn(
        path: impl Into<PathBuf>,
        on_success: impl FnOnce(Profile) + Send + 'static,
        on_error: impl FnOnce(LoadError) + Send + 'static,
    ) -> Self {
        let path = path.into();
        let token = CancelToken::new();
        let worker_token = token.clone();
        let handle = thread::spawn(move || {
            let outcome = load_with_token(&path, &worker_token);
            if worker_token.is_cancelled() {
                return;
            }
            match outcome {
                Ok(Some(profile)) => on_success(profile),
                Ok(None) => {}
                Err(err) => on_error(err),
            }
        });
        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Detach from the in-flight read. Neither callback will be invoked
    /// after the token is observed.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Block until the worker finishes (after its callback, if any, ran).
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_token_stops_before_reading() {
        let token = CancelToken::new();
        token.cancel();
        let mut reader = io::Cursor::new("cmd: /bin/ls\nfn=main\n");
        let result = feed_reader(&mut reader, &token).unwrap();
        assert!(result.is_none(), "a cancelled load must yield no result");
        assert_eq!(
            reader.position(),
            0,
            "cancellation is checked before each read step"
        );
    }

    #[test]
    fn feed_reader_parses_full_input() {
        let token = CancelToken::new();
        let mut reader = io::Cursor::new("version: 1\ncmd: /bin/ls\nfn=(1) main\n");
        let result = feed_reader(&mut reader, &token).unwrap().unwrap();
        let profile = result.profile.unwrap();
        assert_eq!(profile.command(), "/bin/ls");
        assert_eq!(profile.functions()[0].name(), "main");
    }

    #[test]
    fn token_clones_share_state() {
        let a = CancelToken::new();
        let b = a.clone();
        b.cancel();
        assert!(a.is_cancelled());
    }
}
