#![forbid(unsafe_code)]

//! Native driver for folio pages.
//!
//! Loads a page description (configuration plus markup snapshot), feeds it a
//! JSONL event stream, and reports the host commands the page emits. Every run
//! is recorded as a session trace and verified by replay before its commands
//! are reported, so the output is also a determinism check.

pub mod cli;

use std::io;
use std::path::PathBuf;

use folio_core::{HostCommand, PageEvent};
use folio_page::{
    ConfigError, PageConfig, PageSnapshot, ReplayError, ReplayResult, SessionRecorder,
    SessionTrace, TraceLoadError, replay,
};
use serde::{Deserialize, Serialize};

/// A page description file: `{"config": {...}, "snapshot": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFile {
    pub config: PageConfig,
    pub snapshot: PageSnapshot,
}

impl PageFile {
    pub fn from_json_str(s: &str) -> Result<Self, HarnessError> {
        let file: Self = serde_json::from_str(s).map_err(|e| HarnessError::Json {
            what: "page file",
            line: e.line(),
            message: e.to_string(),
        })?;
        file.config.validate()?;
        Ok(file)
    }
}

/// Parse a JSONL event stream. Blank lines and `#` comments are skipped.
pub fn parse_events(input: &str) -> Result<Vec<PageEvent>, HarnessError> {
    let mut events = Vec::new();
    for (line_num, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = PageEvent::from_json_str(line).map_err(|e| HarnessError::Json {
            what: "event stream",
            line: line_num + 1,
            message: e.to_string(),
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Record a session of `events` against the described page.
#[must_use]
pub fn record(
    page: PageFile,
    events: impl IntoIterator<Item = PageEvent>,
    year: i32,
) -> SessionTrace {
    let mut recorder = SessionRecorder::new(page.config, page.snapshot, year);
    let mut ignored = 0usize;
    for event in events {
        if !recorder.push_event(event) {
            ignored += 1;
        }
    }
    tracing::debug!(ignored, "events not handled by the page");
    recorder.finish()
}

/// Replay a trace, turning divergence into an error.
pub fn verify(trace: &SessionTrace) -> Result<ReplayResult, HarnessError> {
    let result = replay(trace)?;
    if let Some(mismatch) = &result.first_mismatch {
        return Err(HarnessError::Diverged {
            step: mismatch.step,
            expected: mismatch.expected,
            actual: mismatch.actual,
        });
    }
    Ok(result)
}

/// Host commands as JSON lines.
pub fn commands_to_jsonl(commands: &[HostCommand]) -> Result<String, HarnessError> {
    let mut out = String::new();
    for command in commands {
        let line = serde_json::to_string(command).map_err(|e| HarnessError::Json {
            what: "host command",
            line: 0,
            message: e.to_string(),
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

#[derive(Debug)]
pub enum HarnessError {
    Io { path: PathBuf, source: io::Error },
    Json {
        what: &'static str,
        line: usize,
        message: String,
    },
    Config(ConfigError),
    Trace(TraceLoadError),
    Replay(ReplayError),
    /// Replay produced different commands than the recording.
    Diverged { step: u64, expected: u64, actual: u64 },
}

impl core::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json {
                what,
                line,
                message,
            } => write!(f, "{what} line {line}: {message}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::Trace(e) => write!(f, "trace: {e}"),
            Self::Replay(e) => write!(f, "replay: {e}"),
            Self::Diverged {
                step,
                expected,
                actual,
            } => write!(
                f,
                "replay diverged at step {step}: expected {expected:016x}, got {actual:016x}"
            ),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Config(e) => Some(e),
            Self::Trace(e) => Some(e),
            Self::Replay(e) => Some(e),
            Self::Json { .. } | Self::Diverged { .. } => None,
        }
    }
}

impl From<ConfigError> for HarnessError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<TraceLoadError> for HarnessError {
    fn from(e: TraceLoadError) -> Self {
        Self::Trace(e)
    }
}

impl From<ReplayError> for HarnessError {
    fn from(e: ReplayError) -> Self {
        Self::Replay(e)
    }
}
