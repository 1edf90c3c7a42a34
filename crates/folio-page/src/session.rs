#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] drives a [`Page`] against a [`RecordingHost`] and logs
//! every input event together with a checkpoint: an FNV-1a checksum of the
//! host commands that event produced, chained onto the previous checkpoint.
//! [`replay`] feeds the recorded events through a fresh page and reports the
//! first checkpoint whose commands differ.
//!
//! # Trace layout
//!
//! - **Header**: schema version, page configuration, page snapshot, year.
//! - **Input**: one page event.
//! - **Checkpoint**: step index, command count, checksum, checksum chain.
//!   Step 0 covers [`Page::start`]; step `n` covers the `n`th input.
//! - **Summary**: total checkpoints and final checksum chain.
//!
//! Traces serialize to JSON Lines, one record per line.

use folio_core::event::PageEventJson;
use folio_core::{HostCommand, PageEvent, RecordingHost};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, PageConfig};
use crate::page::Page;
use crate::snapshot::PageSnapshot;

pub const SCHEMA_VERSION: &str = "folio-trace-v1";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = fnv1a64_bytes(FNV_OFFSET_BASIS, &prev.to_le_bytes());
    fnv1a64_bytes(hash, &next.to_le_bytes())
}

/// Checksum of a command batch, order-sensitive.
#[must_use]
pub fn checksum_commands(commands: &[HostCommand]) -> u64 {
    commands.iter().fold(FNV_OFFSET_BASIS, |hash, command| {
        let bytes = serde_json::to_vec(command).unwrap_or_default();
        // Separator keeps [ab][c] distinct from [a][bc].
        fnv1a64_bytes(fnv1a64_bytes(hash, &bytes), b"\n")
    })
}

mod hex_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{value:016x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let s = String::deserialize(d)?;
        u64::from_str_radix(&s, 16).map_err(serde::de::Error::custom)
    }
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        schema_version: String,
        config: PageConfig,
        snapshot: PageSnapshot,
        year: i32,
    },
    Input { data: PageEventJson },
    Checkpoint {
        step: u64,
        commands: usize,
        #[serde(with = "hex_u64")]
        checksum: u64,
        #[serde(with = "hex_u64")]
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_steps: u64,
        #[serde(with = "hex_u64")]
        final_checksum_chain: u64,
    },
}

/// A complete recorded session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of checkpoints in the trace.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Checkpoint { .. }))
            .count() as u64
    }

    #[must_use]
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// Recorded input events, in order.
    pub fn events(&self) -> impl Iterator<Item = PageEvent> + '_ {
        self.records.iter().filter_map(|r| match r {
            TraceRecord::Input { data } => Some(PageEvent::from(data.clone())),
            _ => None,
        })
    }

    /// Validate structural invariants:
    /// - exactly one header, and it is the first record
    /// - exactly one summary, and it is the last record
    /// - checkpoint steps are contiguous from zero
    /// - summary totals and chain match the checkpoints
    pub fn validate(&self) -> Result<(), TraceValidationError> {
        if self.records.is_empty() {
            return Err(TraceValidationError::EmptyTrace);
        }

        let mut header_count: usize = 0;
        let mut summary: Option<(usize, u64, u64)> = None;
        let mut expected_step: u64 = 0;
        let mut last_chain: u64 = 0;

        for (idx, record) in self.records.iter().enumerate() {
            if let Some((summary_index, ..)) = summary {
                if matches!(record, TraceRecord::Summary { .. }) {
                    return Err(TraceValidationError::MultipleSummaries);
                }
                return Err(TraceValidationError::SummaryNotLast { summary_index });
            }
            match record {
                TraceRecord::Header { .. } => header_count += 1,
                TraceRecord::Summary {
                    total_steps,
                    final_checksum_chain,
                } => summary = Some((idx, *total_steps, *final_checksum_chain)),
                TraceRecord::Checkpoint {
                    step,
                    checksum_chain,
                    ..
                } => {
                    if *step != expected_step {
                        return Err(TraceValidationError::StepIndexMismatch {
                            expected: expected_step,
                            actual: *step,
                        });
                    }
                    expected_step += 1;
                    last_chain = *checksum_chain;
                }
                TraceRecord::Input { .. } => {}
            }
        }

        if header_count == 0 {
            return Err(TraceValidationError::MissingHeader);
        }
        if header_count > 1 {
            return Err(TraceValidationError::MultipleHeaders);
        }
        if !matches!(self.records.first(), Some(TraceRecord::Header { .. })) {
            return Err(TraceValidationError::HeaderNotFirst);
        }
        let Some((_, summary_steps, summary_chain)) = summary else {
            return Err(TraceValidationError::MissingSummary);
        };
        if summary_steps != expected_step {
            return Err(TraceValidationError::SummaryStepCountMismatch {
                expected: expected_step,
                actual: summary_steps,
            });
        }
        if summary_chain != last_chain {
            return Err(TraceValidationError::SummaryChecksumChainMismatch {
                expected: last_chain,
                actual: summary_chain,
            });
        }
        Ok(())
    }

    /// Serialize as JSON Lines.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse JSON Lines. Blank lines are skipped.
    pub fn from_jsonl(input: &str) -> Result<Self, TraceParseError> {
        let mut records = Vec::new();
        for (line_num, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: TraceRecord =
                serde_json::from_str(line).map_err(|e| TraceParseError {
                    line: line_num + 1,
                    message: e.to_string(),
                })?;
            if let TraceRecord::Header { schema_version, .. } = &record
                && schema_version != SCHEMA_VERSION
            {
                return Err(TraceParseError {
                    line: line_num + 1,
                    message: format!("unsupported schema version {schema_version:?}"),
                });
            }
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Parse and validate.
    pub fn from_jsonl_validated(input: &str) -> Result<Self, TraceLoadError> {
        let trace = Self::from_jsonl(input)?;
        trace.validate()?;
        Ok(trace)
    }
}

/// Records a page session for deterministic replay.
#[derive(Debug)]
pub struct SessionRecorder {
    page: Page,
    host: RecordingHost,
    records: Vec<TraceRecord>,
    checksum_chain: u64,
    step: u64,
}

impl SessionRecorder {
    /// Build the page, run its startup, and record the step-0 checkpoint.
    #[must_use]
    pub fn new(config: PageConfig, snapshot: PageSnapshot, year: i32) -> Self {
        let page = Page::new(config.clone(), &snapshot);
        let mut recorder = Self {
            page,
            host: RecordingHost::new(),
            records: vec![TraceRecord::Header {
                schema_version: SCHEMA_VERSION.to_string(),
                config,
                snapshot,
                year,
            }],
            checksum_chain: 0,
            step: 0,
        };
        recorder.page.start(year, &mut recorder.host);
        recorder.record_checkpoint();
        recorder
    }

    /// Record and handle one event. Returns whether the page handled it.
    pub fn push_event(&mut self, event: PageEvent) -> bool {
        self.records.push(TraceRecord::Input {
            data: PageEventJson::from(&event),
        });
        let handled = self.page.handle(event, &mut self.host);
        self.record_checkpoint();
        handled
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn host(&self) -> &RecordingHost {
        &self.host
    }

    /// Finish recording and return the completed trace.
    #[must_use]
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_steps: self.step,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }

    fn record_checkpoint(&mut self) {
        let commands = self.host.take_commands();
        let checksum = checksum_commands(&commands);
        let chain = fnv1a64_pair(self.checksum_chain, checksum);
        tracing::trace!(step = self.step, commands = commands.len(), "checkpoint");
        self.records.push(TraceRecord::Checkpoint {
            step: self.step,
            commands: commands.len(),
            checksum,
            checksum_chain: chain,
        });
        self.checksum_chain = chain;
        self.step += 1;
    }
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    pub total_steps: u64,
    pub final_checksum_chain: u64,
    /// First checkpoint whose checksum differed, if any.
    pub first_mismatch: Option<ReplayMismatch>,
    /// Every host command the replay produced, in order.
    pub commands: Vec<HostCommand>,
}

impl ReplayResult {
    /// Whether the replay reproduced every checkpoint.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub step: u64,
    pub expected: u64,
    pub actual: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    MissingHeader,
    InvalidTrace(TraceValidationError),
    /// The header's page configuration does not validate.
    Config(ConfigError),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::InvalidTrace(e) => write!(f, "invalid trace: {e}"),
            Self::Config(e) => write!(f, "trace config: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<ConfigError> for ReplayError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Replay a trace through a fresh page and compare checkpoints.
pub fn replay(trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    let (config, snapshot, year) = trace
        .records
        .first()
        .and_then(|r| match r {
            TraceRecord::Header {
                config,
                snapshot,
                year,
                ..
            } => Some((config, snapshot, *year)),
            _ => None,
        })
        .ok_or(ReplayError::MissingHeader)?;
    trace.validate().map_err(ReplayError::InvalidTrace)?;
    config.validate()?;

    let mut page = Page::new(config.clone(), snapshot);
    let mut host = RecordingHost::new();
    page.start(year, &mut host);

    let mut steps: u64 = 0;
    let mut checksum_chain: u64 = 0;
    let mut first_mismatch: Option<ReplayMismatch> = None;
    let mut commands = Vec::new();

    for record in &trace.records {
        match record {
            TraceRecord::Input { data } => {
                page.handle(PageEvent::from(data.clone()), &mut host);
            }
            TraceRecord::Checkpoint {
                step,
                checksum: expected,
                ..
            } => {
                let batch = host.take_commands();
                let actual = checksum_commands(&batch);
                checksum_chain = fnv1a64_pair(checksum_chain, actual);
                if actual != *expected && first_mismatch.is_none() {
                    tracing::debug!(step, expected, actual, "replay diverged");
                    first_mismatch = Some(ReplayMismatch {
                        step: *step,
                        expected: *expected,
                        actual,
                    });
                }
                commands.extend(batch);
                steps += 1;
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
        }
    }

    Ok(ReplayResult {
        total_steps: steps,
        final_checksum_chain: checksum_chain,
        first_mismatch,
        commands,
    })
}

/// Error parsing a JSONL trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceParseError {
    pub line: usize,
    pub message: String,
}

impl core::fmt::Display for TraceParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for TraceParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceValidationError {
    EmptyTrace,
    MissingHeader,
    HeaderNotFirst,
    MultipleHeaders,
    MissingSummary,
    MultipleSummaries,
    SummaryNotLast { summary_index: usize },
    StepIndexMismatch { expected: u64, actual: u64 },
    SummaryStepCountMismatch { expected: u64, actual: u64 },
    SummaryChecksumChainMismatch { expected: u64, actual: u64 },
}

impl core::fmt::Display for TraceValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyTrace => write!(f, "trace is empty"),
            Self::MissingHeader => write!(f, "trace is missing header"),
            Self::HeaderNotFirst => write!(f, "trace header is not the first record"),
            Self::MultipleHeaders => write!(f, "trace contains multiple headers"),
            Self::MissingSummary => write!(f, "trace is missing summary"),
            Self::MultipleSummaries => write!(f, "trace contains multiple summaries"),
            Self::SummaryNotLast { summary_index } => write!(
                f,
                "trace summary at index {summary_index} is not the final record"
            ),
            Self::StepIndexMismatch { expected, actual } => {
                write!(f, "step index mismatch: expected {expected}, got {actual}")
            }
            Self::SummaryStepCountMismatch { expected, actual } => write!(
                f,
                "summary step-count mismatch: expected {expected}, got {actual}"
            ),
            Self::SummaryChecksumChainMismatch { expected, actual } => write!(
                f,
                "summary checksum-chain mismatch: expected {expected:016x}, got {actual:016x}"
            ),
        }
    }
}

impl std::error::Error for TraceValidationError {}

/// Combined load error for parse + validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceLoadError {
    Parse(TraceParseError),
    Validation(TraceValidationError),
}

impl core::fmt::Display for TraceLoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Validation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TraceLoadError {}

impl From<TraceParseError> for TraceLoadError {
    fn from(value: TraceParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<TraceValidationError> for TraceLoadError {
    fn from(value: TraceValidationError) -> Self {
        Self::Validation(value)
    }
}
