//! analyze.rs
//! Structural checks over captured events.
//!
//! Findings are values, never errors: a capture full of broken events still
//! analyzes to completion.

use std::fmt;
use std::io::Read;

use serde::Serialize;
use tracing::{debug, info};

use crate::stream::{Event, EventScanner};
use crate::types::{DaqError, SequenceId};
use crate::unpack::{split_checked, OriginId, SplitIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventIssue {
    /// Complete event shorter than header + trailer.
    EventTooShort { len: usize },
    /// Source ended before the trailer.
    Truncated { len: usize },
    SubBlockTooShort { origin: OriginId, start: usize, len: usize },
}

impl fmt::Display for EventIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventIssue::EventTooShort { len } => write!(f, "event too short ({len} words)"),
            EventIssue::Truncated { len } => write!(f, "event truncated after {len} words"),
            EventIssue::SubBlockTooShort { origin, start, len } => {
                write!(f, "DMB block too short ({origin}, at word {start}, {len} words)")
            }
        }
    }
}

/// Structural issues of one event.
pub fn analyze_event(event: &Event) -> Vec<EventIssue> {
    let mut issues = Vec::new();

    if !event.is_complete() {
        issues.push(EventIssue::Truncated { len: event.len() });
    } else if !event.has_min_len() {
        issues.push(EventIssue::EventTooShort { len: event.len() });
    }

    issues.extend(split_checked(event).issues.into_iter().map(|issue| match issue {
        SplitIssue::TooShort { origin, start, len } => {
            EventIssue::SubBlockTooShort { origin, start, len }
        }
    }));
    issues
}

/// One issue with its position in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    /// Event number across every file analyzed so far.
    pub global_index: u64,
    pub file_index: usize,
    /// Event number within its file.
    pub local_index: u64,
    pub sequence_id: Option<SequenceId>,
    pub issue: EventIssue,
}

impl fmt::Display for IssueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event {} (file {}, local {}",
            self.global_index, self.file_index, self.local_index
        )?;
        if let Some(id) = self.sequence_id {
            write!(f, ", L1A {id}")?;
        }
        write!(f, "): {}", self.issue)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub files: usize,
    pub events: u64,
    pub events_with_issues: u64,
    pub issues: Vec<IssueRecord>,
}

/// Accumulates an [`AnalysisReport`] over several captures.
#[derive(Debug, Default)]
pub struct Analyzer {
    report: AnalysisReport,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event. Returns the number of issues found.
    pub fn add_event(&mut self, file_index: usize, local_index: u64, event: &Event) -> usize {
        let global_index = self.report.events;
        self.report.events += 1;

        let issues = analyze_event(event);
        if !issues.is_empty() {
            self.report.events_with_issues += 1;
        }
        let count = issues.len();
        self.report.issues.extend(issues.into_iter().map(|issue| IssueRecord {
            global_index,
            file_index,
            local_index,
            sequence_id: event.sequence_id(),
            issue,
        }));
        count
    }

    /// Scan a whole capture, including a trailing truncated event.
    pub fn analyze_source<R: Read>(&mut self, source: R) -> Result<(), DaqError> {
        let file_index = self.report.files;
        self.report.files += 1;

        let mut scanner = EventScanner::new(source);
        let mut local_index = 0u64;
        while let Some(event) = scanner.next_event(None)? {
            self.add_event(file_index, local_index, &event);
            local_index += 1;
            if !event.is_complete() {
                break;
            }
        }

        debug!(file_index, events = local_index, "capture analyzed");
        Ok(())
    }

    pub fn report(&self) -> &AnalysisReport {
        &self.report
    }

    pub fn into_report(self) -> AnalysisReport {
        info!(
            files = self.report.files,
            events = self.report.events,
            with_issues = self.report.events_with_issues,
            "analysis finished"
        );
        self.report
    }
}
