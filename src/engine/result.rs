//! Result aggregation and reporting.
//!
//! Collects control results and computes summaries.

use crate::{Control, ControlKind, ControlResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub passed: u32,
    pub failed: u32,
    /// Controls left unrun after a fail-fast stop
    pub skipped: u32,
    pub total: u32,
    pub total_duration_ms: u64,
}

impl ResultSummary {
    /// Process exit code for this summary: 0 all passed, 1 any failure
    pub fn exit_code(&self) -> u8 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// Report containing all control results of one run
#[derive(Debug, Clone, Serialize)]
pub struct ControlReport {
    pub timestamp: DateTime<Utc>,
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    pub controls: Vec<Control>,
    pub total_duration_ms: u64,
}

impl ControlReport {
    /// Create a new empty report
    pub fn new() -> Self {
        ControlReport {
            timestamp: Utc::now(),
            hostname: String::new(),
            os: None,
            controls: Vec::new(),
            total_duration_ms: 0,
        }
    }

    /// Calculate summary statistics
    pub fn summary(&self) -> ResultSummary {
        summarize(&self.controls)
    }

    /// Controls of one kind, in run order
    pub fn by_kind(&self, kind: ControlKind) -> impl Iterator<Item = &Control> {
        self.controls.iter().filter(move |c| c.kind == kind)
    }
}

impl Default for ControlReport {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(controls: &[Control]) -> ResultSummary {
    let mut summary = ResultSummary::default();

    for control in controls {
        summary.total += 1;

        match &control.result {
            Some(ControlResult::Pass { duration_ms, .. }) => {
                summary.passed += 1;
                summary.total_duration_ms += duration_ms;
            }
            Some(ControlResult::Fail { duration_ms, .. }) => {
                summary.failed += 1;
                summary.total_duration_ms += duration_ms;
            }
            None => {
                summary.skipped += 1;
            }
        }
    }

    summary
}

/// Result aggregator for collecting control results
#[derive(Default)]
pub struct ResultAggregator {
    controls: Vec<Control>,
    hostname: String,
    os: Option<String>,
    total_duration_ms: u64,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set report metadata
    pub fn set_metadata(&mut self, hostname: String, os: Option<String>, total_duration_ms: u64) {
        self.hostname = hostname;
        self.os = os;
        self.total_duration_ms = total_duration_ms;
    }

    /// Add a completed control
    pub fn add_result(&mut self, control: Control) {
        self.controls.push(control);
    }

    /// Check if there are any failures
    pub fn has_failures(&self) -> bool {
        self.controls
            .iter()
            .any(|c| matches!(&c.result, Some(ControlResult::Fail { .. })))
    }

    /// Get only failed controls
    pub fn failures(&self) -> Vec<&Control> {
        self.controls
            .iter()
            .filter(|c| matches!(&c.result, Some(ControlResult::Fail { .. })))
            .collect()
    }

    pub fn summary(&self) -> ResultSummary {
        summarize(&self.controls)
    }

    /// Create final report
    pub fn into_report(self) -> ControlReport {
        ControlReport {
            timestamp: Utc::now(),
            hostname: self.hostname,
            os: self.os,
            controls: self.controls,
            total_duration_ms: self.total_duration_ms,
        }
    }
}
