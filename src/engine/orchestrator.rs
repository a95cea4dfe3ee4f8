//! Control execution orchestrator.
//!
//! Manages control registration, selection and execution.
//!
//! # Graceful Degradation
//!
//! - Control panics: caught via std::panic::catch_unwind, converted to Fail
//! - Control timeout: Fail result with timeout message
//! - Host query errors: Fail result carrying the error text
//! - Invalid control ID: silently skipped in run_specific/run_excluding
//! - Empty control list: empty report (not an error)
//! - Fail-fast: selected controls after the first failure are reported
//!   without a result
//!
//! Controls run sequentially in registration order. Every selected control
//! completes regardless of individual failures unless fail_fast is enabled.

use crate::engine::result::{ControlReport, ResultAggregator};
use crate::platform::{linux, Host};
use crate::{AssertionOutcome, Control, ControlKind, ControlResult, HostcheckError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub fail_fast: bool,
    pub timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            fail_fast: false,
            timeout_ms: 30000,
        }
    }
}

/// Evaluates a control's assertions against a host
pub type ControlFn =
    Box<dyn Fn(&dyn Host) -> Result<Vec<AssertionOutcome>, HostcheckError> + Send + Sync>;

/// Box a closure as a [`ControlFn`]
pub fn control_fn<F>(f: F) -> ControlFn
where
    F: Fn(&dyn Host) -> Result<Vec<AssertionOutcome>, HostcheckError> + Send + Sync + 'static,
{
    Box::new(f)
}

/// A registered control with its execution function
pub struct RegisteredControl {
    pub id: String,
    pub title: String,
    pub kind: ControlKind,
    pub target: String,
    pub check_fn: ControlFn,
}

/// Control orchestrator
pub struct ControlOrchestrator {
    config: OrchestratorConfig,
    host: Arc<dyn Host>,
    controls: Vec<RegisteredControl>,
}

impl ControlOrchestrator {
    pub fn new(config: OrchestratorConfig, host: Arc<dyn Host>) -> Self {
        ControlOrchestrator {
            config,
            host,
            controls: Vec::new(),
        }
    }

    /// Register controls for execution
    pub fn register_controls(&mut self, controls: Vec<RegisteredControl>) {
        self.controls.extend(controls);
    }

    /// Register a single control
    pub fn register_control(&mut self, control: RegisteredControl) {
        self.controls.push(control);
    }

    /// IDs of all registered controls, in registration order
    pub fn ids(&self) -> Vec<&str> {
        self.controls.iter().map(|c| c.id.as_str()).collect()
    }

    /// Run all registered controls
    pub fn run_all(&self) -> ControlReport {
        self.run_selected(|_| true)
    }

    /// Run specific controls by ID
    pub fn run_specific(&self, control_ids: &[String]) -> ControlReport {
        self.run_selected(|c| control_ids.contains(&c.id))
    }

    /// Run all controls except specified IDs
    pub fn run_excluding(&self, skip_ids: &[String]) -> ControlReport {
        self.run_selected(|c| !skip_ids.contains(&c.id))
    }

    fn run_selected<F>(&self, selected: F) -> ControlReport
    where
        F: Fn(&RegisteredControl) -> bool,
    {
        let start = Instant::now();
        let mut aggregator = ResultAggregator::new();
        let mut stopped = false;

        for registered in self.controls.iter().filter(|c| selected(*c)) {
            if stopped {
                aggregator.add_result(not_executed(registered));
                continue;
            }

            let control = self.execute_control(registered);
            let failed = matches!(control.result, Some(ControlResult::Fail { .. }));
            aggregator.add_result(control);

            if failed && self.config.fail_fast {
                info!(control = %registered.id, "fail-fast: stopping after first failure");
                stopped = true;
            }
        }

        let total_duration_ms = start.elapsed().as_millis() as u64;
        let hostname = linux::get_hostname().unwrap_or_else(|_| "unknown".to_string());
        aggregator.set_metadata(hostname, self.host.os_description(), total_duration_ms);
        aggregator.into_report()
    }

    /// Execute a single control with panic and timeout handling
    fn execute_control(&self, registered: &RegisteredControl) -> Control {
        let start = Instant::now();
        let host = self.host.as_ref();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            (registered.check_fn)(host)
        }));
        let elapsed = start.elapsed().as_millis() as u64;

        let (assertions, result) = match outcome {
            Ok(Ok(assertions)) => {
                if elapsed > self.config.timeout_ms {
                    let result = ControlResult::Fail {
                        message: format!("Control timed out after {}ms", elapsed),
                        details: format!(
                            "Control exceeded timeout of {}ms",
                            self.config.timeout_ms
                        ),
                        duration_ms: elapsed,
                    };
                    (assertions, result)
                } else {
                    let result = ControlResult::from_assertions(&assertions, elapsed);
                    (assertions, result)
                }
            }
            Ok(Err(e)) => {
                let result = ControlResult::Fail {
                    message: format!("Control could not be evaluated for '{}'", registered.target),
                    details: e.to_string(),
                    duration_ms: elapsed,
                };
                (Vec::new(), result)
            }
            Err(_) => {
                let result = ControlResult::Fail {
                    message: "Control panicked during execution".to_string(),
                    details: "An unexpected error occurred".to_string(),
                    duration_ms: elapsed,
                };
                (Vec::new(), result)
            }
        };

        match &result {
            ControlResult::Pass { .. } => {
                info!(control = %registered.id, duration_ms = elapsed, "control passed")
            }
            ControlResult::Fail { message, .. } => {
                warn!(control = %registered.id, duration_ms = elapsed, %message, "control failed")
            }
        }

        Control {
            id: registered.id.clone(),
            title: registered.title.clone(),
            kind: registered.kind,
            target: registered.target.clone(),
            assertions,
            result: Some(result),
        }
    }
}

/// Report entry for a selected control left unrun by fail-fast
fn not_executed(registered: &RegisteredControl) -> Control {
    Control {
        id: registered.id.clone(),
        title: registered.title.clone(),
        kind: registered.kind,
        target: registered.target.clone(),
        assertions: Vec::new(),
        result: None,
    }
}
