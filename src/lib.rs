//! hostcheck library
//!
//! Host compliance controls for the nftables firewall stack.
//!
//! Two controls are provided out of the box:
//! - `nftables.package.install`: the `nftables` package is installed
//! - `nftables.service.running`: the firewall service is installed, enabled and running
//!
//! Controls are declared in a TOML profile (see [`config::Profile`]) and evaluated
//! against a [`platform::Host`], which answers package and service queries using
//! the host's own package and service managers.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hostcheck::config::Profile;
//! use hostcheck::platform::LocalHost;
//! use hostcheck::run_controls;
//!
//! let profile = Profile::default();
//! let host = Arc::new(LocalHost::detect().expect("unsupported host"));
//! let report = run_controls(&profile, host).expect("invalid profile");
//! println!("Controls passed: {}", report.summary().passed);
//! ```

pub mod cli;
pub mod config;
pub mod controls;
pub mod engine;
pub mod platform;
pub mod version;

use config::Profile;
use engine::orchestrator::{ControlOrchestrator, OrchestratorConfig};
use engine::result::ControlReport;
use platform::Host;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// Re-exports for public API
pub use controls::package::assert_package_installed;
pub use controls::service::assert_service_installed_enabled_running;
pub use engine::result::ResultSummary;

/// Outcome of a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ControlResult {
    /// Every assertion held
    Pass { message: String, duration_ms: u64 },
    /// At least one assertion did not hold
    Fail {
        message: String,
        details: String,
        duration_ms: u64,
    },
}

impl ControlResult {
    /// Fold assertion outcomes into a single result.
    ///
    /// The failure message names each failing matcher and the queried target;
    /// `details` carries the per-assertion reasons.
    pub fn from_assertions(assertions: &[AssertionOutcome], duration_ms: u64) -> Self {
        let failed: Vec<&AssertionOutcome> = assertions.iter().filter(|a| !a.passed).collect();

        if failed.is_empty() {
            let message = match assertions.first() {
                Some(first) => format!(
                    "{} {}",
                    first.resource,
                    assertions
                        .iter()
                        .map(|a| a.matcher.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                None => "no assertions".to_string(),
            };
            return ControlResult::Pass {
                message,
                duration_ms,
            };
        }

        let matchers: Vec<String> = failed.iter().map(|a| a.matcher.to_string()).collect();
        let message = format!("{} failed {}", failed[0].resource, matchers.join(", "));
        let details = failed
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join("; ");

        ControlResult::Fail {
            message,
            details,
            duration_ms,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, ControlResult::Pass { .. })
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            ControlResult::Pass { duration_ms, .. } | ControlResult::Fail { duration_ms, .. } => {
                *duration_ms
            }
        }
    }
}

impl fmt::Display for ControlResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlResult::Pass { message, .. } => write!(f, "PASS: {}", message),
            ControlResult::Fail {
                message, details, ..
            } => write!(f, "FAIL: {} ({})", message, details),
        }
    }
}

/// Kind of resource a control inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// OS package presence
    Package,
    /// OS service state
    Service,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::Package => write!(f, "Package"),
            ControlKind::Service => write!(f, "Service"),
        }
    }
}

/// A single expectation about a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Matcher {
    #[serde(rename = "be_installed")]
    Installed,
    #[serde(rename = "be_enabled")]
    Enabled,
    #[serde(rename = "be_running")]
    Running,
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Installed => write!(f, "be_installed"),
            Matcher::Enabled => write!(f, "be_enabled"),
            Matcher::Running => write!(f, "be_running"),
        }
    }
}

/// The host resource an assertion targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum Resource {
    Package(String),
    Service(String),
}

impl Resource {
    pub fn name(&self) -> &str {
        match self {
            Resource::Package(name) | Resource::Service(name) => name,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Package(name) => write!(f, "package '{}'", name),
            Resource::Service(name) => write!(f, "service '{}'", name),
        }
    }
}

/// Outcome of one matcher against one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionOutcome {
    pub resource: Resource,
    pub matcher: Matcher,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AssertionOutcome {
    pub fn new(resource: Resource, matcher: Matcher, passed: bool) -> Self {
        let reason = if passed {
            None
        } else {
            Some(format!("expected {} {}", resource.name(), negated(matcher)))
        };
        AssertionOutcome {
            resource,
            matcher,
            passed,
            reason,
        }
    }

    /// A failed assertion caused by a host query error rather than host state
    pub fn errored(resource: Resource, matcher: Matcher, error: &HostcheckError) -> Self {
        AssertionOutcome {
            resource,
            matcher,
            passed: false,
            reason: Some(error.to_string()),
        }
    }
}

fn negated(matcher: Matcher) -> &'static str {
    match matcher {
        Matcher::Installed => "to be installed, but it is not",
        Matcher::Enabled => "to be enabled, but it is not",
        Matcher::Running => "to be running, but it is not",
    }
}

impl fmt::Display for AssertionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} should {}", self.resource, self.matcher)?;
        if let Some(ref reason) = self.reason {
            write!(f, ": {}", reason)?;
        }
        Ok(())
    }
}

/// A compliance control with its result.
#[derive(Debug, Clone, Serialize)]
pub struct Control {
    /// Unique identifier (e.g., "nftables.package.install")
    pub id: String,
    /// Human-readable title
    pub title: String,
    pub kind: ControlKind,
    /// Package or service name the control queries
    pub target: String,
    /// Individual assertion outcomes, in evaluation order
    pub assertions: Vec<AssertionOutcome>,
    /// Result of the control (None if not yet executed)
    pub result: Option<ControlResult>,
}

/// Error types for hostcheck operations.
#[derive(Debug, Error)]
pub enum HostcheckError {
    /// Invalid profile or command line input
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A host query command could not be run or reported an error
    #[error("Command '{command}' error: {message}")]
    Command { command: String, message: String },

    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// No supported package or service manager on this host
    #[error("Unsupported host: {0}")]
    Unsupported(String),

    #[error("Invalid profile: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run every control declared in `profile` against `host`.
///
/// The profile is validated first; a configuration error (for example an
/// empty service name) aborts the run before any host query is made.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use hostcheck::config::Profile;
/// use hostcheck::platform::LocalHost;
///
/// let mut profile = Profile::default();
/// profile.settings.fail_fast = true;
///
/// let host = Arc::new(LocalHost::detect().unwrap());
/// match hostcheck::run_controls(&profile, host) {
///     Ok(report) => {
///         let summary = report.summary();
///         println!("Passed: {}, Failed: {}", summary.passed, summary.failed);
///     }
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_controls(
    profile: &Profile,
    host: Arc<dyn Host>,
) -> Result<ControlReport, HostcheckError> {
    profile.validate()?;

    let orch_config = OrchestratorConfig {
        fail_fast: profile.settings.fail_fast,
        timeout_ms: profile.settings.timeout_ms,
    };

    let mut orchestrator = ControlOrchestrator::new(orch_config, host);
    orchestrator.register_controls(controls::build_controls(profile));

    let report = if !profile.settings.only.is_empty() {
        orchestrator.run_specific(&profile.settings.only)
    } else if !profile.settings.skip.is_empty() {
        orchestrator.run_excluding(&profile.settings.skip)
    } else {
        orchestrator.run_all()
    };

    Ok(report)
}
