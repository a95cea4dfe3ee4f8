//! Service manager queries.
//!
//! Reports whether a service is installed, enabled at boot and currently
//! running. Read-only: nothing here starts, stops or enables a service.

use crate::platform::command::{command_error, CommandOutput, CommandRunner};
use crate::platform::linux;
use crate::HostcheckError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// State of a service as reported by the service manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub installed: bool,
    pub enabled: bool,
    pub running: bool,
}

impl ServiceStatus {
    pub fn missing(name: &str) -> Self {
        ServiceStatus {
            name: name.to_string(),
            installed: false,
            enabled: false,
            running: false,
        }
    }
}

/// Supported service managers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceBackend {
    Systemd,
    OpenRc,
}

impl fmt::Display for ServiceBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceBackend::Systemd => write!(f, "systemd"),
            ServiceBackend::OpenRc => write!(f, "openrc"),
        }
    }
}

/// `UnitFileState` values that `systemctl is-enabled` reports as enabled
const SYSTEMD_ENABLED_STATES: [&str; 7] = [
    "enabled",
    "enabled-runtime",
    "static",
    "alias",
    "indirect",
    "generated",
    "transient",
];

impl ServiceBackend {
    /// systemd when booted with it (sd_booted semantics), else OpenRC if present
    pub fn detect() -> Option<Self> {
        if Path::new("/run/systemd/system").is_dir() {
            Some(ServiceBackend::Systemd)
        } else if linux::find_in_path("rc-service").is_some() {
            Some(ServiceBackend::OpenRc)
        } else {
            None
        }
    }

    /// Query installed/enabled/running for `name`
    pub fn query(
        &self,
        runner: &dyn CommandRunner,
        name: &str,
    ) -> Result<ServiceStatus, HostcheckError> {
        match self {
            ServiceBackend::Systemd => query_systemd(runner, name),
            ServiceBackend::OpenRc => query_openrc(runner, name),
        }
    }
}

fn query_systemd(runner: &dyn CommandRunner, name: &str) -> Result<ServiceStatus, HostcheckError> {
    let args = [
        "show",
        "--property=LoadState,UnitFileState,ActiveState",
        "--",
        name,
    ];
    let output = runner.run("systemctl", &args)?;

    if !output.success() {
        return Err(command_error("systemctl", &args, &output));
    }

    parse_systemctl_show(name, &output.stdout)
}

/// Parse `systemctl show --property=LoadState,UnitFileState,ActiveState`
pub fn parse_systemctl_show(name: &str, stdout: &str) -> Result<ServiceStatus, HostcheckError> {
    let mut load_state = None;
    let mut unit_file_state = "";
    let mut active_state = "";

    for line in stdout.lines() {
        match line.split_once('=') {
            Some(("LoadState", value)) => load_state = Some(value.trim()),
            Some(("UnitFileState", value)) => unit_file_state = value.trim(),
            Some(("ActiveState", value)) => active_state = value.trim(),
            _ => {}
        }
    }

    let load_state = load_state.ok_or_else(|| HostcheckError::Parse {
        context: format!("systemctl show {}", name),
        message: "missing LoadState property".to_string(),
    })?;

    let installed = load_state != "not-found";

    Ok(ServiceStatus {
        name: name.to_string(),
        installed,
        enabled: installed && SYSTEMD_ENABLED_STATES.contains(&unit_file_state),
        running: installed && active_state == "active",
    })
}

fn query_openrc(runner: &dyn CommandRunner, name: &str) -> Result<ServiceStatus, HostcheckError> {
    let exists = runner.run("rc-service", &["-e", name])?;
    if !exists.success() {
        return Ok(ServiceStatus::missing(name));
    }

    let update_args = ["show", "-v"];
    let runlevels = runner.run("rc-update", &update_args)?;
    if !runlevels.success() {
        return Err(command_error("rc-update", &update_args, &runlevels));
    }

    let status = runner.run("rc-service", &[name, "status"])?;

    Ok(ServiceStatus {
        name: name.to_string(),
        installed: true,
        enabled: parse_rc_update_show(name, &runlevels.stdout),
        running: openrc_running(&status),
    })
}

/// Parse `rc-update show -v`: "  nftables | boot default"; an empty runlevel
/// list means the service is known but not enabled
pub fn parse_rc_update_show(name: &str, stdout: &str) -> bool {
    stdout.lines().any(|line| match line.split_once('|') {
        Some((service, runlevels)) => service.trim() == name && !runlevels.trim().is_empty(),
        None => false,
    })
}

/// `rc-service NAME status` exits 0 only when started
fn openrc_running(output: &CommandOutput) -> bool {
    output.success()
}
