//! Compliance controls.
//!
//! - Package: the package is installed
//! - Service: the service is installed, enabled and running
//!
//! Controls never panic and never mutate the host. Host query errors become
//! failed assertions; invalid input (empty names) becomes
//! `HostcheckError::Config`.

pub mod package;
pub mod service;

use crate::config::{ControlSpec, Profile};
use crate::engine::orchestrator::{control_fn, RegisteredControl};
use crate::ControlKind;

/// Build the registered controls declared by `profile`
pub fn build_controls(profile: &Profile) -> Vec<RegisteredControl> {
    profile.control_specs().into_iter().map(register).collect()
}

fn register(spec: ControlSpec) -> RegisteredControl {
    let target = spec.target.clone();

    let check_fn = match spec.kind {
        ControlKind::Package => {
            control_fn(move |host| package::assert_package_installed(host, &target))
        }
        ControlKind::Service => control_fn(move |host| {
            service::assert_service_installed_enabled_running(host, &target)
        }),
    };

    RegisteredControl {
        id: spec.id,
        title: spec.title,
        kind: spec.kind,
        target: spec.target,
        check_fn,
    }
}
