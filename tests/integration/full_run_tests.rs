//! Full run integration tests.
//!
//! Runs profiles end to end against mock hosts: control selection,
//! fail-fast behavior, failure reporting and configuration errors.

use crate::mocks::{MockHost, MockHostConfig, MockService};
use hostcheck::config::{Entry, Profile};
use hostcheck::engine::result::ControlReport;
use hostcheck::{run_controls, ControlResult, HostcheckError, Matcher};
use std::sync::Arc;

fn run(profile: &Profile, config: MockHostConfig) -> ControlReport {
    run_controls(profile, Arc::new(MockHost::new(config))).unwrap()
}

fn result_of<'a>(report: &'a ControlReport, id: &str) -> &'a ControlResult {
    report
        .controls
        .iter()
        .find(|c| c.id == id)
        .and_then(|c| c.result.as_ref())
        .unwrap_or_else(|| panic!("control {} missing from report", id))
}

fn failed_matchers(report: &ControlReport, id: &str) -> Vec<Matcher> {
    report
        .controls
        .iter()
        .find(|c| c.id == id)
        .map(|c| {
            c.assertions
                .iter()
                .filter(|a| !a.passed)
                .map(|a| a.matcher)
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_compliant_host_passes_both_controls() {
    let report = run(&Profile::default(), MockHostConfig::nftables_compliant());

    let summary = report.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(report.os.as_deref(), Some("Debian GNU/Linux 12 (bookworm)"));

    let ids: Vec<&str> = report.controls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["nftables.package.install", "nftables.service.running"]);
}

#[test]
fn test_missing_package_fails_package_control_only() {
    let report = run(&Profile::default(), MockHostConfig::package_missing());

    match result_of(&report, "nftables.package.install") {
        ControlResult::Fail { message, .. } => {
            assert_eq!(message, "package 'nftables' failed be_installed")
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(result_of(&report, "nftables.service.running").is_pass());
    assert_eq!(report.summary().exit_code(), 1);
}

#[test]
fn test_stopped_service_reports_running_only() {
    let report = run(&Profile::default(), MockHostConfig::service_stopped());

    assert!(result_of(&report, "nftables.package.install").is_pass());
    assert_eq!(failed_matchers(&report, "nftables.service.running"), vec![Matcher::Running]);
}

#[test]
fn test_disabled_service_reports_enabled_only() {
    let report = run(&Profile::default(), MockHostConfig::service_disabled());
    assert_eq!(failed_matchers(&report, "nftables.service.running"), vec![Matcher::Enabled]);
}

#[test]
fn test_missing_service_reports_all_sub_conditions() {
    let report = run(&Profile::default(), MockHostConfig::service_missing());
    assert_eq!(
        failed_matchers(&report, "nftables.service.running"),
        vec![Matcher::Installed, Matcher::Enabled, Matcher::Running]
    );

    match result_of(&report, "nftables.service.running") {
        ControlResult::Fail { details, .. } => {
            assert!(details.contains("service 'nftables' should be_installed"));
            assert!(details.contains("service 'nftables' should be_running"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_service_manager_error_fails_control() {
    let report = run(&Profile::default(), MockHostConfig::no_service_manager());

    match result_of(&report, "nftables.service.running") {
        ControlResult::Fail { details, .. } => {
            assert!(details.contains("no supported service manager found"))
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_empty_service_name_fails_fast_without_queries() {
    let mut profile = Profile::default();
    profile.services = vec![Entry::named("")];

    let host = Arc::new(MockHost::new(MockHostConfig::nftables_compliant()));
    let result = run_controls(&profile, host.clone());

    match result {
        Err(HostcheckError::Config(message)) => {
            assert!(message.contains("service name must not be empty"))
        }
        other => panic!(
            "expected configuration error, got {:?}",
            other.map(|r| r.controls.len())
        ),
    }
    assert_eq!(host.query_count(), 0);
}

#[test]
fn test_fail_fast_stops_after_first_failure() {
    let mut profile = Profile::default();
    profile.settings.fail_fast = true;

    let host = Arc::new(MockHost::new(MockHostConfig::package_missing()));
    let report = run_controls(&profile, host.clone()).unwrap();

    assert_eq!(report.controls.len(), 2);
    assert!(!result_of(&report, "nftables.package.install").is_pass());
    assert!(report.controls[1].result.is_none());
    assert_eq!(report.summary().skipped, 1);
    assert_eq!(host.query_count(), 1);
}

#[test]
fn test_without_fail_fast_all_controls_run() {
    let mut config = MockHostConfig::package_missing();
    config.services.insert("nftables".to_string(), MockService::stopped());

    let report = run(&Profile::default(), config);
    assert_eq!(report.controls.len(), 2);
    assert_eq!(report.summary().failed, 2);
}

#[test]
fn test_only_and_skip_select_controls() {
    let mut profile = Profile::default();
    profile.settings.only = vec!["nftables.service.running".to_string(), "unknown.id".to_string()];
    let report = run(&profile, MockHostConfig::nftables_compliant());
    assert_eq!(report.controls.len(), 1);
    assert_eq!(report.controls[0].id, "nftables.service.running");

    let mut profile = Profile::default();
    profile.settings.skip = vec!["nftables.service.running".to_string()];
    let report = run(&profile, MockHostConfig::no_service_manager());
    assert_eq!(report.controls.len(), 1);
    assert_eq!(report.summary().failed, 0);
}

#[test]
fn test_profile_with_several_packages() {
    let profile = Profile::from_toml(
        r#"
[profile]
name = "firewall"

[[package]]
name = "nftables"

[[package]]
name = "conntrack"

[[service]]
name = "nftables"
"#,
    )
    .unwrap();

    let report = run(&profile, MockHostConfig::nftables_compliant());
    let ids: Vec<&str> = report.controls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["firewall.package.install", "conntrack.package.install", "firewall.service.running"]
    );
    assert!(result_of(&report, "firewall.package.install").is_pass());
    assert!(!result_of(&report, "conntrack.package.install").is_pass());
}
