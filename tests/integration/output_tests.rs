//! Output formatting tests.
//!
//! Tests for terminal, JSON, and JUnit XML output formatters.

use chrono::{TimeZone, Utc};
use hostcheck::cli::args::OutputFormat;
use hostcheck::cli::output::{
    get_formatter, JsonFormatter, JunitFormatter, OutputFormatter, TerminalFormatter,
};
use hostcheck::engine::result::ControlReport;
use hostcheck::{AssertionOutcome, Control, ControlKind, ControlResult, Matcher, Resource};

fn service_outcomes(enabled: bool, running: bool) -> Vec<AssertionOutcome> {
    let resource = Resource::Service("nftables".to_string());
    vec![
        AssertionOutcome::new(resource.clone(), Matcher::Installed, true),
        AssertionOutcome::new(resource.clone(), Matcher::Enabled, enabled),
        AssertionOutcome::new(resource, Matcher::Running, running),
    ]
}

fn create_sample_report() -> ControlReport {
    let package = vec![AssertionOutcome::new(
        Resource::Package("nftables".to_string()),
        Matcher::Installed,
        true,
    )];
    let service = service_outcomes(true, false);

    ControlReport {
        timestamp: Utc.with_ymd_and_hms(2024, 12, 6, 15, 0, 0).unwrap(),
        hostname: "fw-edge-01".to_string(),
        os: Some("Debian GNU/Linux 12 (bookworm)".to_string()),
        controls: vec![
            Control {
                id: "nftables.package.install".to_string(),
                title: "The required package should be installed".to_string(),
                kind: ControlKind::Package,
                target: "nftables".to_string(),
                result: Some(ControlResult::from_assertions(&package, 12)),
                assertions: package,
            },
            Control {
                id: "nftables.service.running".to_string(),
                title: "The service should be installed, enabled and running".to_string(),
                kind: ControlKind::Service,
                target: "nftables".to_string(),
                result: Some(ControlResult::from_assertions(&service, 40)),
                assertions: service,
            },
        ],
        total_duration_ms: 52,
    }
}

#[test]
fn test_terminal_formatter_lists_failed_sub_condition() {
    let output = TerminalFormatter::new(false, false, false)
        .format(&create_sample_report())
        .unwrap();

    assert!(output.contains("Host: fw-edge-01"));
    assert!(output.contains("Timestamp: 2024-12-06T15:00:00Z"));
    assert!(output.contains("PACKAGE CONTROLS"));
    assert!(output.contains("SERVICE CONTROLS"));
    assert!(output.contains("[PASS] nftables.package.install"));
    assert!(output.contains("[FAIL] nftables.service.running"));
    assert!(output.contains("service 'nftables' failed be_running"));
    assert!(output.contains("service 'nftables' should be_running"));
    assert!(!output.contains("should be_enabled"));
    assert!(output.contains("SUMMARY: 1 passed, 1 failed"));
    assert!(output.contains("Exit code: 1 (failures detected)"));
    assert!(!output.contains("\x1b["));
}

#[test]
fn test_terminal_formatter_verbose_shows_passing_assertions() {
    let output = TerminalFormatter::new(false, true, false)
        .format(&create_sample_report())
        .unwrap();

    assert!(output.contains("ok service 'nftables' should be_enabled"));
    assert!(output.contains("12ms"));
}

#[test]
fn test_terminal_formatter_quiet_hides_passes() {
    let output = TerminalFormatter::new(false, false, true)
        .format(&create_sample_report())
        .unwrap();

    assert!(!output.contains("PACKAGE CONTROLS"));
    assert!(output.contains("[FAIL] nftables.service.running"));
    assert!(output.contains("SUMMARY: 1 passed, 1 failed"));
}

#[test]
fn test_terminal_formatter_color() {
    let output = TerminalFormatter::new(true, false, false)
        .format(&create_sample_report())
        .unwrap();

    assert!(output.contains("\x1b[32m[PASS]\x1b[0m"));
    assert!(output.contains("\x1b[31m[FAIL]\x1b[0m"));
}

#[test]
fn test_terminal_formatter_not_executed_control() {
    let mut report = create_sample_report();
    report.controls[1].result = None;
    report.controls[1].assertions.clear();

    let output = TerminalFormatter::new(false, false, false)
        .format(&report)
        .unwrap();
    assert!(output.contains("[----] nftables.service.running"));
    assert!(output.contains(", 1 not executed"));

    let xml = JunitFormatter::new().format(&report).unwrap();
    assert!(xml.contains(
        "<testsuite name=\"service\" tests=\"1\" failures=\"0\" errors=\"0\" skipped=\"1\""
    ));
    assert!(xml.contains("<skipped message=\"not executed\" />"));
}

#[test]
fn test_json_formatter_structure() {
    let output = JsonFormatter::new(false)
        .format(&create_sample_report())
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["hostname"], "fw-edge-01");
    assert_eq!(value["timestamp"], "2024-12-06T15:00:00Z");
    assert_eq!(value["summary"]["passed"], 1);
    assert_eq!(value["summary"]["failed"], 1);
    assert_eq!(value["summary"]["total"], 2);

    let service = &value["controls"][1];
    assert_eq!(service["id"], "nftables.service.running");
    assert_eq!(service["kind"], "service");
    assert_eq!(service["result"]["status"], "fail");
    assert_eq!(service["result"]["message"], "service 'nftables' failed be_running");

    let running = &service["assertions"][2];
    assert_eq!(running["matcher"], "be_running");
    assert_eq!(running["passed"], false);
    assert_eq!(running["resource"]["type"], "service");
    assert_eq!(running["resource"]["name"], "nftables");
    assert!(service["assertions"][0].get("reason").is_none());
}

#[test]
fn test_json_formatter_pretty() {
    let output = JsonFormatter::new(true)
        .format(&create_sample_report())
        .unwrap();
    assert!(output.contains('\n'));
    assert!(serde_json::from_str::<serde_json::Value>(&output).is_ok());
}

#[test]
fn test_junit_formatter_structure() {
    let output = JunitFormatter::new()
        .format(&create_sample_report())
        .unwrap();

    assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(output.contains(
        "<testsuites tests=\"2\" failures=\"1\" errors=\"0\" skipped=\"0\" time=\"0.052\">"
    ));
    assert!(output.contains("<testsuite name=\"package\" tests=\"1\" failures=\"0\""));
    assert!(output.contains("<testsuite name=\"service\" tests=\"1\" failures=\"1\""));
    assert!(output.contains("classname=\"hostcheck.service\""));
    assert!(output
        .contains("<failure message=\"service &apos;nftables&apos; failed be_running\">"));
    assert!(output.ends_with("</testsuites>"));
}

#[test]
fn test_junit_formatter_omits_empty_suites() {
    let mut report = create_sample_report();
    report.controls.truncate(1);

    let output = JunitFormatter::new().format(&report).unwrap();
    assert!(output.contains("<testsuite name=\"package\""));
    assert!(!output.contains("<testsuite name=\"service\""));
}

#[test]
fn test_get_formatter_selects_by_format() {
    let report = create_sample_report();

    let text = get_formatter(OutputFormat::Text, true, false, false)
        .format(&report)
        .unwrap();
    assert!(text.contains("hostcheck compliance report"));

    let json = get_formatter(OutputFormat::Json, true, false, false)
        .format(&report)
        .unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());

    let xml = get_formatter(OutputFormat::Junit, true, false, false)
        .format(&report)
        .unwrap();
    assert!(xml.contains("<testsuites"));
}
