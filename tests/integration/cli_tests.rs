//! CLI integration tests.
//!
//! Tests for argument parsing and how arguments override the profile.

use clap::Parser;
use hostcheck::cli::args::{Args, Command, OutputFormat};
use hostcheck::config::{Entry, Profile};
use hostcheck::HostcheckError;
use std::io::Write;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("hostcheck").chain(args.iter().copied()))
        .unwrap()
}

#[test]
fn test_default_command_is_check() {
    let args = parse(&[]);
    assert_eq!(args.selected_command(), Command::Check);
    assert!(args.packages.is_empty());
    assert!(args.services.is_empty());
    assert!(!args.fail_fast);
}

#[test]
fn test_subcommands() {
    assert_eq!(parse(&["check"]).selected_command(), Command::Check);
    assert_eq!(parse(&["list"]).selected_command(), Command::List);
    assert_eq!(parse(&["version"]).selected_command(), Command::Version);
    assert_eq!(parse(&["--version"]).selected_command(), Command::Version);
}

#[test]
fn test_output_formats() {
    assert_eq!(parse(&["--format", "text"]).format, OutputFormat::Text);
    assert_eq!(parse(&["--format", "json"]).format, OutputFormat::Json);
    assert_eq!(parse(&["--format=junit"]).format, OutputFormat::Junit);
}

#[test]
fn test_quiet_and_verbose_short_flags() {
    let args = parse(&["-q", "-v"]);
    assert!(args.quiet);
    assert!(args.verbose);
}

#[test]
fn test_config_and_logging_options() {
    let args = parse(&[
        "list",
        "--config",
        "/etc/hostcheck/profile.toml",
        "--log-level",
        "debug",
        "--log-json",
    ]);
    assert_eq!(args.config, Some(PathBuf::from("/etc/hostcheck/profile.toml")));
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert!(args.log_json);
}

#[test]
fn test_no_color_flag() {
    assert!(parse(&["--no-color"]).no_color);
    assert!(parse(&["list", "--no-color"]).no_color);
}

#[test]
fn test_empty_service_name_parses() {
    // Rejected later by profile validation, not by the parser
    let args = parse(&["--service", ""]);
    assert_eq!(args.services, vec![""]);
}

#[test]
fn test_invalid_timeout_rejected() {
    assert!(Args::try_parse_from(["hostcheck", "--timeout", "soon"]).is_err());
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Args::try_parse_from(["hostcheck", "audit"]).is_err());
}

#[test]
fn test_service_override_keeps_default_package() {
    let mut profile = Profile::default();
    parse(&["--service", "firewalld"]).apply_to(&mut profile);

    let ids: Vec<String> = profile.control_specs().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["nftables.package.install", "nftables.service.running"]);
    assert_eq!(profile.services, vec![Entry::named("firewalld")]);
    assert!(profile.validate().is_ok());
}

#[test]
fn test_empty_service_override_fails_validation() {
    let mut profile = Profile::default();
    parse(&["check", "--service", ""]).apply_to(&mut profile);

    match profile.validate() {
        Err(HostcheckError::Config(message)) => {
            assert!(message.contains("service name must not be empty"))
        }
        other => panic!("expected configuration error, got {:?}", other),
    }
}

#[test]
fn test_only_and_skip_flow_into_settings() {
    let mut profile = Profile::default();
    parse(&[
        "--only",
        "nftables.package.install",
        "--skip",
        "nftables.service.running",
    ])
    .apply_to(&mut profile);
    assert_eq!(profile.settings.only, vec!["nftables.package.install"]);
    assert_eq!(profile.settings.skip, vec!["nftables.service.running"]);
}

#[test]
fn test_load_profile_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[profile]
name = "edge"

[[service]]
name = "nftables"

[settings]
timeout_ms = 1000
"#
    )
    .unwrap();

    let profile = Profile::load_or_default(Some(file.path())).unwrap();
    assert_eq!(profile.profile.name, "edge");
    assert!(profile.packages.is_empty());
    assert_eq!(profile.settings.timeout_ms, 1000);
    assert_eq!(profile.control_specs()[0].id, "edge.service.running");
}

#[test]
fn test_invalid_profile_file_is_toml_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[[service]\nname = ").unwrap();

    assert!(matches!(Profile::load(file.path()), Err(HostcheckError::Toml(_))));
}
