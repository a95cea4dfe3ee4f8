//! hostcheck CLI entry point
//!
//! Evaluates host compliance controls and reports the results.

use clap::Parser;
use hostcheck::cli::args::{Args, Command};
use hostcheck::cli::logging;
use hostcheck::cli::output::get_formatter;
use hostcheck::config::Profile;
use hostcheck::platform::LocalHost;
use hostcheck::version::get_build_info;
use hostcheck::{run_controls, HostcheckError};

use std::process::ExitCode;
use std::sync::Arc;

const EXIT_ERROR: u8 = 3;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            // --help and friends
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    logging::init(args.log_level.as_deref(), args.log_json);

    let result = match args.selected_command() {
        Command::Version => {
            println!("{}", get_build_info());
            Ok(ExitCode::SUCCESS)
        }
        Command::List => print_control_list(&args),
        Command::Check => check(&args),
    };

    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "hostcheck failed");
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Load the profile and apply command line overrides
fn load_profile(args: &Args) -> Result<Profile, HostcheckError> {
    let mut profile = Profile::load_or_default(args.config.as_deref())?;
    args.apply_to(&mut profile);
    profile.validate()?;
    Ok(profile)
}

fn print_control_list(args: &Args) -> Result<ExitCode, HostcheckError> {
    let profile = load_profile(args)?;

    println!("Available controls ({}):", profile.profile.name);
    println!();
    for spec in profile.control_specs() {
        println!(
            "  {:<32} {:<8} {:<20} {}",
            spec.id,
            spec.kind.to_string(),
            spec.target,
            spec.title
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn check(args: &Args) -> Result<ExitCode, HostcheckError> {
    // Validate before touching the host
    let profile = load_profile(args)?;
    let host = Arc::new(LocalHost::detect()?);

    let report = run_controls(&profile, host)?;

    let formatter = get_formatter(args.format, args.no_color, args.verbose, args.quiet);
    println!("{}", formatter.format(&report)?);

    Ok(ExitCode::from(report.summary().exit_code()))
}
