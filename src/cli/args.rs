//! Command line arguments for hostcheck.

use crate::config::{Entry, Profile};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Subcommand)]
pub enum Command {
    /// Run compliance controls (default)
    #[default]
    Check,
    /// List the controls of the active profile
    List,
    /// Print version information
    Version,
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
    /// JUnit XML for CI/CD integration
    Junit,
}

/// Parsed command line arguments
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "hostcheck",
    about = "Host compliance controls: package installed, service installed/enabled/running",
    disable_version_flag = true,
    after_help = concat!(
        "EXIT CODES:\n",
        "    0   All controls passed\n",
        "    1   One or more controls failed\n",
        "    3   Configuration or runtime error",
    )
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Package that must be installed (repeatable, replaces the profile list)
    #[arg(long = "package", value_name = "NAME", global = true)]
    pub packages: Vec<String>,

    /// Service that must be installed, enabled and running (repeatable, replaces the profile list)
    #[arg(long = "service", value_name = "NAME", global = true)]
    pub services: Vec<String>,

    /// Run only the control with this ID (repeatable)
    #[arg(long, value_name = "ID", global = true)]
    pub only: Vec<String>,

    /// Skip the control with this ID (repeatable)
    #[arg(long, value_name = "ID", global = true)]
    pub skip: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t, env = "HOSTCHECK_FORMAT", global = true)]
    pub format: OutputFormat,

    /// Only output failures
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Include passing assertions and timings
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output (also set by a non-empty NO_COLOR)
    #[arg(
        long,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new(),
        global = true
    )]
    pub no_color: bool,

    /// Per-control timeout in milliseconds
    #[arg(long = "timeout", value_name = "MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Stop on first failure
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Load the control profile from a TOML file
    #[arg(long, value_name = "FILE", env = "HOSTCHECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter (overridden by RUST_LOG), e.g. "debug" or "hostcheck=trace"
    #[arg(long, value_name = "FILTER", global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Print version information
    #[arg(short = 'V', long = "version")]
    pub version: bool,
}

impl Args {
    /// Command to run, `check` when none was given
    pub fn selected_command(&self) -> Command {
        if self.version {
            Command::Version
        } else {
            self.command.unwrap_or_default()
        }
    }

    /// Apply command line overrides to a loaded profile.
    ///
    /// `--package` and `--service` replace the profile lists; other options
    /// only override settings that were given.
    pub fn apply_to(&self, profile: &mut Profile) {
        if !self.packages.is_empty() {
            profile.packages = self.packages.iter().map(Entry::named).collect();
        }
        if !self.services.is_empty() {
            profile.services = self.services.iter().map(Entry::named).collect();
        }
        if !self.only.is_empty() {
            profile.settings.only = self.only.clone();
        }
        if !self.skip.is_empty() {
            profile.settings.skip = self.skip.clone();
        }
        if self.fail_fast {
            profile.settings.fail_fast = true;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            profile.settings.timeout_ms = timeout_ms;
        }
    }
}
