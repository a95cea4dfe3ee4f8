//! Output formatting for hostcheck.
//!
//! Provides terminal, JSON, and JUnit XML output formatters.
//!
//! - Empty reports produce valid output with zero controls
//! - Color is disabled with --no-color or NO_COLOR
//! - Failing sub-conditions are always listed, even in quiet mode

use crate::cli::args::OutputFormat;
use crate::engine::result::{ControlReport, ResultSummary};
use crate::{Control, ControlKind, ControlResult, HostcheckError};
use chrono::SecondsFormat;
use serde::Serialize;

const RULE: &str = "--------------------------------------------------------------------------------";

/// Kinds in report order with their section headers
const SECTIONS: [(ControlKind, &str, &str); 2] = [
    (ControlKind::Package, "PACKAGE CONTROLS", "package"),
    (ControlKind::Service, "SERVICE CONTROLS", "service"),
];

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a control report into a string
    fn format(&self, report: &ControlReport) -> Result<String, HostcheckError>;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
    quiet: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool, quiet: bool) -> Self {
        TerminalFormatter {
            color,
            verbose,
            quiet,
        }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.colorize(text, "32")
    }

    fn red(&self, text: &str) -> String {
        self.colorize(text, "31")
    }

    fn gray(&self, text: &str) -> String {
        self.colorize(text, "90")
    }

    fn format_control(&self, control: &Control, output: &mut String) {
        let (status, message) = match &control.result {
            Some(ControlResult::Pass {
                message,
                duration_ms,
            }) => {
                let msg = if self.verbose {
                    format!("{} ({}ms)", message, duration_ms)
                } else {
                    message.clone()
                };
                (self.green("[PASS]"), msg)
            }
            Some(ControlResult::Fail {
                message,
                details,
                duration_ms,
            }) => {
                // Without assertions the details are the only explanation
                let msg = if self.verbose || control.assertions.is_empty() {
                    format!("{} - {} ({}ms)", message, details, duration_ms)
                } else {
                    message.clone()
                };
                (self.red("[FAIL]"), msg)
            }
            None => (self.gray("[----]"), "Not executed".to_string()),
        };

        output.push_str(&format!(
            "  {} {}: {} ({})\n",
            status, control.id, control.title, message
        ));

        for assertion in &control.assertions {
            if assertion.passed {
                if self.verbose {
                    output.push_str(&format!(
                        "         {} {} should {}\n",
                        self.green("ok"),
                        assertion.resource,
                        assertion.matcher
                    ));
                }
            } else {
                output.push_str(&format!("         {} {}\n", self.red("x"), assertion));
            }
        }
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, report: &ControlReport) -> Result<String, HostcheckError> {
        let mut output = String::new();

        output.push_str(RULE);
        output.push_str("\nhostcheck compliance report\n");
        output.push_str(&format!("Host: {}\n", report.hostname));
        if let Some(ref os) = report.os {
            output.push_str(&format!("OS: {}\n", os));
        }
        output.push_str(&format!(
            "Timestamp: {}\n",
            report.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        output.push_str(RULE);
        output.push_str("\n\n");

        for (kind, header, _) in SECTIONS.iter() {
            let controls: Vec<&Control> = report
                .by_kind(*kind)
                .filter(|c| !self.quiet || !matches!(c.result, Some(ControlResult::Pass { .. })))
                .collect();

            if controls.is_empty() {
                continue;
            }

            output.push_str(&format!("{}\n", header));
            for control in controls {
                self.format_control(control, &mut output);
            }
            output.push('\n');
        }

        let summary = report.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} passed, {} failed",
            summary.passed, summary.failed
        ));
        if summary.skipped > 0 {
            output.push_str(&format!(", {} not executed", summary.skipped));
        }
        output.push('\n');
        output.push_str(&format!(
            "Total time: {:.1}s\n",
            report.total_duration_ms as f64 / 1000.0
        ));

        let exit_desc = if summary.failed > 0 {
            "failures detected"
        } else {
            "all controls passed"
        };
        output.push_str(&format!("Exit code: {} ({})\n", summary.exit_code(), exit_desc));
        output.push_str(RULE);

        Ok(output)
    }
}

/// JSON document: the report plus its computed summary
#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a ControlReport,
    summary: ResultSummary,
}

/// JSON formatter
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ControlReport) -> Result<String, HostcheckError> {
        let document = JsonReport {
            report,
            summary: report.summary(),
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(json)
    }
}

/// JUnit XML formatter
#[derive(Default)]
pub struct JunitFormatter;

impl JunitFormatter {
    pub fn new() -> Self {
        JunitFormatter
    }

    fn escape_xml(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => result.push_str("&amp;"),
                '<' => result.push_str("&lt;"),
                '>' => result.push_str("&gt;"),
                '"' => result.push_str("&quot;"),
                '\'' => result.push_str("&apos;"),
                c => result.push(c),
            }
        }
        result
    }
}

fn seconds(duration_ms: u64) -> f64 {
    duration_ms as f64 / 1000.0
}

impl OutputFormatter for JunitFormatter {
    fn format(&self, report: &ControlReport) -> Result<String, HostcheckError> {
        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let summary = report.summary();
        output.push_str(&format!(
            "<testsuites tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
            summary.total,
            summary.failed,
            summary.skipped,
            seconds(report.total_duration_ms)
        ));

        // One test suite per control kind
        for (kind, _, suite_name) in SECTIONS.iter() {
            let controls: Vec<&Control> = report.by_kind(*kind).collect();
            if controls.is_empty() {
                continue;
            }

            let suite_failures = controls
                .iter()
                .filter(|c| matches!(&c.result, Some(ControlResult::Fail { .. })))
                .count();
            let suite_skipped = controls.iter().filter(|c| c.result.is_none()).count();
            let suite_time: u64 = controls
                .iter()
                .filter_map(|c| c.result.as_ref().map(|r| r.duration_ms()))
                .sum();

            output.push_str(&format!(
                "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
                suite_name,
                controls.len(),
                suite_failures,
                suite_skipped,
                seconds(suite_time)
            ));

            for control in controls {
                let time = control
                    .result
                    .as_ref()
                    .map(|r| r.duration_ms())
                    .unwrap_or(0);

                output.push_str(&format!(
                    "    <testcase name=\"{}\" classname=\"hostcheck.{}\" time=\"{:.3}\"",
                    Self::escape_xml(&control.id),
                    suite_name,
                    seconds(time)
                ));

                match &control.result {
                    Some(ControlResult::Pass { message, .. }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <system-out>{}</system-out>\n",
                            Self::escape_xml(message)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    Some(ControlResult::Fail {
                        message, details, ..
                    }) => {
                        output.push_str(">\n");
                        output.push_str(&format!(
                            "      <failure message=\"{}\">{}</failure>\n",
                            Self::escape_xml(message),
                            Self::escape_xml(details)
                        ));
                        output.push_str("    </testcase>\n");
                    }
                    None => {
                        output.push_str(">\n");
                        output.push_str("      <skipped message=\"not executed\" />\n");
                        output.push_str("    </testcase>\n");
                    }
                }
            }

            output.push_str("  </testsuite>\n");
        }

        output.push_str("</testsuites>");
        Ok(output)
    }
}

/// Get a formatter based on the output format.
///
/// Formats whose cargo feature is disabled fall back to terminal output.
pub fn get_formatter(
    format: OutputFormat,
    no_color: bool,
    verbose: bool,
    quiet: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        #[cfg(feature = "json")]
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        #[cfg(feature = "junit")]
        OutputFormat::Junit => Box::new(JunitFormatter::new()),
        #[allow(unreachable_patterns)]
        other => {
            if other != OutputFormat::Text {
                tracing::warn!(?other, "output format not compiled in, using text");
            }
            Box::new(TerminalFormatter::new(!no_color, verbose, quiet))
        }
    }
}
