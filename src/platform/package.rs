//! Package manager queries.
//!
//! Answers one question per backend: is this package installed, and if so
//! which version. Nothing here installs or removes packages.

use crate::platform::command::{command_error, CommandOutput, CommandRunner};
use crate::platform::linux::{self, OsRelease};
use crate::HostcheckError;
use serde::Serialize;
use std::fmt;

/// Installation state of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PackageInfo {
    pub fn missing(name: &str) -> Self {
        PackageInfo {
            name: name.to_string(),
            installed: false,
            version: None,
        }
    }

    pub fn installed(name: &str, version: Option<String>) -> Self {
        PackageInfo {
            name: name.to_string(),
            installed: true,
            version,
        }
    }
}

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageBackend {
    /// Debian, Ubuntu and derivatives
    Dpkg,
    /// Fedora, RHEL, SUSE and derivatives
    Rpm,
    /// Arch Linux and derivatives
    Pacman,
    /// Alpine Linux
    Apk,
}

impl fmt::Display for PackageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageBackend::Dpkg => write!(f, "dpkg"),
            PackageBackend::Rpm => write!(f, "rpm"),
            PackageBackend::Pacman => write!(f, "pacman"),
            PackageBackend::Apk => write!(f, "apk"),
        }
    }
}

impl PackageBackend {
    const PROBE_ORDER: [PackageBackend; 4] = [
        PackageBackend::Dpkg,
        PackageBackend::Rpm,
        PackageBackend::Pacman,
        PackageBackend::Apk,
    ];

    /// Query program used by this backend
    pub fn program(&self) -> &'static str {
        match self {
            PackageBackend::Dpkg => "dpkg-query",
            PackageBackend::Rpm => "rpm",
            PackageBackend::Pacman => "pacman",
            PackageBackend::Apk => "apk",
        }
    }

    /// Map os-release `ID`/`ID_LIKE` to a backend
    pub fn from_os_release(release: &OsRelease) -> Option<Self> {
        release.families().find_map(|family| match family {
            "debian" | "ubuntu" | "raspbian" | "linuxmint" | "pop" => Some(PackageBackend::Dpkg),
            "rhel" | "fedora" | "centos" | "rocky" | "almalinux" | "amzn" | "ol" | "suse"
            | "opensuse" | "sles" | "opensuse-leap" | "opensuse-tumbleweed" => {
                Some(PackageBackend::Rpm)
            }
            "arch" | "manjaro" | "endeavouros" => Some(PackageBackend::Pacman),
            "alpine" => Some(PackageBackend::Apk),
            _ => None,
        })
    }

    /// Pick a backend from os-release, falling back to whichever query tool is on PATH
    pub fn detect(release: &OsRelease) -> Option<Self> {
        Self::from_os_release(release).or_else(|| {
            Self::PROBE_ORDER
                .into_iter()
                .find(|backend| linux::find_in_path(backend.program()).is_some())
        })
    }

    /// Query the installation state of `name`
    pub fn query(
        &self,
        runner: &dyn CommandRunner,
        name: &str,
    ) -> Result<PackageInfo, HostcheckError> {
        let program = self.program();
        let args: Vec<&str> = match self {
            PackageBackend::Dpkg => vec!["-W", "-f", "${Status}\\t${Version}\\n", name],
            PackageBackend::Rpm => vec!["-q", "--queryformat", "%{VERSION}-%{RELEASE}\\n", name],
            PackageBackend::Pacman => vec!["-Q", name],
            PackageBackend::Apk => vec!["info", "-e", name],
        };

        let output = runner.run(program, &args)?;

        let parsed = match self {
            PackageBackend::Dpkg => parse_dpkg_query(name, &output),
            PackageBackend::Rpm => parse_rpm_query(name, &output),
            PackageBackend::Pacman => parse_pacman_query(name, &output),
            PackageBackend::Apk => parse_apk_info(name, &output),
        };

        parsed.ok_or_else(|| command_error(program, &args, &output))
    }
}

/// Parse `dpkg-query -W -f '${Status}\t${Version}\n'`.
///
/// Multi-arch packages produce one line per architecture; the package counts
/// as installed when any of them is. Returns None for an unexpected failure.
pub fn parse_dpkg_query(name: &str, output: &CommandOutput) -> Option<PackageInfo> {
    if !output.success() {
        // Exit 1 with "no packages found matching" means unknown to dpkg
        return if output.status == Some(1) && output.stderr.contains("no packages found") {
            Some(PackageInfo::missing(name))
        } else {
            None
        };
    }

    for line in output.stdout.lines() {
        let (status, version) = line.split_once('\t').unwrap_or((line, ""));
        // Status is "<want> <error> <state>", e.g. "install ok installed"
        if status.split_whitespace().nth(2) == Some("installed") {
            let version = Some(version.trim().to_string()).filter(|v| !v.is_empty());
            return Some(PackageInfo::installed(name, version));
        }
    }

    Some(PackageInfo::missing(name))
}

/// Parse `rpm -q --queryformat '%{VERSION}-%{RELEASE}\n'`
pub fn parse_rpm_query(name: &str, output: &CommandOutput) -> Option<PackageInfo> {
    if output.success() {
        let version = output
            .stdout
            .lines()
            .next()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        return Some(PackageInfo::installed(name, version));
    }

    if output.stdout.contains("is not installed") || output.stderr.contains("is not installed") {
        Some(PackageInfo::missing(name))
    } else {
        None
    }
}

/// Parse `pacman -Q NAME`, which prints "NAME VERSION" when installed
pub fn parse_pacman_query(name: &str, output: &CommandOutput) -> Option<PackageInfo> {
    if output.success() {
        let version = output
            .stdout
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .map(|v| v.to_string());
        return Some(PackageInfo::installed(name, version));
    }

    if output.stderr.contains("was not found") {
        Some(PackageInfo::missing(name))
    } else {
        None
    }
}

/// Parse `apk info -e NAME`, which exits 1 when the package is absent
pub fn parse_apk_info(name: &str, output: &CommandOutput) -> Option<PackageInfo> {
    match output.status {
        Some(0) if output.stdout.lines().any(|l| l.trim() == name) => {
            Some(PackageInfo::installed(name, None))
        }
        Some(0) | Some(1) => Some(PackageInfo::missing(name)),
        _ => None,
    }
}
