//! Linux system interface.
//!
//! Provides host identity (hostname, OS release) and executable lookup.
//!
//! # Graceful Degradation
//!
//! - Missing /etc/os-release: falls back to /usr/lib/os-release, then empty info
//! - Unreadable hostname files: returns HostcheckError::Io
//! - Unknown os-release keys are ignored
//!
//! No function in this module will panic.

use crate::HostcheckError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Fields of interest from os-release(5)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: Option<String>,
    /// Space separated list of related distribution IDs
    pub id_like: Vec<String>,
    pub pretty_name: Option<String>,
}

impl OsRelease {
    /// `ID` followed by every `ID_LIKE` entry
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.id
            .iter()
            .map(|s| s.as_str())
            .chain(self.id_like.iter().map(|s| s.as_str()))
    }
}

/// Get the system hostname
pub fn get_hostname() -> Result<String, HostcheckError> {
    for path in ["/etc/hostname", "/proc/sys/kernel/hostname"] {
        if let Ok(hostname) = fs::read_to_string(path) {
            let hostname = hostname.trim().to_string();
            if !hostname.is_empty() {
                return Ok(hostname);
            }
        }
    }

    Err(HostcheckError::Io {
        context: "get_hostname".to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not read hostname from /etc/hostname or /proc",
        ),
    })
}

/// Read os-release from its standard locations
pub fn read_os_release() -> OsRelease {
    ["/etc/os-release", "/usr/lib/os-release"]
        .iter()
        .find_map(|path| fs::read_to_string(path).ok())
        .map(|content| parse_os_release(&content))
        .unwrap_or_default()
}

/// Parse os-release(5) content
pub fn parse_os_release(content: &str) -> OsRelease {
    let mut release = OsRelease::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim());

        match key.trim() {
            "ID" => release.id = Some(value.to_lowercase()),
            "ID_LIKE" => {
                release.id_like = value.split_whitespace().map(|s| s.to_lowercase()).collect()
            }
            "PRETTY_NAME" => release.pretty_name = Some(value.to_string()),
            _ => {}
        }
    }

    release
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Locate an executable on PATH
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
