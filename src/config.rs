//! Control profile configuration.
//!
//! A profile names the packages and services to check plus run settings.
//! It is loaded from TOML; the built-in default reproduces the nftables
//! controls:
//!
//! ```toml
//! [profile]
//! name = "nftables"
//!
//! [[package]]
//! name = "nftables"
//!
//! [[service]]
//! name = "nftables"
//!
//! [settings]
//! fail_fast = false
//! timeout_ms = 30000
//! ```

use crate::{ControlKind, HostcheckError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

pub const PACKAGE_TITLE: &str = "The required package should be installed";
pub const SERVICE_TITLE: &str = "The service should be installed, enabled and running";

const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// Profile metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileMeta {
    /// Prefix for the default control IDs
    pub name: String,
}

impl Default for ProfileMeta {
    fn default() -> Self {
        ProfileMeta {
            name: "hostcheck".to_string(),
        }
    }
}

/// A package or service to check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    pub name: String,
    /// Control ID override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Control title override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Entry {
    pub fn named(name: impl Into<String>) -> Self {
        Entry {
            name: name.into(),
            id: None,
            title: None,
        }
    }
}

/// Run settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Stop on first failing control
    pub fail_fast: bool,
    /// Per-control time limit in milliseconds
    pub timeout_ms: u64,
    /// Run only these control IDs
    pub only: Vec<String>,
    /// Skip these control IDs
    pub skip: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            fail_fast: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            only: Vec::new(),
            skip: Vec::new(),
        }
    }
}

/// A control resolved from a profile entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSpec {
    pub id: String,
    pub title: String,
    pub kind: ControlKind,
    pub target: String,
}

/// Packages, services and settings for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub profile: ProfileMeta,
    #[serde(default, rename = "package")]
    pub packages: Vec<Entry>,
    #[serde(default, rename = "service")]
    pub services: Vec<Entry>,
    #[serde(default)]
    pub settings: Settings,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            profile: ProfileMeta {
                name: "nftables".to_string(),
            },
            packages: vec![Entry::named("nftables")],
            services: vec![Entry::named("nftables")],
            settings: Settings::default(),
        }
    }
}

impl Profile {
    /// Parse a profile from TOML text
    pub fn from_toml(content: &str) -> Result<Self, HostcheckError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a profile from a TOML file
    pub fn load(path: &Path) -> Result<Self, HostcheckError> {
        let content = std::fs::read_to_string(path).map_err(|e| HostcheckError::Io {
            context: format!("reading profile {}", path.display()),
            source: e,
        })?;
        let profile = Self::from_toml(&content)?;
        debug!(path = %path.display(), name = %profile.profile.name, "loaded profile");
        Ok(profile)
    }

    /// Load from `path` if given, otherwise use the built-in profile
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, HostcheckError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve entries into controls, packages first
    pub fn control_specs(&self) -> Vec<ControlSpec> {
        let packages = self.packages.iter().enumerate().map(|(i, entry)| {
            self.resolve(entry, i, ControlKind::Package, "package.install", PACKAGE_TITLE)
        });
        let services = self.services.iter().enumerate().map(|(i, entry)| {
            self.resolve(entry, i, ControlKind::Service, "service.running", SERVICE_TITLE)
        });
        packages.chain(services).collect()
    }

    fn resolve(
        &self,
        entry: &Entry,
        index: usize,
        kind: ControlKind,
        suffix: &str,
        title: &str,
    ) -> ControlSpec {
        // The first entry of each kind is named after the profile
        let id = entry.id.clone().unwrap_or_else(|| {
            let prefix = if index == 0 {
                self.profile.name.as_str()
            } else {
                entry.name.trim()
            };
            format!("{}.{}", prefix, suffix)
        });

        ControlSpec {
            id,
            title: entry.title.clone().unwrap_or_else(|| title.to_string()),
            kind,
            target: entry.name.trim().to_string(),
        }
    }

    /// Reject profiles that cannot be evaluated.
    ///
    /// An empty package or service name is a configuration error rather than
    /// a query against the host's managers.
    pub fn validate(&self) -> Result<(), HostcheckError> {
        if self.profile.name.trim().is_empty() {
            return Err(HostcheckError::Config("profile name must not be empty".to_string()));
        }

        if self.settings.timeout_ms == 0 {
            return Err(HostcheckError::Config("timeout_ms must be greater than zero".to_string()));
        }

        let specs = self.control_specs();
        let mut seen = HashSet::new();

        for spec in &specs {
            if spec.target.is_empty() {
                let kind = match spec.kind {
                    ControlKind::Package => "package",
                    ControlKind::Service => "service",
                };
                return Err(HostcheckError::Config(format!(
                    "{} name must not be empty (control '{}')",
                    kind, spec.id
                )));
            }

            if !seen.insert(spec.id.as_str()) {
                return Err(HostcheckError::Config(format!("duplicate control id '{}'", spec.id)));
            }
        }

        for id in self.settings.only.iter().chain(self.settings.skip.iter()) {
            if !seen.contains(id.as_str()) {
                warn!(control = %id, "unknown control id ignored");
            }
        }

        Ok(())
    }
}
