//! The host being inspected.
//!
//! Controls only ever talk to a [`Host`]; [`LocalHost`] implements it on top
//! of the detected package and service backends.

use crate::platform::command::{CommandRunner, SystemRunner};
use crate::platform::linux;
use crate::platform::package::{PackageBackend, PackageInfo};
use crate::platform::service::{ServiceBackend, ServiceStatus};
use crate::HostcheckError;
use std::sync::Arc;
use tracing::{debug, info};

/// Package and service state of a machine.
pub trait Host: Send + Sync {
    /// Installation state of a package
    fn package(&self, name: &str) -> Result<PackageInfo, HostcheckError>;

    /// Installed/enabled/running state of a service
    fn service(&self, name: &str) -> Result<ServiceStatus, HostcheckError>;

    /// Human readable OS description for reports
    fn os_description(&self) -> Option<String> {
        None
    }
}

/// The machine hostcheck runs on.
///
/// A missing backend is not an error at construction time; queries against
/// it fail with `HostcheckError::Unsupported`, which the affected controls
/// report as failures.
pub struct LocalHost {
    packages: Option<PackageBackend>,
    services: Option<ServiceBackend>,
    os: Option<String>,
    runner: Arc<dyn CommandRunner>,
}

impl LocalHost {
    /// Detect the package and service backends of the running system
    pub fn detect() -> Result<Self, HostcheckError> {
        let release = linux::read_os_release();
        let packages = PackageBackend::detect(&release);
        let services = ServiceBackend::detect();

        info!(
            os = release.pretty_name.as_deref().unwrap_or("unknown"),
            packages = %packages.map(|b| b.to_string()).unwrap_or_else(|| "none".to_string()),
            services = %services.map(|b| b.to_string()).unwrap_or_else(|| "none".to_string()),
            "detected host backends"
        );

        if packages.is_none() && services.is_none() {
            return Err(HostcheckError::Unsupported(
                "no supported package manager or service manager found".to_string(),
            ));
        }

        Ok(LocalHost {
            packages,
            services,
            os: release.pretty_name,
            runner: Arc::new(SystemRunner),
        })
    }

    /// Build a host with explicit backends and command runner
    pub fn with_backends(
        packages: Option<PackageBackend>,
        services: Option<ServiceBackend>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        LocalHost {
            packages,
            services,
            os: None,
            runner,
        }
    }
}

impl Host for LocalHost {
    fn package(&self, name: &str) -> Result<PackageInfo, HostcheckError> {
        let backend = self.packages.ok_or_else(|| {
            HostcheckError::Unsupported("no supported package manager found".to_string())
        })?;

        let info = backend.query(self.runner.as_ref(), name)?;
        debug!(package = name, backend = %backend, installed = info.installed, "package queried");
        Ok(info)
    }

    fn service(&self, name: &str) -> Result<ServiceStatus, HostcheckError> {
        let backend = self.services.ok_or_else(|| {
            HostcheckError::Unsupported("no supported service manager found".to_string())
        })?;

        let status = backend.query(self.runner.as_ref(), name)?;
        debug!(
            service = name,
            backend = %backend,
            installed = status.installed,
            enabled = status.enabled,
            running = status.running,
            "service queried"
        );
        Ok(status)
    }

    fn os_description(&self) -> Option<String> {
        self.os.clone()
    }
}
