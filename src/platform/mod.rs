//! Platform abstraction layer.
//!
//! Provides consistent interfaces for:
//! - Package installation state (dpkg, rpm, pacman, apk)
//! - Service state (systemd, OpenRC)
//! - Linux host identity
//! - External command execution

pub mod command;
pub mod host;
pub mod linux;
pub mod package;
pub mod service;

pub use host::{Host, LocalHost};
pub use package::{PackageBackend, PackageInfo};
pub use service::{ServiceBackend, ServiceStatus};
