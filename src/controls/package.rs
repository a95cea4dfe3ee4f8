//! Package controls.

use crate::platform::Host;
use crate::{AssertionOutcome, HostcheckError, Matcher, Resource};
use tracing::warn;

/// Assert that package `name` is installed on `host`.
///
/// Produces a single `be_installed` outcome. A host query error is reported
/// as a failed outcome carrying the error text; an empty name is a
/// configuration error and the host is never queried.
pub fn assert_package_installed(
    host: &dyn Host,
    name: &str,
) -> Result<Vec<AssertionOutcome>, HostcheckError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HostcheckError::Config("package name must not be empty".to_string()));
    }

    let resource = Resource::Package(name.to_string());

    let outcome = match host.package(name) {
        Ok(info) => AssertionOutcome::new(resource, Matcher::Installed, info.installed),
        Err(e) => {
            warn!(package = name, error = %e, "package query failed");
            AssertionOutcome::errored(resource, Matcher::Installed, &e)
        }
    };

    Ok(vec![outcome])
}
