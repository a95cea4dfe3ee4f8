//! Service controls.

use crate::platform::Host;
use crate::{AssertionOutcome, HostcheckError, Matcher, Resource};
use tracing::warn;

const SERVICE_MATCHERS: [Matcher; 3] = [Matcher::Installed, Matcher::Enabled, Matcher::Running];

/// Assert that service `name` is installed, enabled at boot and running.
///
/// Produces one outcome per sub-condition, in that order, so a failure
/// names exactly which of them did not hold. An empty name fails fast with
/// a configuration error before the service manager is queried.
pub fn assert_service_installed_enabled_running(
    host: &dyn Host,
    name: &str,
) -> Result<Vec<AssertionOutcome>, HostcheckError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HostcheckError::Config("service name must not be empty".to_string()));
    }

    let resource = Resource::Service(name.to_string());

    let status = match host.service(name) {
        Ok(status) => status,
        Err(e) => {
            warn!(service = name, error = %e, "service query failed");
            return Ok(SERVICE_MATCHERS
                .iter()
                .map(|matcher| AssertionOutcome::errored(resource.clone(), *matcher, &e))
                .collect());
        }
    };

    Ok(vec![
        AssertionOutcome::new(resource.clone(), Matcher::Installed, status.installed),
        AssertionOutcome::new(resource.clone(), Matcher::Enabled, status.enabled),
        AssertionOutcome::new(resource, Matcher::Running, status.running),
    ])
}
