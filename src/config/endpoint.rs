//! Service base-address resolution.
//!
//! Pure configuration resolution: no network access, no side effects.
//! Override keys win, then a host derived from a sandbox dashboard host,
//! then the fixed default.

use super::defaults::{
    API_SUBDOMAIN, DEFAULT_API_HOST, SANDBOX_HOST_MARKER, SANDBOX_SUBDOMAIN, SECRETS_API_PREFIX,
};
use super::Config;
use crate::error::SecretsError;
use url::Url;

/// Resolve the secrets service base URI from configuration.
///
/// Produces `{protocol}://{host}:{port}/customer-secrets/v1`.
pub fn base_uri(config: &Config) -> Result<String, SecretsError> {
    let protocol = config
        .papi_protocol
        .as_deref()
        .unwrap_or(config.protocol.as_str());
    let port = config.papi_port.unwrap_or(config.port);
    let host = resolve_host(config);

    let base = format!("{protocol}://{host}:{port}/{SECRETS_API_PREFIX}");
    Url::parse(&base).map_err(|err| SecretsError::Configuration(format!("{base}: {err}")))?;
    Ok(base)
}

/// Pick the API host: explicit override, sandbox-derived, or default.
fn resolve_host(config: &Config) -> String {
    if let Some(host) = &config.papi_host {
        return host.clone();
    }

    if let Some(host) = &config.host {
        if host.contains(SANDBOX_HOST_MARKER) {
            return host.replace(SANDBOX_SUBDOMAIN, API_SUBDOMAIN);
        }
    }

    DEFAULT_API_HOST.to_string()
}
