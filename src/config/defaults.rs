/// Default configuration constants used across the system.

/// Default request protocol.
pub const DEFAULT_PROTOCOL: &str = "https";

/// Default request port.
pub const DEFAULT_PORT: u16 = 443;

/// Default API host when neither an override nor a derivable host is set.
pub const DEFAULT_API_HOST: &str = "api.pantheon.io";

/// Substring marking a sandbox dashboard host.
pub const SANDBOX_HOST_MARKER: &str = "hermes.sandbox-";

/// Subdomain replaced when deriving the API host from a sandbox host.
pub const SANDBOX_SUBDOMAIN: &str = "hermes";

/// Subdomain serving the API on sandbox installations.
pub const API_SUBDOMAIN: &str = "pantheonapi";

/// Path prefix of the customer secrets service.
pub const SECRETS_API_PREFIX: &str = "customer-secrets/v1";
