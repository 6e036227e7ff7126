//! Failure classes for secrets API operations.

use crate::transport::TransportError;
use thiserror::Error;

/// Errors surfaced by the secrets client.
///
/// The "secret already exists" conflict signal is deliberately not a
/// variant here: `SecretsClient::set_secret` consumes it internally by
/// retrying as an update, and a successful retry is not a failure.
#[derive(Debug, Error)]
pub enum SecretsError {
    /// The service base address could not be resolved into a usable URL.
    #[error("secrets API base address is unusable: {0}")]
    Configuration(String),

    /// Connection-level failure, surfaced unmodified from the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A non-2xx response from the service, carrying its status and body.
    #[error("secrets API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    /// A 2xx response whose body could not be decoded.
    #[error("failed to decode secrets API response: {0}")]
    Decode(#[from] serde_json::Error),
}
