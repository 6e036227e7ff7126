//! Client library for the Pantheon Customer Secrets API.
//!
//! Lists, creates/updates, and deletes named secrets scoped to a
//! workspace (a site or an organization). The interesting part is the
//! write path: the service signals "already exists" with a 400 telling
//! the caller to PATCH, and [`SecretsClient::set_secret`] recovers from
//! that with a single update retry.
//!
//! Argument handling, output formatting, and session bootstrapping
//! belong to the embedding front end; this crate takes a ready session
//! token and an [`ApiTransport`] (real HTTP by default, injectable for
//! tests).

pub mod config;
pub mod error;
pub mod logging;
pub mod secrets;
pub mod transport;

pub use config::Config;
pub use error::SecretsError;
pub use secrets::{Secret, SecretsClient, Workspace, WorkspaceKind};
pub use transport::{ApiResponse, ApiTransport, HttpTransport, Method, RequestOptions, TransportError};
