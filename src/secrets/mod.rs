mod client;
mod types;

pub use client::SecretsClient;
pub use types::{Secret, Workspace, WorkspaceKind};
