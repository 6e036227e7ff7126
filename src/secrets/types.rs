//! Data model for workspace-scoped secrets.
//!
//! The service's wire representation is decoded through typed structs and
//! one normalization function; absent override maps become empty maps and
//! withheld values become `None` rather than ad hoc field probing at call
//! sites.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Workspace
// ============================================================================

/// The kind of workspace owning a set of secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceKind {
    Site,
    Org,
}

impl WorkspaceKind {
    /// URL path segment for this workspace kind.
    pub fn path_segment(&self) -> &'static str {
        match self {
            WorkspaceKind::Site => "sites",
            WorkspaceKind::Org => "org",
        }
    }

    /// Whether org-level overrides are meaningful for this kind.
    pub fn supports_org_values(&self) -> bool {
        matches!(self, WorkspaceKind::Site)
    }
}

/// A site or organization, the scoping unit that owns secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub kind: WorkspaceKind,
}

impl Workspace {
    pub fn site(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: WorkspaceKind::Site,
        }
    }

    pub fn org(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: WorkspaceKind::Org,
        }
    }
}

// ============================================================================
// Secret Record
// ============================================================================

/// A secret as held by the service, normalized for callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Secret {
    /// Name, unique within the owning workspace.
    pub name: String,
    /// Server-defined classification tag.
    #[serde(rename = "type")]
    pub secret_type: Option<String>,
    /// Base value; the service may withhold it in list responses.
    pub value: Option<String>,
    /// Tags controlling where the secret is exposed.
    pub scopes: Vec<String>,
    /// Per-environment value overrides, keyed by environment name.
    pub env_values: HashMap<String, String>,
    /// Per-organization value overrides; empty for org workspaces.
    pub org_values: HashMap<String, String>,
}

// ============================================================================
// Wire Types
// ============================================================================

/// One secret entry as returned by the list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct WireSecret {
    #[serde(rename = "Type")]
    pub secret_type: Option<String>,
    #[serde(rename = "Value")]
    pub value: Option<String>,
    #[serde(rename = "Scopes")]
    pub scopes: Option<Vec<String>>,
    #[serde(rename = "EnvValues")]
    pub env_values: Option<HashMap<String, String>>,
    #[serde(rename = "OrgValues")]
    pub org_values: Option<HashMap<String, String>>,
}

/// Envelope of the list endpoint, keyed by secret name.
#[derive(Debug, Deserialize)]
pub(crate) struct ListSecretsResponse {
    #[serde(rename = "Secrets", default)]
    pub secrets: HashMap<String, WireSecret>,
}

/// Convert one wire entry into the internal record.
///
/// `org_values` is populated only for workspace kinds that support it;
/// anything the service sent for an org workspace is discarded.
pub(crate) fn normalize_secret(name: &str, wire: WireSecret, kind: WorkspaceKind) -> Secret {
    Secret {
        name: name.to_string(),
        secret_type: wire.secret_type,
        value: wire.value,
        scopes: wire.scopes.unwrap_or_default(),
        env_values: wire.env_values.unwrap_or_default(),
        org_values: if kind.supports_org_values() {
            wire.org_values.unwrap_or_default()
        } else {
            HashMap::new()
        },
    }
}
