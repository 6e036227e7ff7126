//! Client for the customer secrets service.
//!
//! List, create/update, and delete named secrets scoped to a workspace.
//! The write path resolves create-vs-update through the service's
//! conflict signal: a create that answers 400 with a body mentioning
//! `PATCH` means the secret already exists and is retried once as an
//! update.

use crate::config::{base_uri, Config};
use crate::error::SecretsError;
use crate::transport::{ApiResponse, ApiTransport, HttpTransport, Method, RequestOptions};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::types::{normalize_secret, ListSecretsResponse, Secret, Workspace};

// ============================================================================
// Request Bodies
// ============================================================================

/// Body of a create (POST) request.
#[derive(Debug, Serialize)]
struct CreateSecretBody<'a> {
    name: &'a str,
    value: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    secret_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scopes: Option<Vec<String>>,
}

/// Body of an update (PATCH) request.
///
/// The update endpoint rejects `name`, `type`, and `scopes`; they are
/// never part of this body. `env` is absent for base-value updates.
#[derive(Debug, Serialize)]
struct UpdateSecretBody<'a> {
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<&'a str>,
}

/// Body clearing one environment's override: an explicit null value.
#[derive(Debug, Serialize)]
struct ClearEnvValueBody<'a> {
    env: &'a str,
    value: Option<&'a str>,
}

// ============================================================================
// Conflict Signal
// ============================================================================

/// Whether a response is the service's "secret already exists" signal:
/// a 400 whose body tells the caller to use PATCH instead.
pub(crate) fn is_already_exists_conflict(response: &ApiResponse) -> bool {
    response.status_code == 400 && response.body.contains("PATCH")
}

/// Split a comma-delimited scope string into trimmed, non-empty tags.
fn parse_scopes(scopes: &str) -> Vec<String> {
    scopes
        .split(',')
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(String::from)
        .collect()
}

// ============================================================================
// Client
// ============================================================================

/// Accessor for workspace-scoped secrets.
///
/// Stateless between calls: one request per operation, plus at most the
/// single conflict retry in [`SecretsClient::set_secret`]. Concurrent
/// writers to the same secret race at the server.
pub struct SecretsClient {
    base_uri: String,
    session_token: String,
    transport: Box<dyn ApiTransport>,
}

impl SecretsClient {
    /// Build a client backed by the real HTTP transport.
    pub fn new(config: &Config, session_token: impl Into<String>) -> Result<Self, SecretsError> {
        Self::with_transport(config, session_token, Box::new(HttpTransport::new()))
    }

    /// Build a client with an injected transport.
    pub fn with_transport(
        config: &Config,
        session_token: impl Into<String>,
        transport: Box<dyn ApiTransport>,
    ) -> Result<Self, SecretsError> {
        Ok(Self {
            base_uri: base_uri(config)?,
            session_token: session_token.into(),
            transport,
        })
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), self.session_token.clone()),
        ]
    }

    /// Collection URL: `{base}/{wtype}/{id}/secrets`.
    fn secrets_url(&self, workspace: &Workspace) -> String {
        format!(
            "{}/{}/{}/secrets",
            self.base_uri,
            workspace.kind.path_segment(),
            workspace.id
        )
    }

    /// Single-secret URL: `{base}/{wtype}/{id}/secrets/{name}`.
    fn secret_url(&self, workspace: &Workspace, name: &str) -> String {
        format!("{}/{}", self.secrets_url(workspace), name)
    }

    /// List all secrets for a workspace, keyed by name.
    ///
    /// Site workspaces request `/showall` so org-level overrides are
    /// included. Non-2xx responses surface as [`SecretsError::Api`].
    pub async fn list_secrets(
        &self,
        workspace: &Workspace,
    ) -> Result<HashMap<String, Secret>, SecretsError> {
        let mut url = self.secrets_url(workspace);
        if workspace.kind.supports_org_values() {
            url.push_str("/showall");
        }

        let options = RequestOptions::new(Method::Get).headers(self.auth_headers());
        let response = self.transport.request(&url, options).await?;

        if response.is_error() {
            return Err(SecretsError::Api {
                status: response.status_code,
                body: response.body,
            });
        }

        let payload: ListSecretsResponse = serde_json::from_str(&response.body)?;
        let secrets = payload
            .secrets
            .into_iter()
            .map(|(name, wire)| {
                let secret = normalize_secret(&name, wire, workspace.kind);
                (name, secret)
            })
            .collect();
        Ok(secrets)
    }

    /// Create or update a secret, returning whether the write succeeded.
    ///
    /// Without `env_name` this POSTs a create; if the service answers
    /// with the already-exists conflict signal and the request carried
    /// neither `secret_type` nor `scopes`, the write is reissued once as
    /// a PATCH to the secret's own URL with `name` dropped from the
    /// body. With `env_name` the PATCH path is taken directly and no
    /// retry ever happens.
    ///
    /// Ordinary API failures are `Ok(false)`; only transport failures
    /// and malformed inputs are `Err`.
    pub async fn set_secret(
        &self,
        workspace: &Workspace,
        name: &str,
        value: &str,
        env_name: Option<&str>,
        secret_type: Option<&str>,
        scopes: Option<&str>,
    ) -> Result<bool, SecretsError> {
        let secret_type = secret_type.filter(|t| !t.is_empty());
        let scopes = scopes
            .map(parse_scopes)
            .filter(|parsed| !parsed.is_empty());

        let (url, options) = if let Some(env) = env_name {
            // The per-environment update endpoint takes `{value, env}`
            // only; name/type/scopes are rejected there.
            let body = serde_json::to_value(UpdateSecretBody {
                value,
                env: Some(env),
            })?;
            (
                self.secret_url(workspace, name),
                RequestOptions::new(Method::Patch)
                    .headers(self.auth_headers())
                    .json(body),
            )
        } else {
            let body = serde_json::to_value(CreateSecretBody {
                name,
                value,
                secret_type,
                scopes: scopes.clone(),
            })?;
            (
                self.secrets_url(workspace),
                RequestOptions::new(Method::Post)
                    .headers(self.auth_headers())
                    .json(body),
            )
        };

        debug!(
            "Writing secret '{}' in {}/{}",
            name,
            workspace.kind.path_segment(),
            workspace.id
        );
        let response = self.transport.request(&url, options).await?;

        // The conflict signal only fires from the create path, and the
        // update endpoint rejects type/scopes, so a create that carried
        // either is final.
        if env_name.is_none()
            && is_already_exists_conflict(&response)
            && secret_type.is_none()
            && scopes.is_none()
        {
            warn!("Secret '{name}' already exists, retrying as update");
            let body = serde_json::to_value(UpdateSecretBody { value, env: None })?;
            let retry = RequestOptions::new(Method::Patch)
                .headers(self.auth_headers())
                .json(body);
            let response = self
                .transport
                .request(&self.secret_url(workspace, name), retry)
                .await?;
            return Ok(!response.is_error());
        }

        Ok(!response.is_error())
    }

    /// Delete a secret, or clear one environment's override of it.
    ///
    /// Without `env_name` the whole record is deleted. With `env_name`
    /// the environment's override is cleared by PATCHing an explicit
    /// null value. Any error response raises [`SecretsError::Api`]
    /// carrying the server's stated reason.
    pub async fn delete_secret(
        &self,
        workspace: &Workspace,
        name: &str,
        env_name: Option<&str>,
    ) -> Result<(), SecretsError> {
        let url = self.secret_url(workspace, name);

        let options = match env_name {
            Some(env) => {
                // A null value deletes the secret for the given env.
                let body = serde_json::to_value(ClearEnvValueBody { env, value: None })?;
                RequestOptions::new(Method::Patch)
                    .headers(self.auth_headers())
                    .json(body)
            }
            None => RequestOptions::new(Method::Delete).headers(self.auth_headers()),
        };

        debug!(
            "Deleting secret '{}' in {}/{} (env: {:?})",
            name,
            workspace.kind.path_segment(),
            workspace.id,
            env_name
        );
        let response = self.transport.request(&url, options).await?;

        if response.is_error() {
            return Err(SecretsError::Api {
                status: response.status_code,
                body: response.failure_reason(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// In-memory transport: canned responses in, recorded requests out.
    struct FakeTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        requests: Mutex<Vec<(String, RequestOptions)>>,
    }

    impl FakeTransport {
        fn new(responses: Vec<(u16, &str)>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(status_code, body)| ApiResponse {
                            status_code,
                            body: body.to_string(),
                        })
                        .collect(),
                ),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded(&self) -> Vec<(String, RequestOptions)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ApiTransport for FakeTransport {
        async fn request(
            &self,
            url: &str,
            options: RequestOptions,
        ) -> Result<ApiResponse, TransportError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), options));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TransportError::new("no canned response left"))
        }
    }

    fn client_with(transport: &std::sync::Arc<FakeTransport>) -> SecretsClient {
        SecretsClient::with_transport(
            &Config::default(),
            "session-token",
            Box::new(SharedTransport(transport.clone())),
        )
        .unwrap()
    }

    /// Lets a test keep a handle to the fake while the client owns a box.
    struct SharedTransport(std::sync::Arc<FakeTransport>);

    #[async_trait]
    impl ApiTransport for SharedTransport {
        async fn request(
            &self,
            url: &str,
            options: RequestOptions,
        ) -> Result<ApiResponse, TransportError> {
            self.0.request(url, options).await
        }
    }

    #[test]
    fn scope_string_is_split_and_trimmed() {
        assert_eq!(parse_scopes("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn scope_string_drops_empty_elements() {
        assert_eq!(parse_scopes("a,,b,"), vec!["a", "b"]);
        assert!(parse_scopes("").is_empty());
        assert!(parse_scopes(" , ").is_empty());
    }

    #[test]
    fn conflict_signal_requires_400_and_patch_marker() {
        let conflict = ApiResponse {
            status_code: 400,
            body: "secret exists, use PATCH to update".to_string(),
        };
        assert!(is_already_exists_conflict(&conflict));

        let plain_400 = ApiResponse {
            status_code: 400,
            body: "invalid value".to_string(),
        };
        assert!(!is_already_exists_conflict(&plain_400));

        let wrong_status = ApiResponse {
            status_code: 409,
            body: "use PATCH".to_string(),
        };
        assert!(!is_already_exists_conflict(&wrong_status));
    }

    #[tokio::test]
    async fn create_conflict_retries_once_as_update() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![
            (400, "secret exists, use PATCH"),
            (200, "{}"),
        ]));
        let client = client_with(&fake);

        let ok = client
            .set_secret(&Workspace::org("org1"), "FOO", "bar", None, None, None)
            .await
            .unwrap();
        assert!(ok);

        let requests = fake.recorded();
        assert_eq!(requests.len(), 2);

        let (create_url, create) = &requests[0];
        assert!(create_url.ends_with("/org/org1/secrets"));
        assert_eq!(create.method, Method::Post);
        assert_eq!(
            create.json.as_ref().unwrap(),
            &serde_json::json!({"name": "FOO", "value": "bar"})
        );

        // Retried as PATCH to the secret's own URL, name dropped and no
        // env key since none was supplied.
        let (retry_url, retry) = &requests[1];
        assert!(retry_url.ends_with("/org/org1/secrets/FOO"));
        assert_eq!(retry.method, Method::Patch);
        assert_eq!(
            retry.json.as_ref().unwrap(),
            &serde_json::json!({"value": "bar"})
        );
    }

    #[tokio::test]
    async fn create_with_type_does_not_retry_on_conflict() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![(400, "use PATCH")]));
        let client = client_with(&fake);

        let ok = client
            .set_secret(
                &Workspace::org("org1"),
                "FOO",
                "bar",
                None,
                Some("env"),
                None,
            )
            .await
            .unwrap();
        assert!(!ok);
        assert_eq!(fake.recorded().len(), 1);
    }

    #[tokio::test]
    async fn create_with_scopes_does_not_retry_on_conflict() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![(400, "use PATCH")]));
        let client = client_with(&fake);

        let ok = client
            .set_secret(
                &Workspace::org("org1"),
                "FOO",
                "bar",
                None,
                None,
                Some("web, user"),
            )
            .await
            .unwrap();
        assert!(!ok);

        let requests = fake.recorded();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].1.json.as_ref().unwrap(),
            &serde_json::json!({
                "name": "FOO",
                "value": "bar",
                "scopes": ["web", "user"]
            })
        );
    }

    #[tokio::test]
    async fn empty_type_and_scopes_behave_as_absent() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![
            (400, "use PATCH"),
            (200, "{}"),
        ]));
        let client = client_with(&fake);

        let ok = client
            .set_secret(
                &Workspace::org("org1"),
                "FOO",
                "bar",
                None,
                Some(""),
                Some(" , "),
            )
            .await
            .unwrap();
        assert!(ok);

        let requests = fake.recorded();
        assert_eq!(requests.len(), 2, "empty strings must not block the retry");
        assert_eq!(
            requests[0].1.json.as_ref().unwrap(),
            &serde_json::json!({"name": "FOO", "value": "bar"})
        );
    }

    #[tokio::test]
    async fn env_write_patches_directly_and_never_retries() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![(400, "use PATCH")]));
        let client = client_with(&fake);

        let ok = client
            .set_secret(
                &Workspace::site("abc"),
                "FOO",
                "bar",
                Some("live"),
                None,
                None,
            )
            .await
            .unwrap();
        assert!(!ok);

        let requests = fake.recorded();
        assert_eq!(requests.len(), 1);

        let (url, options) = &requests[0];
        assert!(url.ends_with("/sites/abc/secrets/FOO"));
        assert_eq!(options.method, Method::Patch);
        assert_eq!(
            options.json.as_ref().unwrap(),
            &serde_json::json!({"value": "bar", "env": "live"})
        );
    }

    #[tokio::test]
    async fn requests_carry_accept_and_authorization() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![(201, "{}")]));
        let client = client_with(&fake);

        client
            .set_secret(&Workspace::org("org1"), "FOO", "bar", None, None, None)
            .await
            .unwrap();

        let requests = fake.recorded();
        let headers = &requests[0].1.headers;
        assert!(headers.contains(&("Accept".to_string(), "application/json".to_string())));
        assert!(headers.contains(&("Authorization".to_string(), "session-token".to_string())));
    }

    #[tokio::test]
    async fn delete_env_override_sends_explicit_null() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![(200, "{}")]));
        let client = client_with(&fake);

        client
            .delete_secret(&Workspace::site("abc"), "FOO", Some("live"))
            .await
            .unwrap();

        let requests = fake.recorded();
        assert_eq!(requests.len(), 1);

        let (url, options) = &requests[0];
        assert!(url.ends_with("/sites/abc/secrets/FOO"));
        assert_eq!(options.method, Method::Patch, "env delete must not DELETE");

        let body = options.json.as_ref().unwrap();
        assert_eq!(body["env"], "live");
        assert!(body.get("value").is_some(), "value key must be present");
        assert_eq!(body["value"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn delete_whole_record_uses_delete() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![(204, "")]));
        let client = client_with(&fake);

        client
            .delete_secret(&Workspace::site("abc"), "FOO", None)
            .await
            .unwrap();

        let requests = fake.recorded();
        assert_eq!(requests[0].1.method, Method::Delete);
        assert!(requests[0].1.json.is_none());
    }

    #[tokio::test]
    async fn delete_failure_carries_server_reason() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![(404, "secret not found")]));
        let client = client_with(&fake);

        let err = client
            .delete_secret(&Workspace::site("abc"), "FOO", None)
            .await
            .unwrap_err();
        match err {
            SecretsError::Api { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "secret not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_url_includes_showall_for_sites_only() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![
            (200, r#"{"Secrets": {}}"#),
            (200, r#"{"Secrets": {}}"#),
        ]));
        let client = client_with(&fake);

        client.list_secrets(&Workspace::site("abc")).await.unwrap();
        client.list_secrets(&Workspace::org("org1")).await.unwrap();

        let requests = fake.recorded();
        assert!(requests[0].0.ends_with("/sites/abc/secrets/showall"));
        assert!(requests[1].0.ends_with("/org/org1/secrets"));
        assert_eq!(requests[0].1.method, Method::Get);
    }

    #[tokio::test]
    async fn list_error_propagates_status_and_body() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![(403, "forbidden")]));
        let client = client_with(&fake);

        let err = client
            .list_secrets(&Workspace::site("abc"))
            .await
            .unwrap_err();
        match err {
            SecretsError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
