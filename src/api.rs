// API client module: a small blocking HTTP client that talks to the
// ChainDB REST API. Host and token come from the injected stores on every
// call, so a `config` or `db connect` earlier in the same process is seen.

use crate::error::{CliError, CliResult};
use crate::store::{ConfigStore, CredentialStore};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const API_PREFIX: &str = "/api/v1/";
pub const TIMEOUT: Duration = Duration::from_secs(10);

pub fn user_agent() -> String {
    format!("ChainDB-CLI/{}", env!("CARGO_PKG_VERSION"))
}

/// The `{ success, message?, data? }` shape every endpoint answers with.
///
/// Built from any JSON value: a body that is not an object, or whose
/// `success` is not `true`, reads as a failed envelope.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "Value")]
pub struct Envelope {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl From<Value> for Envelope {
    fn from(value: Value) -> Self {
        let success = value.get("success").and_then(Value::as_bool).unwrap_or(false);
        let message = match value.get("message") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let data = match value.get("data") {
            Some(Value::Null) | None => None,
            Some(other) => Some(other.clone()),
        };
        Envelope {
            success,
            message,
            data,
        }
    }
}

/// Blocking client bound to a configuration store and a credential store.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ConfigStore,
    credentials: CredentialStore,
}

impl ApiClient {
    pub fn new(config: ConfigStore, credentials: CredentialStore) -> CliResult<Self> {
        Self::with_timeout(config, credentials, TIMEOUT)
    }

    /// Same as [`ApiClient::new`] with a custom per-request timeout.
    pub fn with_timeout(
        config: ConfigStore,
        credentials: CredentialStore,
        timeout: Duration,
    ) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CliError::Unknown(format!("Failed to build HTTP client: {e}")))?;
        Ok(ApiClient {
            client,
            config,
            credentials,
        })
    }

    /// Client over the files in the user's home directory.
    pub fn from_home() -> CliResult<Self> {
        Self::new(ConfigStore::from_home(), CredentialStore::from_home())
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// `<host>/api/v1/<endpoint>`.
    pub fn build_url(&self, endpoint: &str) -> String {
        let host = self.config.load().host;
        format!("{}{}{}", host.trim_end_matches('/'), API_PREFIX, endpoint)
    }

    /// The bare host, used for reachability probing.
    pub fn base_url(&self) -> String {
        self.config.load().host.trim_end_matches('/').to_string()
    }

    /// True if anything answers at `url` with a status below 500.
    pub fn probe(&self, url: &str) -> bool {
        let res = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent())
            .send();
        match res {
            Ok(res) => {
                debug!(url, status = res.status().as_u16(), "probe answered");
                res.status().as_u16() < 500
            }
            Err(e) => {
                debug!(url, error = %e, "probe failed");
                false
            }
        }
    }

    fn headers(&self, require_auth: bool) -> CliResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&user_agent())
            .map_err(|e| CliError::Unknown(e.to_string()))?;
        headers.insert(USER_AGENT, agent);
        if require_auth {
            let credential = self.credentials.load().ok_or(CliError::NotAuthenticated)?;
            // The server expects the opaque token itself after "Basic".
            let val = format!("Basic {}", credential.token);
            let val = HeaderValue::from_str(&val)
                .map_err(|_| CliError::validation("Stored authentication token is not a valid header value."))?;
            headers.insert(AUTHORIZATION, val);
        }
        Ok(headers)
    }

    /// Send one request and decode the JSON body as `T`.
    ///
    /// Authentication is checked before any I/O. Statuses >= 500 become
    /// [`CliError::Server`]; every other status is decoded as-is.
    pub fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        require_auth: bool,
    ) -> CliResult<T> {
        let headers = self.headers(require_auth)?;
        let url = self.build_url(endpoint);
        debug!(%method, %url, "sending request");

        let mut req = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            req = req.body(body.to_string());
        }

        let res = req.send().map_err(|e| classify(e, &url))?;
        let status = res.status();
        debug!(status = status.as_u16(), "response received");
        if status.is_server_error() {
            let text = status.canonical_reason().unwrap_or("Unknown status");
            return Err(CliError::Server(text.to_string()));
        }

        let parsed: T = res.json().map_err(|e| classify(e, &url))?;
        Ok(parsed)
    }
}

fn classify(err: reqwest::Error, url: &str) -> CliError {
    match CliError::from(err) {
        CliError::ConnectionRefused { .. } => CliError::ConnectionRefused {
            url: url.to_string(),
        },
        other => other,
    }
}
