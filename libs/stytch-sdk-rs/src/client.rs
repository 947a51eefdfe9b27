//! Stytch client implementation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{ClientError, StytchError};
use crate::oauth::OAuth;
use crate::passwords::Passwords;
use crate::request::{FetchConfig, RequestConfig, Requester};
use crate::transport::{ReqwestTransport, Transport, try_build_client};

/// Default per-request timeout (10 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const TEST_URL: &str = "https://test.stytch.com/v1/";
const LIVE_URL: &str = "https://api.stytch.com/v1/";

/// Which Stytch API the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Test,
    Live,
    /// Any other base URL, e.g. a local mock.
    Custom(String),
}

impl Environment {
    /// Live for `project-live-*` ids, Test otherwise.
    pub fn infer(project_id: &str) -> Self {
        if project_id.starts_with("project-live-") {
            Self::Live
        } else {
            Self::Test
        }
    }

    /// Parses `test`, `live`, or a base URL.
    pub fn parse(value: &str) -> Self {
        match value {
            "test" => Self::Test,
            "live" => Self::Live,
            other => Self::Custom(other.to_string()),
        }
    }

    fn base_url(&self) -> Result<Url, ClientError> {
        let raw = match self {
            Self::Test => TEST_URL,
            Self::Live => LIVE_URL,
            Self::Custom(url) => url.as_str(),
        };

        // Relative paths join beneath the base only when it ends in '/'.
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };

        Url::parse(&normalized).map_err(|e| {
            ClientError::new("invalid_env", format!("env {raw:?} is not a valid URL")).with_cause(e)
        })
    }
}

/// Configuration for the Stytch client.
#[derive(Debug)]
pub struct ClientConfig {
    /// Project ID from the Stytch dashboard (e.g., "project-test-...")
    pub project_id: String,

    /// Project secret
    pub secret: SecretString,

    /// API environment; inferred from the project ID when unset
    pub env: Option<Environment>,

    /// Per-request timeout (default: 10 minutes)
    pub timeout: Option<Duration>,

    /// Preconfigured HTTP client used for every call
    pub agent: Option<reqwest::Client>,
}

impl ClientConfig {
    pub fn new(project_id: impl Into<String>, secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        Self {
            project_id: project_id.into(),
            secret: SecretString::new(secret.into()),
            env: None,
            timeout: None,
            agent: None,
        }
    }

    /// Reads `STYTCH_PROJECT_ID`, `STYTCH_SECRET` and the optional
    /// `STYTCH_ENV` / `STYTCH_TIMEOUT_SECS`, honouring a `.env` file.
    pub fn from_env() -> Result<Self, ClientError> {
        let project_id = dotenvy::var("STYTCH_PROJECT_ID").map_err(|e| {
            ClientError::new("missing_project_id", "STYTCH_PROJECT_ID is not set").with_cause(e)
        })?;
        let secret = dotenvy::var("STYTCH_SECRET").map_err(|e| {
            ClientError::new("missing_secret", "STYTCH_SECRET is not set").with_cause(e)
        })?;

        let mut config = Self::new(project_id, secret);
        config.env = dotenvy::var("STYTCH_ENV").ok().map(|env| Environment::parse(&env));

        if let Ok(raw) = dotenvy::var("STYTCH_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|e| {
                ClientError::new(
                    "invalid_timeout",
                    format!("STYTCH_TIMEOUT_SECS {raw:?} is not a number of seconds"),
                )
                .with_cause(e)
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    fn fetch_config(&self) -> Result<FetchConfig, ClientError> {
        if self.project_id.is_empty() {
            return Err(ClientError::new(
                "missing_project_id",
                "project_id is required. Find it in the Stytch dashboard.",
            ));
        }

        if self.secret.expose_secret().is_empty() {
            return Err(ClientError::new("missing_secret", "secret is required"));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ClientError::new("invalid_timeout", "timeout must be non-zero"));
        }

        let env = self
            .env
            .clone()
            .unwrap_or_else(|| Environment::infer(&self.project_id));

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(
            "User-Agent".to_string(),
            format!("Stytch Rust v{}", env!("CARGO_PKG_VERSION")),
        );
        headers.insert("Authorization".to_string(), self.auth_header());

        Ok(FetchConfig {
            base_url: env.base_url()?,
            headers,
            timeout,
        })
    }

    fn auth_header(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.project_id,
            self.secret.expose_secret()
        ));
        format!("Basic {}", encoded)
    }
}

/// Stytch client for server-side calls.
///
/// Cheap to clone; clones share configuration and transport.
#[derive(Clone)]
pub struct StytchClient {
    requester: Requester,
    pub passwords: Passwords,
    pub oauth: OAuth,
}

impl StytchClient {
    /// Create a new Stytch client.
    ///
    /// # Returns
    /// A configured `StytchClient` or a configuration error.
    pub fn new(config: ClientConfig) -> Result<Self, StytchError> {
        let client = match &config.agent {
            Some(agent) => agent.clone(),
            None => try_build_client().map_err(|e| {
                ClientError::new("http_client", "Failed to build HTTP client").with_cause(e)
            })?,
        };

        Self::with_transport(config, Arc::new(ReqwestTransport::new(client)))
    }

    /// Create a client that sends every call through `transport`.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, StytchError> {
        let fetch_config = Arc::new(config.fetch_config()?);
        tracing::debug!(base_url = %fetch_config.base_url, "Stytch client configured");

        let requester = Requester::new(fetch_config, transport);

        Ok(Self {
            passwords: Passwords::new(requester.clone()),
            oauth: OAuth::new(requester.clone()),
            requester,
        })
    }

    pub fn fetch_config(&self) -> &FetchConfig {
        self.requester.config()
    }

    /// Performs an arbitrary call through the client's pipeline.
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: RequestConfig,
    ) -> Result<T, StytchError> {
        self.requester.request(request).await
    }

    /// Performs an arbitrary call, aborting it once `cancel` fires.
    pub async fn request_cancellable<T: DeserializeOwned>(
        &self,
        request: RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<T, StytchError> {
        self.requester.request_cancellable(request, cancel).await
    }
}
