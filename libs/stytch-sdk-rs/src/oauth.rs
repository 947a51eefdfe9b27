//! OAuth callback token exchange.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stytch_types::{Session, User};

use crate::error::StytchError;
use crate::request::{Method, RequestConfig, Requester};

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthenticateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_jwt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_custom_claims: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
}

/// Tokens issued by the identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderValues {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    /// Unix timestamp, as reported by the provider.
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateResponse {
    pub status_code: u16,
    pub request_id: String,
    pub user_id: String,
    pub user: User,
    pub oauth_user_registration_id: String,
    pub provider_subject: String,
    pub provider_type: String,
    pub session_token: Option<String>,
    pub session_jwt: Option<String>,
    pub session: Option<Session>,
    #[serde(default)]
    pub provider_values: ProviderValues,
    #[serde(default)]
    pub reset_sessions: bool,
}

#[derive(Serialize)]
struct AuthenticateBody<'a> {
    token: &'a str,
    #[serde(flatten)]
    data: Option<&'a AuthenticateRequest>,
}

/// OAuth endpoints, rooted at `oauth`.
#[derive(Clone)]
pub struct OAuth {
    requester: Requester,
}

impl OAuth {
    pub const BASE_PATH: &'static str = "oauth";

    pub(crate) fn new(requester: Requester) -> Self {
        Self { requester }
    }

    /// Exchanges the token from an OAuth callback for the user (and
    /// optionally a session).
    pub async fn authenticate(
        &self,
        token: &str,
        data: Option<&AuthenticateRequest>,
    ) -> Result<AuthenticateResponse, StytchError> {
        let body = AuthenticateBody { token, data };
        let request = RequestConfig::new(Method::Post, format!("{}/authenticate", Self::BASE_PATH))
            .json(&body)?;
        self.requester.request(request).await
    }
}
