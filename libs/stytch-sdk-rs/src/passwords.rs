//! Password authentication endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stytch_types::{Attributes, MigrateRequest, Session, User};

use crate::error::StytchError;
use crate::request::{Method, RequestConfig, Requester};

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_custom_claims: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    pub status_code: u16,
    pub request_id: String,
    pub user_id: String,
    pub user: User,
    pub email_id: String,
    pub session_token: Option<String>,
    pub session_jwt: Option<String>,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_jwt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_custom_claims: Option<Map<String, Value>>,
}

/// Response shared by every call that authenticates a user and may mint a
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateResponse {
    pub status_code: u16,
    pub request_id: String,
    pub user_id: String,
    pub user: User,
    pub session_token: Option<String>,
    pub session_jwt: Option<String>,
    pub session: Option<Session>,
}

pub type ResetByEmailResponse = AuthenticateResponse;
pub type ResetByExistingPasswordResponse = AuthenticateResponse;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetByEmailStartRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_password_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_password_expiration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetByEmailStartResponse {
    pub status_code: u16,
    pub request_id: String,
    pub user_id: String,
    pub email_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_match_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent_match_required: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetByEmailRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ResetOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
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

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetByExistingPasswordRequest {
    pub email: String,
    pub existing_password: String,
    pub new_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_jwt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_custom_claims: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetBySessionRequest {
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_jwt: Option<String>,
}

/// Unlike the other reset flows, a session reset always returns the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetBySessionResponse {
    pub status_code: u16,
    pub request_id: String,
    pub user_id: String,
    pub user: User,
    pub session: Session,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StrengthCheckRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrengthFeedback {
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub warning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrengthCheckResponse {
    pub status_code: u16,
    pub request_id: String,
    pub valid_password: bool,
    pub score: f64,
    pub breached_password: bool,
    #[serde(default)]
    pub feedback: StrengthFeedback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateResponse {
    pub status_code: u16,
    pub request_id: String,
    pub user_id: String,
    pub email_id: String,
    pub user_created: bool,
}

#[derive(Serialize)]
struct ResetByEmailBody<'a> {
    token: &'a str,
    password: &'a str,
    #[serde(flatten)]
    data: Option<&'a ResetByEmailRequest>,
}

/// Password endpoints, rooted at `passwords`.
#[derive(Clone)]
pub struct Passwords {
    requester: Requester,
}

impl Passwords {
    pub const BASE_PATH: &'static str = "passwords";

    pub(crate) fn new(requester: Requester) -> Self {
        Self { requester }
    }

    fn endpoint(path: &str) -> String {
        format!("{}/{}", Self::BASE_PATH, path)
    }

    pub async fn create(&self, data: &CreateRequest) -> Result<CreateResponse, StytchError> {
        let request = RequestConfig::new(Method::Post, Self::BASE_PATH).json(data)?;
        self.requester.request(request).await
    }

    pub async fn authenticate(
        &self,
        data: Option<&AuthenticateRequest>,
    ) -> Result<AuthenticateResponse, StytchError> {
        let mut request = RequestConfig::new(Method::Post, Self::endpoint("authenticate"));
        if let Some(data) = data {
            request = request.json(data)?;
        }
        self.requester.request(request).await
    }

    pub async fn reset_by_email_start(
        &self,
        data: &ResetByEmailStartRequest,
    ) -> Result<ResetByEmailStartResponse, StytchError> {
        let request =
            RequestConfig::new(Method::Post, Self::endpoint("email/reset/start")).json(data)?;
        self.requester.request(request).await
    }

    /// Completes an email reset; `data` fields are merged beside `token` and `password`.
    pub async fn reset_by_email(
        &self,
        token: &str,
        password: &str,
        data: Option<&ResetByEmailRequest>,
    ) -> Result<ResetByEmailResponse, StytchError> {
        let body = ResetByEmailBody {
            token,
            password,
            data,
        };
        let request = RequestConfig::new(Method::Post, Self::endpoint("email/reset")).json(&body)?;
        self.requester.request(request).await
    }

    pub async fn reset_by_existing_password(
        &self,
        data: &ResetByExistingPasswordRequest,
    ) -> Result<ResetByExistingPasswordResponse, StytchError> {
        let request = RequestConfig::new(Method::Post, Self::endpoint("existing_password/reset"))
            .json(data)?;
        self.requester.request(request).await
    }

    pub async fn reset_by_session(
        &self,
        data: &ResetBySessionRequest,
    ) -> Result<ResetBySessionResponse, StytchError> {
        let request =
            RequestConfig::new(Method::Post, Self::endpoint("session/reset")).json(data)?;
        self.requester.request(request).await
    }

    pub async fn strength_check(
        &self,
        data: &StrengthCheckRequest,
    ) -> Result<StrengthCheckResponse, StytchError> {
        let request =
            RequestConfig::new(Method::Post, Self::endpoint("strength_check")).json(data)?;
        self.requester.request(request).await
    }

    /// Imports a user together with an existing password hash.
    pub async fn migrate(&self, data: &MigrateRequest) -> Result<MigrateResponse, StytchError> {
        let request = RequestConfig::new(Method::Post, Self::endpoint("migrate")).json(data)?;
        self.requester.request(request).await
    }
}
