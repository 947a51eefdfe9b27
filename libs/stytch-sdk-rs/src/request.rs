//! Request/response pipeline.
//!
//! A [`RequestConfig`] is resolved against the shared [`FetchConfig`],
//! sent through a [`Transport`], decoded as JSON, classified by status code
//! and finally mapped onto the caller's response type.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use stytch_types::ApiError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use url::Url;

use crate::error::{RequestError, StytchError};
use crate::transport::{OutboundRequest, RawResponse, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Delete,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Delete => "DELETE",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

/// A NaN or infinite value has no query string form.
#[derive(Debug, Error)]
#[error("{0} is not a finite number")]
pub struct NonFiniteParam(pub f64);

impl TryFrom<f64> for ParamValue {
    type Error = NonFiniteParam;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        serde_json::Number::from_f64(value)
            .map(Self::Number)
            .ok_or(NonFiniteParam(value))
    }
}

/// Description of one outbound call, relative to the client's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub url: String,
    pub method: Method,
    pub params: Vec<(String, ParamValue)>,
    pub data: Option<Value>,
}

impl RequestConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            params: Vec::new(),
            data: None,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Appends a parameter whose conversion can fail, such as an `f64`.
    ///
    /// A value that cannot be converted is reported as a request failure for
    /// this descriptor.
    pub fn try_param<V>(self, key: impl Into<String>, value: V) -> Result<Self, StytchError>
    where
        V: TryInto<ParamValue>,
        V::Error: fmt::Display,
    {
        let key = key.into();
        match value.try_into() {
            Ok(value) => Ok(self.param(key, value)),
            Err(e) => Err(RequestError::new(
                format!("Invalid query parameter {key:?}: {e}"),
                self,
            )
            .into()),
        }
    }

    /// Attaches a JSON body.
    ///
    /// A body that cannot be represented as JSON is reported as a request
    /// failure for this descriptor.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, StytchError> {
        match serde_json::to_value(body) {
            Ok(value) => {
                self.data = Some(value);
                Ok(self)
            }
            Err(e) => Err(RequestError::new(
                format!("Unable to serialize request body: {e}"),
                self,
            )
            .into()),
        }
    }
}

/// Connection settings shared by every call a client makes.
///
/// Built once at client construction and never mutated afterwards.
#[derive(Clone)]
pub struct FetchConfig {
    pub base_url: Url,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values include credentials.
        f.debug_struct("FetchConfig")
            .field("base_url", &self.base_url.as_str())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FetchConfig {
    /// Resolves the descriptor's path and query parameters against the base URL.
    pub fn target_url(&self, request: &RequestConfig) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join(&request.url)?;
        if !request.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.params {
                pairs.append_pair(key, &value.to_string());
            }
        }
        Ok(url)
    }
}

/// Runs calls through a transport with a fixed configuration.
#[derive(Clone)]
pub struct Requester {
    config: Arc<FetchConfig>,
    transport: Arc<dyn Transport>,
}

impl Requester {
    pub fn new(config: Arc<FetchConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Performs one call and maps a successful payload onto `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: RequestConfig,
    ) -> Result<T, StytchError> {
        let value = self.execute(request.clone(), None).await?;
        normalize(value, request)
    }

    /// Like [`Requester::request`], aborting the transport step once `cancel` fires.
    pub async fn request_cancellable<T: DeserializeOwned>(
        &self,
        request: RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<T, StytchError> {
        let value = self.execute(request.clone(), Some(cancel)).await?;
        normalize(value, request)
    }

    async fn execute(
        &self,
        request: RequestConfig,
        cancel: Option<&CancellationToken>,
    ) -> Result<Value, StytchError> {
        let outbound = match self.outbound(&request) {
            Ok(outbound) => outbound,
            Err(message) => return Err(RequestError::new(message, request).into()),
        };

        let span = tracing::debug_span!(
            "stytch.request",
            http.method = %request.method,
            url = %outbound.url
        );

        let sent = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    result = self.transport.send(outbound).instrument(span) => Some(result),
                }
            }
            None => Some(self.transport.send(outbound).instrument(span).await),
        };

        let response = match sent {
            Some(Ok(response)) => response,
            Some(Err(e)) => {
                tracing::error!(error = %e, url = %request.url, "Stytch request failed");
                return Err(RequestError::new(e.to_string(), request).into());
            }
            None => {
                tracing::warn!(url = %request.url, "Stytch request cancelled");
                return Err(RequestError::new("request cancelled", request).into());
            }
        };

        classify(response, request)
    }

    fn outbound(&self, request: &RequestConfig) -> Result<OutboundRequest, String> {
        let url = self
            .config
            .target_url(request)
            .map_err(|e| format!("Invalid request URL {:?}: {e}", request.url))?;

        let mut headers = self.config.headers.clone();
        let body = match &request.data {
            Some(data) => {
                let bytes = serde_json::to_vec(data)
                    .map_err(|e| format!("Unable to serialize request body: {e}"))?;
                headers.retain(|name, _| !name.eq_ignore_ascii_case("content-type"));
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                Some(bytes)
            }
            None => None,
        };

        Ok(OutboundRequest {
            method: request.method,
            url,
            headers,
            timeout: self.config.timeout,
            body,
        })
    }
}

/// Decodes the body and decides between success and a structured API error.
fn classify(response: RawResponse, request: RequestConfig) -> Result<Value, StytchError> {
    let value: Value = match serde_json::from_slice(&response.body) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(status = response.status, error = %e, "Unparseable Stytch response");
            return Err(RequestError::new(
                format!("Unable to parse JSON response from server: {e}"),
                request,
            )
            .into());
        }
    };

    if response.status >= 400 {
        let error = ApiError::from_json(&value, response.status);
        tracing::warn!(
            status = error.status_code,
            request_id = %error.request_id,
            error_type = %error.error_type,
            "Stytch API error"
        );
        return Err(error.into());
    }

    Ok(value)
}

/// Maps a decoded success payload onto the declared response shape.
///
/// Timestamps become typed instants and union payloads are narrowed here.
fn normalize<T: DeserializeOwned>(value: Value, request: RequestConfig) -> Result<T, StytchError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(error = %e, url = %request.url, "Failed to map Stytch response");
        RequestError::new(format!("Unable to map response from server: {e}"), request).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Mutex;
    use stytch_types::Session;

    /// Replays one scripted outcome and records what it was asked to send.
    struct ScriptedTransport {
        outcome: Mutex<Option<Result<RawResponse, TransportError>>>,
        sent: Mutex<Vec<OutboundRequest>>,
    }

    impl ScriptedTransport {
        fn respond(status: u16, body: &str) -> Arc<Self> {
            Self::with(Ok(RawResponse {
                status,
                body: body.as_bytes().to_vec(),
            }))
        }

        fn with(outcome: Result<RawResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(outcome)),
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            self.outcome
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(TransportError::new("no scripted response")))
        }
    }

    /// Never completes.
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn send(&self, _request: OutboundRequest) -> Result<RawResponse, TransportError> {
            std::future::pending().await
        }
    }

    fn fetch_config() -> Arc<FetchConfig> {
        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), "test".to_string());
        headers.insert("content-type".to_string(), "text/plain".to_string());
        Arc::new(FetchConfig {
            base_url: Url::parse("https://test.stytch.com/v1/").unwrap(),
            headers,
            timeout: Duration::from_secs(5),
        })
    }

    #[derive(Debug, Deserialize)]
    struct MigrateResponse {
        user_id: String,
        user_created: bool,
    }

    #[tokio::test]
    async fn test_success_below_400() {
        let transport = ScriptedTransport::respond(
            201,
            r#"{"user_id":"u1","email_id":"e1","user_created":true,"status_code":201,"request_id":"r1"}"#,
        );
        let requester = Requester::new(fetch_config(), transport);

        let response: MigrateResponse = requester
            .request(RequestConfig::new(Method::Post, "passwords/migrate"))
            .await
            .unwrap();

        assert!(response.user_created);
        assert_eq!(response.user_id, "u1");
    }

    #[tokio::test]
    async fn test_status_400_is_api_error() {
        let transport = ScriptedTransport::respond(
            400,
            r#"{"status_code":400,"request_id":"r2","error_type":"invalid_email","error_message":"bad","error_url":"http://x"}"#,
        );
        let requester = Requester::new(fetch_config(), transport);

        let error = requester
            .request::<Value>(RequestConfig::new(Method::Post, "passwords"))
            .await
            .unwrap_err();

        let api = error.as_api().unwrap();
        assert_eq!(api.error_type, "invalid_email");
        assert_eq!(api.request_id, "r2");
        assert_eq!(api.error_url, "http://x");
    }

    #[tokio::test]
    async fn test_error_status_wins_over_success_shape() {
        let transport = ScriptedTransport::respond(
            500,
            r#"{"user_id":"u1","user_created":true,"status_code":200,"request_id":"r3"}"#,
        );
        let requester = Requester::new(fetch_config(), transport);

        let error = requester
            .request::<MigrateResponse>(RequestConfig::new(Method::Post, "passwords/migrate"))
            .await
            .unwrap_err();

        let api = error.as_api().unwrap();
        assert_eq!(api.status_code, 200);
        assert_eq!(api.error_type, "");
    }

    #[tokio::test]
    async fn test_transport_failure_carries_descriptor() {
        let transport = ScriptedTransport::with(Err(TransportError::new("connection refused")));
        let requester = Requester::new(fetch_config(), transport);
        let descriptor = RequestConfig::new(Method::Get, "users").param("limit", 10_u32);

        let error = requester
            .request::<Value>(descriptor.clone())
            .await
            .unwrap_err();

        match error {
            StytchError::Request(failure) => {
                assert_eq!(failure.message, "connection refused");
                assert_eq!(failure.request, descriptor);
                assert_eq!(failure.request.method, Method::Get);
                assert_eq!(failure.request.url, "users");
            }
            other => panic!("expected request failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_request_failure() {
        let transport = ScriptedTransport::respond(502, "<html>Bad Gateway</html>");
        let requester = Requester::new(fetch_config(), transport);

        let error = requester
            .request::<Value>(RequestConfig::new(Method::Get, "users"))
            .await
            .unwrap_err();

        match error {
            StytchError::Request(failure) => {
                assert!(
                    failure
                        .message
                        .starts_with("Unable to parse JSON response from server:")
                );
            }
            other => panic!("expected request failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_session_timestamps_are_typed() {
        #[derive(Deserialize)]
        struct SessionResponse {
            session: Session,
        }

        let body = json!({
            "status_code": 200,
            "request_id": "r4",
            "session": {
                "session_id": "s1",
                "user_id": "u1",
                "started_at": "2023-12-31T00:00:00Z",
                "last_accessed_at": "2023-12-31T12:00:00Z",
                "expires_at": "2024-01-01T00:00:00Z",
                "attributes": {},
                "authentication_factors": []
            }
        });
        let transport = ScriptedTransport::respond(200, &body.to_string());
        let requester = Requester::new(fetch_config(), transport);

        let response: SessionResponse = requester
            .request(RequestConfig::new(Method::Post, "sessions/authenticate"))
            .await
            .unwrap();

        assert_eq!(
            response.session.expires_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_unmappable_success_is_request_failure() {
        let transport = ScriptedTransport::respond(200, r#"{"user_id": 7}"#);
        let requester = Requester::new(fetch_config(), transport);

        let error = requester
            .request::<MigrateResponse>(RequestConfig::new(Method::Post, "passwords/migrate"))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), crate::ErrorKind::Request);
        assert!(error.to_string().contains("Unable to map response from server"));
    }

    #[tokio::test]
    async fn test_outbound_request_shape() {
        let transport = ScriptedTransport::respond(200, "{}");
        let requester = Requester::new(fetch_config(), transport.clone());

        let descriptor = RequestConfig::new(Method::Put, "users/user-1")
            .param("a", "b c")
            .param("n", 3_i64)
            .json(&json!({"name": {"first_name": "Ada"}}))
            .unwrap();
        let _: Value = requester.request(descriptor).await.unwrap();

        let sent = transport.sent.lock().unwrap();
        let outbound = &sent[0];
        assert_eq!(outbound.method, Method::Put);
        assert_eq!(
            outbound.url.as_str(),
            "https://test.stytch.com/v1/users/user-1?a=b+c&n=3"
        );
        assert_eq!(outbound.headers["Content-Type"], "application/json");
        assert!(!outbound.headers.contains_key("content-type"));
        assert_eq!(outbound.headers["User-Agent"], "test");
        assert_eq!(outbound.timeout, Duration::from_secs(5));
        let body: Value = serde_json::from_slice(outbound.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": {"first_name": "Ada"}}));
    }

    #[tokio::test]
    async fn test_fractional_param_in_query() {
        let transport = ScriptedTransport::respond(200, "{}");
        let requester = Requester::new(fetch_config(), transport.clone());

        let descriptor = RequestConfig::new(Method::Get, "users")
            .try_param("score", 0.5_f64)
            .unwrap()
            .try_param("limit", 10_i64)
            .unwrap();
        let _: Value = requester.request(descriptor).await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(
            sent[0].url.as_str(),
            "https://test.stytch.com/v1/users?score=0.5&limit=10"
        );
    }

    #[test]
    fn test_non_finite_param_is_request_failure() {
        let descriptor = RequestConfig::new(Method::Get, "users").param("limit", 10_i64);

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let error = descriptor
                .clone()
                .try_param("score", value)
                .unwrap_err();

            assert_eq!(error.kind(), crate::ErrorKind::Request);
            match error {
                StytchError::Request(failure) => {
                    assert!(failure.message.contains("score"));
                    assert!(failure.message.contains("not a finite number"));
                    assert_eq!(failure.request, descriptor);
                }
                other => panic!("expected request failure, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_no_body_without_data() {
        let transport = ScriptedTransport::respond(200, "{}");
        let requester = Requester::new(fetch_config(), transport.clone());

        let _: Value = requester
            .request(RequestConfig::new(Method::Get, "users/user-1"))
            .await
            .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert!(sent[0].body.is_none());
        assert_eq!(sent[0].headers["content-type"], "text/plain");
    }

    #[tokio::test]
    async fn test_cancellation_is_request_failure() {
        let requester = Requester::new(fetch_config(), Arc::new(HangingTransport));
        let token = CancellationToken::new();
        let descriptor = RequestConfig::new(Method::Post, "passwords/authenticate");

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let error = requester
            .request_cancellable::<Value>(descriptor.clone(), &token)
            .await
            .unwrap_err();

        match error {
            StytchError::Request(failure) => {
                assert_eq!(failure.message, "request cancelled");
                assert_eq!(failure.request, descriptor);
            }
            other => panic!("expected request failure, got {other:?}"),
        }
    }

    #[test]
    fn test_fetch_config_debug_hides_header_values() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Basic c2VjcmV0".to_string());
        let config = FetchConfig {
            base_url: Url::parse("https://test.stytch.com/v1/").unwrap(),
            headers,
            timeout: Duration::from_secs(1),
        };

        let debug = format!("{config:?}");
        assert!(debug.contains("Authorization"));
        assert!(!debug.contains("c2VjcmV0"));
    }
}
