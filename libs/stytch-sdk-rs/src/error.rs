use std::error::Error as StdError;

use stytch_types::ApiError;
use thiserror::Error;

use crate::request::RequestConfig;

/// SDK errors.
///
/// The three kinds are disjoint: a failure is reported as exactly one of
/// them and never wrapped into another.
#[derive(Debug, Error)]
pub enum StytchError {
    /// The call could not complete: transport failure, unreadable body, or a
    /// body that could not be mapped onto the expected response.
    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    /// The API answered with status >= 400.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The client itself is misconfigured.
    #[error("Configuration error: {0}")]
    Config(#[from] ClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Request,
    Api,
    Config,
}

impl StytchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(_) => ErrorKind::Request,
            Self::Api(_) => ErrorKind::Api,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// The structured API error, if the service reported one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }
}

/// A call that failed before a structured response was obtained.
///
/// Carries the originating request for diagnostics.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
    pub request: RequestConfig,
}

impl RequestError {
    pub fn new(message: impl Into<String>, request: RequestConfig) -> Self {
        Self {
            message: message.into(),
            request,
        }
    }
}

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Construction-time misconfiguration of the client.
#[derive(Debug, Error)]
#[error("{code}: {message}{}", cause_suffix(.cause))]
pub struct ClientError {
    pub code: &'static str,
    pub message: String,
    #[source]
    pub cause: Option<BoxError>,
}

impl ClientError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

fn cause_suffix(cause: &Option<BoxError>) -> String {
    cause
        .as_ref()
        .map(|cause| format!(": {cause}"))
        .unwrap_or_default()
}
