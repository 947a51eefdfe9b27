//! Rust SDK for the Stytch authentication API.
//!
//! Every call goes through the same pipeline: the [`Requester`] resolves the
//! target URL against the configured base URL, hands the request to a
//! [`Transport`], classifies the response by status and maps successful
//! bodies onto typed entities.
//!
//! # Features
//!
//! - **Typed entities** - timestamps are parsed, authentication factors and
//!   password migrations are modelled as closed unions
//! - **Uniform errors** - every failure is a [`StytchError`]
//! - **Pluggable transport** - [`ReqwestTransport`] by default, anything
//!   implementing [`Transport`] for tests or custom stacks
//!
//! # Example
//!
//! ```rust,ignore
//! use stytch_sdk::{ClientConfig, StytchClient};
//! use stytch_sdk::passwords::StrengthCheckRequest;
//!
//! let client = StytchClient::new(ClientConfig::new("project-test-...", "secret-test-..."))?;
//!
//! let check = client
//!     .passwords
//!     .strength_check(&StrengthCheckRequest {
//!         email: None,
//!         password: "correct horse battery staple".to_string(),
//!     })
//!     .await?;
//! println!("valid: {}", check.valid_password);
//! ```

mod client;
mod error;
pub mod oauth;
pub mod passwords;
mod request;
mod transport;

pub use client::{ClientConfig, DEFAULT_TIMEOUT, Environment, StytchClient};
pub use error::{ClientError, ErrorKind, RequestError, StytchError};
pub use request::{FetchConfig, Method, NonFiniteParam, ParamValue, RequestConfig, Requester};
pub use tokio_util::sync::CancellationToken;
pub use transport::{
    DEFAULT_CONNECT_TIMEOUT, OutboundRequest, RawResponse, ReqwestTransport, Transport,
    TransportError, try_build_client,
};

// Re-export shared types for convenience
pub use stytch_types::{
    ApiError, Argon2Config, Attributes, AuthenticationFactor, AuthenticatorAppFactor,
    BiometricFactor, CryptoWallet, CryptoWalletFactor, DeliveryMethod, Email, EmailFactor,
    FactorDetails, MigrateRequest, Name, OAuthFactor, OAuthProvider, Password, PhoneNumber,
    PhoneNumberFactor, RecoveryCodeFactor, SaltConfig, ScryptConfig, Session, Totp, User,
    UserMetadata, WebAuthnFactor, WebAuthnRegistration,
};
