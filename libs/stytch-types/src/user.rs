use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata attached to a user.
pub type UserMetadata = Map<String, Value>;

/// A Stytch user as returned in API responses.
///
/// `created_at` arrives as an ISO 8601 string and is exposed as a typed
/// instant. Fields this crate does not model are kept in `extra`, here and
/// in every nested element.
///
/// `password` and the two metadata objects are always present on the wire
/// and may be `null`; they are encoded back as `null` rather than omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub name: Name,
    #[serde(default)]
    pub emails: Vec<Email>,
    #[serde(default)]
    pub password: Option<Password>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default)]
    pub providers: Vec<OAuthProvider>,
    #[serde(default)]
    pub webauthn_registrations: Vec<WebAuthnRegistration>,
    #[serde(default)]
    pub totps: Vec<Totp>,
    #[serde(default)]
    pub crypto_wallets: Vec<CryptoWallet>,
    #[serde(default)]
    pub trusted_metadata: Option<UserMetadata>,
    #[serde(default)]
    pub untrusted_metadata: Option<UserMetadata>,

    /// Wire fields not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub email_id: String,
    pub email: String,
    pub verified: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub phone_id: String,
    pub phone_number: String,
    pub verified: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAuthnRegistration {
    pub webauthn_registration_id: String,
    pub domain: String,
    pub user_agent: String,
    pub verified: bool,
    pub authenticator_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An authenticator-app (TOTP) registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totp {
    pub totp_id: String,
    pub verified: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Password {
    pub password_id: String,
    pub requires_reset: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoWallet {
    pub crypto_wallet_id: String,
    pub crypto_wallet_address: String,
    pub crypto_wallet_type: String,
    pub verified: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A link between a user and an OAuth identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthProvider {
    pub oauth_user_registration_id: String,
    pub provider_subject: String,
    pub provider_type: String,
    pub profile_picture_url: String,
    pub locale: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
