//! Authentication factors recorded on a session.
//!
//! Every factor shares an envelope (`delivery_method`, `type`,
//! `last_authenticated_at`) and, for most delivery methods, a nested payload
//! stored under a key derived from the delivery method (`email_factor`,
//! `google_oauth_factor`, ...). The payload is narrowed once, at decode time,
//! into [`FactorDetails`].

use std::fmt;
use std::mem;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Discriminator of an [`AuthenticationFactor`].
///
/// Values the service adds after this crate was written decode as
/// [`DeliveryMethod::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeliveryMethod {
    Email,
    Embedded,
    Sms,
    WhatsApp,
    OAuthGoogle,
    OAuthMicrosoft,
    OAuthApple,
    OAuthGithub,
    OAuthGitLab,
    OAuthFacebook,
    OAuthDiscord,
    OAuthSlack,
    OAuthAmazon,
    OAuthBitbucket,
    OAuthLinkedIn,
    OAuthCoinbase,
    OAuthTwitch,
    OAuthTwitter,
    OAuthTikTok,
    OAuthSnapchat,
    OAuthFigma,
    WebAuthnRegistration,
    Biometric,
    AuthenticatorApp,
    RecoveryCode,
    CryptoWallet,
    Knowledge,
    Other(String),
}

impl DeliveryMethod {
    /// Every delivery method known to this crate.
    pub const KNOWN: [DeliveryMethod; 27] = [
        Self::Email,
        Self::Embedded,
        Self::Sms,
        Self::WhatsApp,
        Self::OAuthGoogle,
        Self::OAuthMicrosoft,
        Self::OAuthApple,
        Self::OAuthGithub,
        Self::OAuthGitLab,
        Self::OAuthFacebook,
        Self::OAuthDiscord,
        Self::OAuthSlack,
        Self::OAuthAmazon,
        Self::OAuthBitbucket,
        Self::OAuthLinkedIn,
        Self::OAuthCoinbase,
        Self::OAuthTwitch,
        Self::OAuthTwitter,
        Self::OAuthTikTok,
        Self::OAuthSnapchat,
        Self::OAuthFigma,
        Self::WebAuthnRegistration,
        Self::Biometric,
        Self::AuthenticatorApp,
        Self::RecoveryCode,
        Self::CryptoWallet,
        Self::Knowledge,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Email => "email",
            Self::Embedded => "embedded",
            Self::Sms => "sms",
            Self::WhatsApp => "whatsapp",
            Self::OAuthGoogle => "oauth_google",
            Self::OAuthMicrosoft => "oauth_microsoft",
            Self::OAuthApple => "oauth_apple",
            Self::OAuthGithub => "oauth_github",
            Self::OAuthGitLab => "oauth_gitlab",
            Self::OAuthFacebook => "oauth_facebook",
            Self::OAuthDiscord => "oauth_discord",
            Self::OAuthSlack => "oauth_slack",
            Self::OAuthAmazon => "oauth_amazon",
            Self::OAuthBitbucket => "oauth_bitbucket",
            Self::OAuthLinkedIn => "oauth_linkedin",
            Self::OAuthCoinbase => "oauth_coinbase",
            Self::OAuthTwitch => "oauth_twitch",
            Self::OAuthTwitter => "oauth_twitter",
            Self::OAuthTikTok => "oauth_tiktok",
            Self::OAuthSnapchat => "oauth_snapchat",
            Self::OAuthFigma => "oauth_figma",
            Self::WebAuthnRegistration => "webauthn_registration",
            Self::Biometric => "biometric",
            Self::AuthenticatorApp => "authenticator_app",
            Self::RecoveryCode => "recovery_code",
            Self::CryptoWallet => "crypto_wallet",
            Self::Knowledge => "knowledge",
            Self::Other(other) => other,
        }
    }

    /// Key of the nested payload that accompanies this delivery method.
    ///
    /// `None` for password (knowledge) factors, which carry no payload, and
    /// for unrecognised methods.
    pub fn payload_key(&self) -> Option<&'static str> {
        let key = match self {
            Self::Email | Self::Embedded => "email_factor",
            Self::Sms | Self::WhatsApp => "phone_number_factor",
            Self::OAuthGoogle => "google_oauth_factor",
            Self::OAuthMicrosoft => "microsoft_oauth_factor",
            Self::OAuthApple => "apple_oauth_factor",
            Self::OAuthGithub => "github_oauth_factor",
            Self::OAuthGitLab => "gitlab_oauth_factor",
            Self::OAuthFacebook => "facebook_oauth_factor",
            Self::OAuthDiscord => "discord_oauth_factor",
            Self::OAuthSlack => "slack_oauth_factor",
            Self::OAuthAmazon => "amazon_oauth_factor",
            Self::OAuthBitbucket => "bitbucket_oauth_factor",
            Self::OAuthLinkedIn => "linkedin_oauth_factor",
            Self::OAuthCoinbase => "coinbase_oauth_factor",
            Self::OAuthTwitch => "twitch_oauth_factor",
            Self::OAuthTwitter => "twitter_oauth_factor",
            Self::OAuthTikTok => "tiktok_oauth_factor",
            Self::OAuthSnapchat => "snapchat_oauth_factor",
            Self::OAuthFigma => "figma_oauth_factor",
            Self::WebAuthnRegistration => "webauthn_factor",
            Self::Biometric => "biometric_factor",
            Self::AuthenticatorApp => "authenticator_app_factor",
            Self::RecoveryCode => "recovery_code_factor",
            Self::CryptoWallet => "crypto_wallet_factor",
            Self::Knowledge | Self::Other(_) => return None,
        };
        Some(key)
    }

    /// The OAuth provider name (e.g. `"google"`) for OAuth delivery methods.
    pub fn oauth_provider(&self) -> Option<&str> {
        match self {
            Self::Other(_) => None,
            known => known.as_str().strip_prefix("oauth_"),
        }
    }
}

impl From<String> for DeliveryMethod {
    fn from(value: String) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|known| known.as_str() == value)
            .unwrap_or(Self::Other(value))
    }
}

impl From<DeliveryMethod> for String {
    fn from(value: DeliveryMethod) -> Self {
        match value {
            DeliveryMethod::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailFactor {
    pub email_id: String,
    pub email_address: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneNumberFactor {
    pub phone_id: String,
    pub phone_number: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload shared by every OAuth provider.
///
/// Some providers (Twitter, TikTok, Snapchat) never report an email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthFactor {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    pub provider_subject: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebAuthnFactor {
    pub webauthn_registration_id: String,
    pub domain: String,
    pub user_agent: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricFactor {
    pub biometric_registration_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticatorAppFactor {
    pub totp_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryCodeFactor {
    pub totp_recovery_code_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoWalletFactor {
    pub crypto_wallet_id: String,
    pub crypto_wallet_address: String,
    pub crypto_wallet_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The variant-specific part of an [`AuthenticationFactor`].
#[derive(Debug, Clone, PartialEq)]
pub enum FactorDetails {
    Email(EmailFactor),
    PhoneNumber(PhoneNumberFactor),
    OAuth(OAuthFactor),
    WebAuthn(WebAuthnFactor),
    Biometric(BiometricFactor),
    AuthenticatorApp(AuthenticatorAppFactor),
    RecoveryCode(RecoveryCodeFactor),
    CryptoWallet(CryptoWalletFactor),
    /// Password (knowledge) factors carry no payload.
    Password,
    /// Residual fields of a factor whose payload could not be narrowed,
    /// either because the delivery method is unrecognised or because the
    /// expected payload key was absent.
    Unknown(Map<String, Value>),
}

/// A single factor used to authenticate a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFactor")]
pub struct AuthenticationFactor {
    pub delivery_method: DeliveryMethod,
    /// Wire field `type`.
    pub factor_type: String,
    pub last_authenticated_at: String,
    pub details: FactorDetails,
    /// Envelope-level fields not modelled above.
    pub extra: Map<String, Value>,
}

impl AuthenticationFactor {
    pub fn email(&self) -> Option<&EmailFactor> {
        match &self.details {
            FactorDetails::Email(factor) => Some(factor),
            _ => None,
        }
    }

    pub fn phone_number(&self) -> Option<&PhoneNumberFactor> {
        match &self.details {
            FactorDetails::PhoneNumber(factor) => Some(factor),
            _ => None,
        }
    }

    pub fn oauth(&self) -> Option<&OAuthFactor> {
        match &self.details {
            FactorDetails::OAuth(factor) => Some(factor),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawFactor {
    delivery_method: DeliveryMethod,
    #[serde(rename = "type")]
    factor_type: String,
    last_authenticated_at: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawFactor> for AuthenticationFactor {
    type Error = serde_json::Error;

    fn try_from(raw: RawFactor) -> Result<Self, Self::Error> {
        let RawFactor {
            delivery_method,
            factor_type,
            last_authenticated_at,
            mut rest,
        } = raw;

        let details = project(&delivery_method, &mut rest)?;

        Ok(Self {
            delivery_method,
            factor_type,
            last_authenticated_at,
            details,
            extra: rest,
        })
    }
}

/// Narrows the nested payload selected by `method`, removing it from `rest`.
fn project(
    method: &DeliveryMethod,
    rest: &mut Map<String, Value>,
) -> Result<FactorDetails, serde_json::Error> {
    let Some(key) = method.payload_key() else {
        return Ok(match method {
            DeliveryMethod::Knowledge => FactorDetails::Password,
            _ => FactorDetails::Unknown(mem::take(rest)),
        });
    };

    let Some(payload) = rest.remove(key) else {
        return Ok(FactorDetails::Unknown(mem::take(rest)));
    };

    let details = match method {
        DeliveryMethod::Email | DeliveryMethod::Embedded => {
            FactorDetails::Email(serde_json::from_value(payload)?)
        }
        DeliveryMethod::Sms | DeliveryMethod::WhatsApp => {
            FactorDetails::PhoneNumber(serde_json::from_value(payload)?)
        }
        DeliveryMethod::WebAuthnRegistration => {
            FactorDetails::WebAuthn(serde_json::from_value(payload)?)
        }
        DeliveryMethod::Biometric => FactorDetails::Biometric(serde_json::from_value(payload)?),
        DeliveryMethod::AuthenticatorApp => {
            FactorDetails::AuthenticatorApp(serde_json::from_value(payload)?)
        }
        DeliveryMethod::RecoveryCode => {
            FactorDetails::RecoveryCode(serde_json::from_value(payload)?)
        }
        DeliveryMethod::CryptoWallet => {
            FactorDetails::CryptoWallet(serde_json::from_value(payload)?)
        }
        DeliveryMethod::OAuthGoogle
        | DeliveryMethod::OAuthMicrosoft
        | DeliveryMethod::OAuthApple
        | DeliveryMethod::OAuthGithub
        | DeliveryMethod::OAuthGitLab
        | DeliveryMethod::OAuthFacebook
        | DeliveryMethod::OAuthDiscord
        | DeliveryMethod::OAuthSlack
        | DeliveryMethod::OAuthAmazon
        | DeliveryMethod::OAuthBitbucket
        | DeliveryMethod::OAuthLinkedIn
        | DeliveryMethod::OAuthCoinbase
        | DeliveryMethod::OAuthTwitch
        | DeliveryMethod::OAuthTwitter
        | DeliveryMethod::OAuthTikTok
        | DeliveryMethod::OAuthSnapchat
        | DeliveryMethod::OAuthFigma => FactorDetails::OAuth(serde_json::from_value(payload)?),
        // No payload key exists for these; handled above.
        DeliveryMethod::Knowledge | DeliveryMethod::Other(_) => {
            rest.insert(key.to_string(), payload);
            FactorDetails::Unknown(mem::take(rest))
        }
    };

    Ok(details)
}

impl Serialize for AuthenticationFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("delivery_method", &self.delivery_method)?;
        map.serialize_entry("type", &self.factor_type)?;
        map.serialize_entry("last_authenticated_at", &self.last_authenticated_at)?;

        if let Some(key) = self.delivery_method.payload_key() {
            match &self.details {
                FactorDetails::Email(payload) => map.serialize_entry(key, payload)?,
                FactorDetails::PhoneNumber(payload) => map.serialize_entry(key, payload)?,
                FactorDetails::OAuth(payload) => map.serialize_entry(key, payload)?,
                FactorDetails::WebAuthn(payload) => map.serialize_entry(key, payload)?,
                FactorDetails::Biometric(payload) => map.serialize_entry(key, payload)?,
                FactorDetails::AuthenticatorApp(payload) => map.serialize_entry(key, payload)?,
                FactorDetails::RecoveryCode(payload) => map.serialize_entry(key, payload)?,
                FactorDetails::CryptoWallet(payload) => map.serialize_entry(key, payload)?,
                FactorDetails::Password | FactorDetails::Unknown(_) => {}
            }
        }

        if let FactorDetails::Unknown(residual) = &self.details {
            for (key, value) in residual {
                map.serialize_entry(key, value)?;
            }
        }

        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}
