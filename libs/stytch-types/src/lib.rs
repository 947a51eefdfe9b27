//! Wire types for the Stytch authentication API.
//!
//! This crate provides:
//! - User and Session entities with typed timestamps
//! - The `AuthenticationFactor` union, narrowed by `delivery_method`
//! - The `MigrateRequest` union, tagged by `hash_type`
//! - The structured API error body

mod errors;
mod factor;
mod migrate;
mod session;
mod user;

pub use errors::ApiError;
pub use factor::{
    AuthenticationFactor, AuthenticatorAppFactor, BiometricFactor, CryptoWalletFactor,
    DeliveryMethod, EmailFactor, FactorDetails, OAuthFactor, PhoneNumberFactor,
    RecoveryCodeFactor, WebAuthnFactor,
};
pub use migrate::{Argon2Config, MigrateRequest, SaltConfig, ScryptConfig};
pub use session::{Attributes, Session};
pub use user::{
    CryptoWallet, Email, Name, OAuthProvider, Password, PhoneNumber, Totp, User, UserMetadata,
    WebAuthnRegistration,
};
