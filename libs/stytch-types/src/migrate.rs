use serde::{Deserialize, Serialize};

/// Salt placement for MD-5 and SHA-1 hashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepend_salt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append_salt: Option<String>,
}

/// Parameters of an Argon2 (i or id) hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Config {
    pub salt: String,
    pub iteration_amount: u32,
    pub memory: u32,
    pub threads: u32,
    pub key_length: u32,
}

/// Parameters of a scrypt hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScryptConfig {
    pub salt: String,
    pub n_parameter: u32,
    pub r_parameter: u32,
    pub p_parameter: u32,
    pub key_length: u32,
}

/// Import of an existing password hash, tagged by `hash_type`.
///
/// Each variant carries the shared `email` and `hash` plus at most one
/// configuration object whose shape is fixed by the hash type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hash_type")]
pub enum MigrateRequest {
    #[serde(rename = "md_5")]
    Md5 {
        email: String,
        hash: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        md_5_config: Option<SaltConfig>,
    },
    #[serde(rename = "bcrypt")]
    Bcrypt { email: String, hash: String },
    #[serde(rename = "argon_2i")]
    Argon2I {
        email: String,
        hash: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        argon_2_config: Option<Argon2Config>,
    },
    #[serde(rename = "argon_2id")]
    Argon2Id {
        email: String,
        hash: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        argon_2_config: Option<Argon2Config>,
    },
    #[serde(rename = "sha_1")]
    Sha1 {
        email: String,
        hash: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha_1_config: Option<SaltConfig>,
    },
    #[serde(rename = "scrypt")]
    Scrypt {
        email: String,
        hash: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scrypt_config: Option<ScryptConfig>,
    },
}

impl MigrateRequest {
    /// The wire value of `hash_type`.
    pub fn hash_type(&self) -> &'static str {
        match self {
            Self::Md5 { .. } => "md_5",
            Self::Bcrypt { .. } => "bcrypt",
            Self::Argon2I { .. } => "argon_2i",
            Self::Argon2Id { .. } => "argon_2id",
            Self::Sha1 { .. } => "sha_1",
            Self::Scrypt { .. } => "scrypt",
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::Md5 { email, .. }
            | Self::Bcrypt { email, .. }
            | Self::Argon2I { email, .. }
            | Self::Argon2Id { email, .. }
            | Self::Sha1 { email, .. }
            | Self::Scrypt { email, .. } => email,
        }
    }
}
