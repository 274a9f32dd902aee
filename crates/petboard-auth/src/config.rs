//! Authentication configuration
//!
//! Built once at startup and never mutated afterwards. Token secrets come
//! from the environment; a missing secret is a fatal configuration error.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;

/// Environment variable holding the access token signing secret
pub const ACCESS_TOKEN_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
/// Environment variable holding the refresh token signing secret
pub const REFRESH_TOKEN_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

/// 30 minutes
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 1800;
/// 5 days
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 5 * 24 * 3600;
/// 10 years
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 3600;

/// Token signing configuration
#[derive(Clone)]
pub struct AuthConfig {
    access_secret: String,
    refresh_secret: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl AuthConfig {
    /// Validate and build the token configuration
    pub fn new(
        access_secret: Option<String>,
        refresh_secret: Option<String>,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Result<Self, AuthError> {
        let access_secret = require_secret(access_secret, ACCESS_TOKEN_SECRET_ENV)?;
        let refresh_secret = require_secret(refresh_secret, REFRESH_TOKEN_SECRET_ENV)?;

        if access_secret == refresh_secret {
            return Err(AuthError::Configuration(format!(
                "{} and {} must differ",
                ACCESS_TOKEN_SECRET_ENV, REFRESH_TOKEN_SECRET_ENV
            )));
        }
        for ttl in [access_ttl_secs, refresh_ttl_secs] {
            if !(1..=MAX_TOKEN_TTL_SECS).contains(&ttl) {
                return Err(AuthError::Configuration(format!(
                    "Token lifetime {}s is outside 1..={}s",
                    ttl, MAX_TOKEN_TTL_SECS
                )));
            }
        }

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }

    pub fn access_secret(&self) -> &str {
        &self.access_secret
    }

    pub fn refresh_secret(&self) -> &str {
        &self.refresh_secret
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

fn require_secret(secret: Option<String>, name: &str) -> Result<String, AuthError> {
    match secret {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(AuthError::Configuration(format!("{} is not set", name))),
    }
}

/// Argon2 work factor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_memory_kib() -> u32 {
    argon2::Params::DEFAULT_M_COST
}

fn default_iterations() -> u32 {
    argon2::Params::DEFAULT_T_COST
}

fn default_parallelism() -> u32 {
    argon2::Params::DEFAULT_P_COST
}
