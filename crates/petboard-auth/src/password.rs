//! Salted password hashing with Argon2id

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use tracing::{debug, warn};

use crate::config::HashingConfig;
use crate::error::AuthError;

/// Hashes and verifies user passwords
///
/// Hashing is deliberately slow, so both operations run on the blocking
/// thread pool instead of the async worker that handles the request.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher with the given work factor
    pub fn new(config: &HashingConfig) -> Result<Self, AuthError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AuthError::Configuration(format!("Invalid hashing parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt
    ///
    /// The returned PHC string embeds the salt and parameters, so it can be
    /// stored as-is.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::PasswordHash(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }

    /// Verify a password against a stored hash
    ///
    /// Uses the parameters recorded in `stored_hash`. Unparseable hashes
    /// never verify.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        let result = tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&stored_hash) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Stored password hash is malformed: {}", e);
                    return false;
                }
            };
            argon2.verify_password(password.as_bytes(), &parsed).is_ok()
        })
        .await;

        match result {
            Ok(valid) => valid,
            Err(e) => {
                debug!("Password verification task failed: {}", e);
                false
            }
        }
    }
}
