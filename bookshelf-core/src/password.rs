//! Argon2id password hashing

use crate::config::PasswordConfig;
use crate::error::BookshelfResult;
use crate::{config_error, internal_error};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::warn;

/// Salted one-way hashing with cost parameters fixed at construction
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(config: &PasswordConfig) -> BookshelfResult<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| config_error!(format!("Invalid argon2 parameters: {e}"), "password"))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a secret into a PHC string
    pub fn hash(&self, secret: &str) -> BookshelfResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| internal_error!(format!("Failed to hash password: {e}"), "password"))
    }

    /// Check a candidate against a stored hash. The stored hash carries its own
    /// parameters, so hashes made under older settings still verify.
    pub fn verify(&self, hash: &str, candidate: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash could not be parsed: {}", e);
                return false;
            }
        };

        self.argon2()
            .verify_password(candidate.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Hash on the blocking pool
    pub async fn spawn_hash(&self, secret: String) -> BookshelfResult<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| internal_error!("Password hashing task failed", "password", e))?
    }

    /// Verify on the blocking pool
    pub async fn spawn_verify(&self, hash: String, candidate: String) -> BookshelfResult<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &candidate))
            .await
            .map_err(|e| internal_error!("Password verification task failed", "password", e))
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(&PasswordConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = test_hasher();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "correct horse"));
        assert!(!hasher.verify(&hash, "battery staple"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = test_hasher();
        let first = hasher.hash("same secret").unwrap();
        let second = hasher.hash("same secret").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_hash_does_not_verify() {
        let hasher = test_hasher();
        assert!(!hasher.verify("not-a-phc-string", "anything"));
        assert!(!hasher.verify("", ""));
    }

    #[test]
    fn test_zero_memory_is_rejected() {
        let result = PasswordHasher::new(&PasswordConfig {
            memory_kib: 0,
            iterations: 1,
            parallelism: 1,
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_blocking_pool_wrappers() {
        let hasher = test_hasher();
        let hash = hasher.spawn_hash("secret1".to_string()).await.unwrap();
        assert!(hasher
            .spawn_verify(hash, "secret1".to_string())
            .await
            .unwrap());
    }
}
