//! Password hashing.

use async_trait::async_trait;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use super::error::UserError;

/// Hashing seam, so tests can trade strength for speed.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` into a self-describing PHC string.
    async fn hash(&self, password: &str) -> Result<String, UserError>;

    /// Check `password` against a stored PHC string.
    ///
    /// A mismatch is `Ok(false)`; only unreadable hashes are errors.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, UserError>;
}

/// Argon2id hasher. Work runs on the blocking pool.
///
/// The default parameters are m=19456 KiB, t=2, p=1.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit memory (KiB), iteration and lane costs.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, UserError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| UserError::Hashing(format!("invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

async fn blocking<T, F>(f: F) -> Result<T, UserError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, UserError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| UserError::Hashing(format!("hashing task failed: {}", e)))?
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: &str) -> Result<String, UserError> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();

        blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| UserError::Hashing(e.to_string()))
        })
        .await
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, UserError> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();
        let hash = hash.to_string();

        blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|e| UserError::Hashing(format!("invalid password hash: {}", e)))?;

            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(UserError::Hashing(e.to_string())),
            }
        })
        .await
    }
}
