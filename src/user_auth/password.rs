//! Argon2id password hashing.
//!
//! Hashing is CPU-bound, so both hash and verify run on the blocking pool to
//! keep request tasks responsive.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::config::Argon2Config;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Invalid argon2 parameters: {0}")]
    Params(String),

    #[error("Hashing failed: {0}")]
    Hash(String),

    #[error("Stored hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
    /// Hash verified against when the account does not exist, so that a
    /// missing user costs the same as a wrong password
    dummy_hash: String,
}

impl PasswordService {
    pub fn new(config: &Argon2Config) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::Params(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, "harmoni-dummy-password")?;
        Ok(Self { argon2, dummy_hash })
    }

    /// Salted PHC-format hash of `password`
    pub async fn hash(&self, password: String) -> Result<String, PasswordError> {
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || hash_with(&argon2, &password)).await?
    }

    /// Check `password` against a stored PHC hash
    pub async fn verify(&self, password: String, stored: String) -> Result<bool, PasswordError> {
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || verify_with(&argon2, &password, &stored)).await?
    }

    /// Burn one verification against the dummy hash. Always false.
    pub async fn verify_dummy(&self, password: String) -> Result<bool, PasswordError> {
        self.verify(password, self.dummy_hash.clone())
            .await
            .map(|_| false)
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

fn verify_with(argon2: &Argon2<'_>, password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}
