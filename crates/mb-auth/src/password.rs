//! Argon2id password hashing.
//!
//! Both operations are deliberately slow; async callers go through
//! [`digest`] and [`check`], which run on the blocking pool.
use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;

fn salt() -> Result<SaltString, argon2::password_hash::Error> {
    use rand::Rng;
    let ref mut bytes = [0u8; 16];
    rand::rng().fill(bytes);
    SaltString::encode_b64(bytes)
}

pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
}

pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}

/// [`hash`] on the blocking pool.
pub async fn digest(password: &str) -> Result<String, crate::AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(&password))
        .await
        .map_err(|e| crate::AuthError::internal("password worker", e))?
        .map_err(|e| crate::AuthError::internal("error calculating password hash", e))
}

/// [`verify`] on the blocking pool.
pub async fn check(password: &str, hashword: &str) -> Result<bool, crate::AuthError> {
    let password = password.to_string();
    let hashword = hashword.to_string();
    tokio::task::spawn_blocking(move || verify(&password, &hashword))
        .await
        .map_err(|e| crate::AuthError::internal("password worker", e))
}
