use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::error;

const MIN_PASSWORD_CHARS: usize = 6;

/// At least 6 characters with a digit, a lowercase and an uppercase letter.
pub fn is_strong_password(plain: &str) -> bool {
    lazy_static! {
        static ref DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
        static ref LOWER: Regex = Regex::new(r"[a-z]").unwrap();
        static ref UPPER: Regex = Regex::new(r"[A-Z]").unwrap();
    }
    plain.chars().count() >= MIN_PASSWORD_CHARS
        && DIGIT.is_match(plain)
        && LOWER.is_match(plain)
        && UPPER.is_match(plain)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
