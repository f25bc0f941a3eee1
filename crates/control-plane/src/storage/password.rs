// Password hashing using Argon2id
// Decision: Stored hashes are PHC strings, so the salt and parameters travel with the hash
// Decision: Unknown users are verified against a fixed dummy hash so a login
// takes the same time whether or not the username exists

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash (constant-time comparison)
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Verify a login attempt. With no stored hash the candidate is checked
/// against a dummy hash and the result is always `false`.
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> Result<bool> {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            let _ = verify_password(password, dummy_hash()?)?;
            Ok(false)
        }
    }
}

fn dummy_hash() -> Result<&'static str> {
    static DUMMY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY.get() {
        return Ok(hash.as_str());
    }
    let hash = hash_password("confhub-dummy-password")?;
    Ok(DUMMY.get_or_init(|| hash).as_str())
}
