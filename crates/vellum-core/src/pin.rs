//! PIN hashing for the note lock.
//!
//! PINs are hashed with Argon2id and a random per-hash salt; only the PHC
//! string is ever stored. The raw PIN must never be persisted or logged.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{Error, Result};

/// Minimum PIN length policy.
pub const MIN_PIN_LENGTH: usize = 4;

/// Validate the minimum-length policy.
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.chars().count() < MIN_PIN_LENGTH {
        return Err(Error::PinTooShort(MIN_PIN_LENGTH));
    }
    Ok(())
}

/// Hash a PIN with Argon2id, producing a PHC-format string.
pub fn hash_pin(pin: &str) -> Result<String> {
    validate_pin(pin)?;
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Hash(e.to_string()))
}

/// Verify a PIN against a stored PHC string.
///
/// A mismatch is `Ok(false)`; a malformed stored hash is an infrastructure
/// error, not a failed verification.
pub fn verify_pin(pin: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| Error::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(pin.as_bytes(), &parsed)
        .is_ok())
}
