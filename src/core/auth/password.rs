//! Password hashing
//!
//! Salted bcrypt hashes. The cost is part of the hash string, so verification
//! needs nothing but the stored value.

/// Bcrypt work factor
pub const BCRYPT_COST: u32 = 10;

/// Longest password bcrypt can hash without dropping bytes.
/// bcrypt reads 72 bytes including a terminating NUL.
pub const MAX_PASSWORD_BYTES: usize = 71;

/// Password hashing errors
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingError(#[from] bcrypt::BcryptError),
}

/// Hash a password using bcrypt with automatic salt generation.
///
/// Passwords longer than [`MAX_PASSWORD_BYTES`] are an error, never truncated.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::non_truncating_hash(password, BCRYPT_COST)?)
}

/// Verify a candidate password against a stored bcrypt hash.
///
/// A malformed hash or an over-long candidate verifies as `false`.
pub fn verify_password(hash: &str, candidate: &str) -> bool {
    match bcrypt::non_truncating_verify(candidate, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::debug!("Password verification failed on stored hash: {}", e);
            false
        }
    }
}
