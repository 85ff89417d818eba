//! Password digests for the credential store.

use super::AuthError;

/// Work factor for new digests. Existing digests verify at whatever cost
/// they were created with.
const BCRYPT_COST: u32 = 10;

/// Hash a plaintext password into a storable digest.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))
}

/// Check a plaintext password against a stored digest.
///
/// A mismatch is `Ok(false)`; `Err` means the digest itself was unreadable.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, digest)
        .map_err(|e| AuthError::Internal(format!("password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() {
        let digest = hash_password("s3cret-pass").unwrap();
        assert_ne!(digest, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &digest).unwrap());
        assert!(!verify_password("wrong-pass", &digest).unwrap());
    }

    #[test]
    fn verify_rejects_non_bcrypt_digest() {
        assert!(verify_password("anything", "not-a-bcrypt-digest").is_err());
    }
}
