//! Credential hashing with Argon2id
//!
//! Passwords are hashed with Argon2id and a per-call random salt embedded in
//! the PHC output string. Cost parameters are fixed service configuration,
//! never user input.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::Error;

/// Fixed Argon2id cost parameters: memory in KiB, iterations, lanes.
///
/// 19 MiB / t=2 / p=1 is the OWASP-recommended interactive profile.
const MEMORY_COST_KIB: u32 = 19_456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// One-way salted credential hasher.
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
            .expect("fixed Argon2 parameters are valid");
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl CredentialHasher {
    /// Hasher with reduced memory cost, for tests that hash many passwords.
    pub fn fast_for_tests() -> Self {
        let params = Params::new(4096, 1, 1, None).expect("fixed Argon2 parameters are valid");
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a plaintext credential with a fresh random salt.
    ///
    /// A failure of the underlying primitive is an internal error, never an
    /// authentication outcome.
    pub fn hash(&self, plaintext: &str) -> Result<String, Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::Internal(format!("credential hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext credential against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch. Only a malformed stored hash or a
    /// primitive failure yields an error.
    pub fn verify(&self, stored: &str, plaintext: &str) -> Result<bool, Error> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| Error::Internal(format!("stored credential hash is malformed: {e}")))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Internal(format!(
                "credential verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_round_trip() {
        let hasher = CredentialHasher::fast_for_tests();
        let digest = hasher.hash("password123").unwrap();

        assert!(hasher.verify(&digest, "password123").unwrap());
        assert!(!hasher.verify(&digest, "password124").unwrap());
    }

    #[test]
    fn test_salts_differ_per_call() {
        let hasher = CredentialHasher::fast_for_tests();
        let a = hasher.hash("same password").unwrap();
        let b = hasher.hash("same password").unwrap();

        // PHC strings embed the salt, so two hashes of one input differ
        assert_ne!(a, b);
        assert!(hasher.verify(&a, "same password").unwrap());
        assert!(hasher.verify(&b, "same password").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        let hasher = CredentialHasher::fast_for_tests();
        let result = hasher.verify("not-a-phc-string", "anything");
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
