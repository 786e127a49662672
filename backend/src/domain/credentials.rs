//! One-way password hashing and verification.
//!
//! Hashes are Argon2id PHC strings carrying their own salt and cost
//! parameters, so verification keeps working after the configured costs
//! change.

use std::fmt;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash, SaltString};

const SALT_LEN: usize = 16;

/// Failures while producing a password hash.
///
/// Verification never fails; a mismatch or an unreadable hash is `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The operating system could not supply salt bytes.
    #[error("failed to gather salt entropy: {message}")]
    Entropy { message: String },
    /// Cost parameters were rejected.
    #[error("invalid password hashing parameters: {message}")]
    Parameters { message: String },
    /// The hashing primitive itself failed.
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
}

/// Opaque PHC-formatted password hash.
///
/// `Debug` output is redacted so hashes never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap a hash previously produced by [`CredentialManager::hash`] and
    /// read back from storage.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// PHC string suitable for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(<redacted>)")
    }
}

/// Argon2id hasher with fixed cost parameters.
///
/// # Examples
/// ```
/// use sns_backend::domain::CredentialManager;
///
/// let manager = CredentialManager::with_params(8, 1, 1).expect("cheap params");
/// let hash = manager.hash("pw1").expect("hashing succeeds");
/// assert!(manager.verify("pw1", &hash));
/// assert!(!manager.verify("pw2", &hash));
/// ```
#[derive(Clone)]
pub struct CredentialManager {
    argon2: Argon2<'static>,
}

impl CredentialManager {
    /// Build a manager with explicit Argon2id costs.
    ///
    /// `memory_kib` must be at least `8 * parallelism`.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|err| {
            CredentialError::Parameters {
                message: err.to_string(),
            }
        })?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Derive a salted one-way hash of `password`.
    ///
    /// Every call draws a fresh salt, so two hashes of the same password
    /// differ byte-wise while both verify.
    pub fn hash(&self, password: &str) -> Result<HashedPassword, CredentialError> {
        let mut salt_bytes = [0_u8; SALT_LEN];
        getrandom::getrandom(&mut salt_bytes).map_err(|err| CredentialError::Entropy {
            message: err.to_string(),
        })?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|err| CredentialError::Hashing {
            message: err.to_string(),
        })?;
        let phc = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| CredentialError::Hashing {
                message: err.to_string(),
            })?
            .to_string();
        Ok(HashedPassword(phc))
    }

    /// Check `password` against a stored hash.
    ///
    /// Returns `false` for a mismatch and for hashes that cannot be parsed.
    pub fn verify(&self, password: &str, hash: &HashedPassword) -> bool {
        match PasswordHash::new(hash.as_str()) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for CredentialManager {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialManager").finish_non_exhaustive()
    }
}
