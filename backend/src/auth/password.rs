//! Salted password hashes.
//!
//! Stored as `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`, the format the
//! admin collection already uses. A missing iteration count means
//! [`DEFAULT_ITERATIONS`]. Any other method never verifies.

use sha2::Sha256;
use uuid::Uuid;

pub const DEFAULT_ITERATIONS: u32 = 600_000;

const SALT_LENGTH: usize = 16;
const DIGEST_LENGTH: usize = 32;

/// Hashes new passwords with a fixed iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let salt = generate_salt();
        let digest = derive(password, &salt, self.iterations);
        format!("pbkdf2:sha256:{}${}${}", self.iterations, salt, digest)
    }

    /// Check `password` against a stored hash.
    pub fn verify(stored: &str, password: &str) -> bool {
        let mut parts = stored.splitn(3, '$');
        let (Some(method), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        let Some(iterations) = parse_method(method) else {
            log::debug!("Unsupported password hash method '{}'", method);
            return false;
        };

        constant_time_eq(derive(password, salt, iterations).as_bytes(), expected.as_bytes())
    }
}

fn parse_method(method: &str) -> Option<u32> {
    let mut parts = method.split(':');
    if parts.next()? != "pbkdf2" || parts.next()? != "sha256" {
        return None;
    }
    let iterations = match parts.next() {
        Some(raw) => raw.parse().ok()?,
        None => DEFAULT_ITERATIONS,
    };
    if parts.next().is_some() || iterations == 0 {
        return None;
    }
    Some(iterations)
}

fn derive(password: &str, salt: &str, iterations: u32) -> String {
    let mut digest = [0u8; DIGEST_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut digest);
    hex::encode(digest)
}

fn generate_salt() -> String {
    let mut salt = Uuid::new_v4().simple().to_string();
    salt.truncate(SALT_LENGTH);
    salt
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new(1_000);
        let stored = hasher.hash("s3cret!");

        assert!(stored.starts_with("pbkdf2:sha256:1000$"));
        assert!(PasswordHasher::verify(&stored, "s3cret!"));
        assert!(!PasswordHasher::verify(&stored, "s3cret"));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new(1_000);
        assert_ne!(hasher.hash("same"), hasher.hash("same"));
    }

    #[test]
    fn test_verifies_existing_record() {
        let stored = "pbkdf2:sha256:1000$a1b2c3d4e5f6a7b8$\
                      efc6246de557e5ec011d44f3a3a81f1c0de6675a6bdded6da9cf7065a74e67a3";
        assert!(PasswordHasher::verify(stored, "correct horse"));
        assert!(!PasswordHasher::verify(stored, "battery staple"));
    }

    #[test]
    fn test_missing_iterations_use_default() {
        let stored = "pbkdf2:sha256$XyZ0123456789abc$\
                      7672114cb893f86b82e796a572901277be515838b56d59c97f821019b6eb3b13";
        assert!(PasswordHasher::verify(stored, "hunter2"));
    }

    #[test]
    fn test_unknown_methods_never_verify() {
        assert!(!PasswordHasher::verify("scrypt:32768:8:1$salt$abcd", "x"));
        assert!(!PasswordHasher::verify("pbkdf2:sha1:1000$salt$abcd", "x"));
        assert!(!PasswordHasher::verify("pbkdf2:sha256:0$salt$abcd", "x"));
        assert!(!PasswordHasher::verify("plaintext", "plaintext"));
        assert!(!PasswordHasher::verify("", ""));
    }
}
