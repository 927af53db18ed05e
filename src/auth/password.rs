use std::num::NonZeroU32;

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use ring::{
    digest, pbkdf2,
    rand::{SecureRandom, SystemRandom},
};

use crate::auth::PasswordError;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = digest::SHA256_OUTPUT_LEN;
static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

pub const DEFAULT_ITERATIONS: u32 = 100_000;

type Result<T> = std::result::Result<T, PasswordError>;

/// Salted PBKDF2 password hasher.
///
/// Hashes are self-describing strings of the form
/// `pbkdf2-sha256$<iterations>$<salt>$<hash>`, so changing the configured
/// iteration count does not invalidate existing passwords.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: NonZeroU32::new(iterations).unwrap_or(NonZeroU32::MIN),
        }
    }

    /// Hashes a password on the blocking thread pool.
    pub async fn hash(&self, password: &str) -> Result<String> {
        let hasher = *self;
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password)).await?
    }

    /// Checks a password against a stored hash on the blocking thread pool.
    pub async fn verify(&self, password: &str, encoded: &str) -> Result<bool> {
        let password = password.to_owned();
        let encoded = encoded.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &encoded)).await?
    }

    pub fn hash_blocking(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        SystemRandom::new()
            .fill(&mut salt)
            .map_err(|_| PasswordError::Salt)?;

        let mut credential = [0u8; CREDENTIAL_LEN];
        pbkdf2::derive(
            ALGORITHM,
            self.iterations,
            &salt,
            password.as_bytes(),
            &mut credential,
        );

        Ok(format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(credential)
        ))
    }
}

/// Checks a password against a hash produced by [`PasswordHasher`].
pub fn verify_blocking(password: &str, encoded: &str) -> Result<bool> {
    let mut parts = encoded.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(credential), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(PasswordError::Malformed);
    };

    let iterations: NonZeroU32 = iterations.parse().map_err(|_| PasswordError::Malformed)?;
    let salt = STANDARD_NO_PAD
        .decode(salt)
        .map_err(|_| PasswordError::Malformed)?;
    let credential = STANDARD_NO_PAD
        .decode(credential)
        .map_err(|_| PasswordError::Malformed)?;

    Ok(pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &credential).is_ok())
}
