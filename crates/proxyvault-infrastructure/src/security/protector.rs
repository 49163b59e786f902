use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EncryptionError, EncryptionService, LegacyCipher};

/// Constant both ciphers derive their key from: the store file's name.
///
/// Anyone who knows it can decrypt a stored password. It only keeps the
/// password out of plain text on disk.
pub const KEY_CONSTANT: &str = "proxy.properties";

/// Marks values written by the authenticated scheme. Not part of the base64
/// alphabet, so unmarked values are always legacy ciphertext.
const AUTHENTICATED_PREFIX: &str = "gcm:";

/// Scheme used when writing a password
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherScheme {
    /// AES-256-GCM with a random nonce, tamper-evident
    #[default]
    Authenticated,
    /// AES-128-ECB, byte-compatible with stores written by older installations
    Legacy,
}

impl CipherScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherScheme::Authenticated => "authenticated",
            CipherScheme::Legacy => "legacy",
        }
    }
}

impl FromStr for CipherScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "authenticated" | "gcm" | "aes-gcm" => Ok(CipherScheme::Authenticated),
            "legacy" | "ecb" | "aes-ecb" => Ok(CipherScheme::Legacy),
            other => Err(format!(
                "Invalid cipher scheme: {other}. Must be 'authenticated' or 'legacy'"
            )),
        }
    }
}

impl fmt::Display for CipherScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encrypts passwords for the store and decrypts either scheme on the way back
pub struct PasswordProtector {
    scheme: CipherScheme,
    authenticated: EncryptionService,
    legacy: LegacyCipher,
}

impl PasswordProtector {
    pub fn new(scheme: CipherScheme) -> Result<Self, EncryptionError> {
        Self::with_constant(KEY_CONSTANT, scheme)
    }

    pub fn with_constant(constant: &str, scheme: CipherScheme) -> Result<Self, EncryptionError> {
        Ok(Self {
            scheme,
            authenticated: EncryptionService::from_passphrase(constant)?,
            legacy: LegacyCipher::from_passphrase(constant),
        })
    }

    pub fn scheme(&self) -> CipherScheme {
        self.scheme
    }

    /// Encrypt with the configured scheme
    pub fn seal(&self, plaintext: &str) -> Result<String, EncryptionError> {
        match self.scheme {
            CipherScheme::Authenticated => {
                let encrypted = self.authenticated.encrypt(plaintext)?;
                Ok(format!("{AUTHENTICATED_PREFIX}{encrypted}"))
            }
            CipherScheme::Legacy => self.legacy.encrypt(plaintext),
        }
    }

    /// Decrypt a stored value, whichever scheme wrote it
    pub fn open(&self, stored: &str) -> Result<String, EncryptionError> {
        match stored.strip_prefix(AUTHENTICATED_PREFIX) {
            Some(encrypted) => self.authenticated.decrypt(encrypted),
            None => self.legacy.decrypt(stored),
        }
    }
}
