use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Encryption service using AES-256-GCM
///
/// # Security Design
/// - Key is SHA-256 of a fixed application constant, so nothing needs to be
///   stored next to the data. Anyone who knows the constant can decrypt.
/// - Unique random nonce for each encryption
/// - Authenticated encryption: a modified ciphertext fails to decrypt
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    /// Create encryption service keyed by a digest of `passphrase`
    pub fn from_passphrase(passphrase: &str) -> Result<Self, EncryptionError> {
        let key = Sha256::digest(passphrase.as_bytes());

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;

        Ok(Self { cipher })
    }

    /// Encrypt plaintext
    ///
    /// Returns base64-encoded string containing: nonce (12 bytes) + ciphertext
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        // Concatenate: nonce || ciphertext
        let mut result = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(&result))
    }

    /// Decrypt ciphertext
    ///
    /// Expects base64-encoded string containing: nonce (12 bytes) + ciphertext
    pub fn decrypt(&self, encrypted: &str) -> Result<String, EncryptionError> {
        let data = general_purpose::STANDARD
            .decode(encrypted)
            .map_err(|e| EncryptionError::InvalidFormat(format!("Base64 decode failed: {}", e)))?;

        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(EncryptionError::InvalidFormat(
                "Data too short (expected at least nonce + tag)".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self.cipher.decrypt(nonce, ciphertext).map_err(|e| {
            EncryptionError::DecryptionFailed(format!(
                "Decryption failed (data may be tampered): {}",
                e
            ))
        })?;

        String::from_utf8(plaintext).map_err(|e| EncryptionError::InvalidUtf8(e.to_string()))
    }
}

/// Encryption errors
#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),
}

impl fmt::Display for EncryptionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionService(AES-256-GCM)")
    }
}
