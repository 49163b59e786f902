use aes::Aes128;
use base64::{engine::general_purpose, Engine as _};
use ecb::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use sha1::{Digest, Sha1};

use super::EncryptionError;

type Aes128EcbEnc = ecb::Encryptor<Aes128>;
type Aes128EcbDec = ecb::Decryptor<Aes128>;

const KEY_LEN: usize = 16;

/// AES-128/ECB/PKCS#5 password cipher, readable by older installations
///
/// # Security Design
/// - Key is the first 16 bytes of SHA-1 over a fixed constant
/// - No IV: the same plaintext always yields the same ciphertext
/// - No integrity check. Tampering is caught only when it breaks the padding
///   or the UTF-8 decoding.
///
/// This keeps the password out of plain sight on disk and nothing more.
pub struct LegacyCipher {
    key: [u8; KEY_LEN],
}

impl LegacyCipher {
    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Sha1::digest(passphrase.as_bytes());
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&digest[..KEY_LEN]);
        Self { key }
    }

    /// Encrypt plaintext, returning base64
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let cipher = Aes128EcbEnc::new_from_slice(&self.key)
            .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;

        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        Ok(general_purpose::STANDARD.encode(ciphertext))
    }

    /// Decrypt a base64 ciphertext produced by `encrypt`
    pub fn decrypt(&self, encrypted: &str) -> Result<String, EncryptionError> {
        let data = general_purpose::STANDARD
            .decode(encrypted)
            .map_err(|e| EncryptionError::InvalidFormat(format!("Base64 decode failed: {}", e)))?;

        if data.is_empty() || data.len() % KEY_LEN != 0 {
            return Err(EncryptionError::InvalidFormat(format!(
                "Ciphertext length {} is not a whole number of blocks",
                data.len()
            )));
        }

        let cipher = Aes128EcbDec::new_from_slice(&self.key)
            .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;

        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&data)
            .map_err(|e| EncryptionError::DecryptionFailed(format!("Bad padding: {}", e)))?;

        String::from_utf8(plaintext).map_err(|e| EncryptionError::InvalidUtf8(e.to_string()))
    }
}
