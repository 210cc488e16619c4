//! Symmetric (AES-256-GCM) keys derived from an ECDH shared secret
//! (spec §4.5, §4.10).

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::hash::{aes256gcm_decrypt, aes256gcm_encrypt, sha256};
use crate::secp256k1::FieldElement;
use crate::{Error, Result};

#[derive(Clone)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        SymmetricKey(bytes)
    }

    /// Modern derivation: `sha256(x)`.
    #[must_use]
    pub fn from_shared_x_modern(x: &FieldElement) -> Self {
        SymmetricKey(sha256(&x.to_bytes()))
    }

    /// Legacy derivation, kept for backward-compatible decryption only:
    /// the raw x-coordinate used directly as the key.
    #[must_use]
    pub fn from_shared_x_legacy(x: &FieldElement) -> Self {
        SymmetricKey(x.to_bytes())
    }

    /// Encrypts with a fresh random 12-byte IV. Output layout:
    /// `iv ∥ ciphertext ∥ tag(16)`.
    #[must_use]
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Vec<u8> {
        let mut iv = [0u8; 12];
        OsRng.fill_bytes(&mut iv);
        let blob = aes256gcm_encrypt(&self.0, &iv, aad, plaintext);
        let mut out = Vec::with_capacity(12 + blob.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&blob);
        out
    }

    /// Decrypts an `iv(12) ∥ ciphertext ∥ tag(16)` envelope.
    pub fn decrypt(&self, envelope: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if envelope.len() < 12 + 16 {
            return Err(Error::DecryptFailed);
        }
        let (iv, blob) = envelope.split_at(12);
        let mut iv_arr = [0u8; 12];
        iv_arr.copy_from_slice(iv);
        aes256gcm_decrypt(&self.0, &iv_arr, aad, blob)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decrypts a legacy `iv(32, only first 12 bytes used) ∥ ciphertext ∥
    /// tag(16)` envelope, kept for backward compatibility with older
    /// encoders that zero-padded the IV to 32 bytes.
    pub fn decrypt_legacy_iv(&self, envelope: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if envelope.len() < 32 + 16 {
            return Err(Error::DecryptFailed);
        }
        let (iv, blob) = envelope.split_at(32);
        let mut iv_arr = [0u8; 12];
        iv_arr.copy_from_slice(&iv[..12]);
        aes256gcm_decrypt(&self.0, &iv_arr, aad, blob)
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let key = SymmetricKey::from_bytes([3u8; 32]);
        let envelope = key.encrypt(b"hello symmetric world", b"");
        let plaintext = key.decrypt(&envelope, b"").unwrap();
        assert_eq!(plaintext, b"hello symmetric world");
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let key = SymmetricKey::from_bytes([3u8; 32]);
        let other = SymmetricKey::from_bytes([9u8; 32]);
        let envelope = key.encrypt(b"payload", b"");
        assert!(other.decrypt(&envelope, b"").is_err());
    }
}
