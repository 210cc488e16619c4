//! Hashing, HMAC, AEAD, and constant-time comparison primitives (spec §4.1).
//!
//! These are thin, allocation-light wrappers around the RustCrypto family
//! (`sha2`, `sha1`, `ripemd`, `hmac`, `aes-gcm`, `subtle`) rather than a
//! hand-rolled implementation: unlike the secp256k1 arithmetic in
//! [`crate::secp256k1`], none of this is something the crate exists to
//! provide itself, so it delegates to vetted crates the same way the
//! teacher's key-handling code does.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;

use crate::{Error, Result};

/// The conventional display form for a 32-byte chain hash (txid, block
/// hash): wire order reversed, lowercase hex. Internal computation and
/// comparisons should keep using the raw wire-order bytes.
#[must_use]
pub fn reversed_hex(h: &[u8; 32]) -> String {
    let mut reversed = *h;
    reversed.reverse();
    hex::encode(reversed)
}

#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

#[must_use]
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

#[must_use]
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

#[must_use]
pub fn sha1(data: &[u8]) -> [u8; 20] {
    Sha1::digest(data).into()
}

#[must_use]
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

#[must_use]
pub fn sha512(data: &[u8]) -> [u8; 64] {
    Sha512::digest(data).into()
}

#[must_use]
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

#[must_use]
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Constant-time byte comparison. Returns `false` immediately for
/// mismatched lengths (a length mismatch is not itself secret).
#[must_use]
pub fn secure_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// AES-256-GCM encryption. Returns `ciphertext ∥ tag` (the `aes-gcm` crate
/// appends the 16-byte tag to the ciphertext internally).
pub fn aes256gcm_encrypt(key: &[u8; 32], iv: &[u8; 12], aad: &[u8], plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(iv);
    cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .expect("AES-256-GCM encryption is infallible for in-range inputs")
}

/// AES-256-GCM decryption of a `ciphertext ∥ tag` blob produced by
/// [`aes256gcm_encrypt`]. Returns [`Error::DecryptFailed`] on
/// authentication failure.
pub fn aes256gcm_decrypt(
    key: &[u8; 32],
    iv: &[u8; 12],
    aad: &[u8],
    ciphertext_and_tag: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(iv);
    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext_and_tag,
                aad,
            },
        )
        .map_err(|_| Error::DecryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256d_is_double_sha256() {
        let data = b"hello";
        assert_eq!(sha256d(data), sha256(&sha256(data)));
    }

    #[test]
    fn hash160_matches_ripemd_of_sha256() {
        let data = b"hello";
        assert_eq!(hash160(data), ripemd160(&sha256(data)));
    }

    #[test]
    fn secure_compare_rejects_length_mismatch_and_content_mismatch() {
        assert!(!secure_compare(&[1, 2, 3], &[1, 2]));
        assert!(!secure_compare(&[1, 2, 3], &[1, 2, 4]));
        assert!(secure_compare(&[1, 2, 3], &[1, 2, 3]));
    }

    #[test]
    fn aead_round_trips_and_rejects_tampered_aad() {
        let key = [7u8; 32];
        let iv = [9u8; 12];
        let aad = b"associated";
        let pt = b"secret payload";
        let blob = aes256gcm_encrypt(&key, &iv, aad, pt);
        let decrypted = aes256gcm_decrypt(&key, &iv, aad, &blob).unwrap();
        assert_eq!(decrypted, pt);
        assert!(aes256gcm_decrypt(&key, &iv, b"wrong-aad", &blob).is_err());
    }

    #[test]
    fn known_sha256_vector() {
        let digest = sha256(b"abc");
        let expected =
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
                .unwrap();
        assert_eq!(digest.as_slice(), expected.as_slice());
    }
}
