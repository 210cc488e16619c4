//! BRC-77 signed-message and BRC-78 encrypted-message envelopes
//! (spec §4.10, §6).

use rand::rngs::OsRng;
use rand::RngCore;

use crate::ecdsa::Signature;
use crate::hash::sha256;
use crate::keys::ecdh;
use crate::keys::private_key::PrivateKey;
use crate::keys::public_key::PublicKey;
use crate::keys::symmetric_key::SymmetricKey;
use crate::{Error, Result};

use super::invoice::{compute_invoice_number, derive_child_private_key, Counterparty};

/// Shared envelope version constant for both BRC-77 and BRC-78.
pub const ENVELOPE_VERSION: u32 = 0x4242_1033;

fn invoice_for_key_id(kind: &str, key_id_b64: &str) -> Result<String> {
    compute_invoice_number(2, kind, key_id_b64)
}

fn anyone_public_key() -> PublicKey {
    PublicKey::from_point(crate::secp256k1::mul_generator(
        &crate::secp256k1::scalar::Scalar::ONE,
    ))
}

/// BRC-78: `version(4) ∥ sender_pub(33) ∥ recipient_pub(33) ∥
/// key_id(32) ∥ aes_gcm_blob`.
pub fn encrypt_message(
    sender_root: &PrivateKey,
    recipient_pub: &PublicKey,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let mut key_id = [0u8; 32];
    OsRng.fill_bytes(&mut key_id);
    let key_id_b64 = base64_encode(&key_id);
    let invoice = invoice_for_key_id("message encryption", &key_id_b64)?;

    let derived_priv = derive_child_private_key(sender_root, recipient_pub, &invoice)?;
    let x = ecdh::shared_x(&derived_priv, recipient_pub)?;
    let symkey = SymmetricKey::from_shared_x_modern(&x);
    let blob = symkey.encrypt(plaintext, &[]);

    let mut out = Vec::with_capacity(4 + 33 + 33 + 32 + blob.len());
    out.extend_from_slice(&ENVELOPE_VERSION.to_be_bytes());
    out.extend_from_slice(&sender_root.public_key().to_bytes_compressed());
    out.extend_from_slice(&recipient_pub.to_bytes_compressed());
    out.extend_from_slice(&key_id);
    out.extend_from_slice(&blob);
    Ok(out)
}

pub fn decrypt_message(recipient_root: &PrivateKey, envelope: &[u8]) -> Result<Vec<u8>> {
    if envelope.len() < 4 + 33 + 33 + 32 {
        return Err(Error::MalformedEncoding("message envelope too short"));
    }
    let version = u32::from_be_bytes(envelope[0..4].try_into().unwrap());
    if version != ENVELOPE_VERSION {
        return Err(Error::MalformedEncoding("unexpected message envelope version"));
    }
    let sender_pub = PublicKey::from_bytes(&envelope[4..37])?;
    let key_id = &envelope[70..102];
    let blob = &envelope[102..];

    let key_id_b64 = base64_encode(key_id);
    let invoice = invoice_for_key_id("message encryption", &key_id_b64)?;
    let derived_priv = derive_child_private_key(recipient_root, &sender_pub, &invoice)?;
    let x = ecdh::shared_x(&derived_priv, &sender_pub)?;
    let symkey = SymmetricKey::from_shared_x_modern(&x);
    symkey.decrypt(blob, &[])
}

/// BRC-77: `version(4) ∥ sender_pub(33) ∥ recipient_pub_or_anyone(33) ∥
/// key_id(32) ∥ DER-signature`.
pub fn sign_message(
    sender_root: &PrivateKey,
    recipient_pub: Option<&PublicKey>,
    message: &[u8],
) -> Result<Vec<u8>> {
    let mut key_id = [0u8; 32];
    OsRng.fill_bytes(&mut key_id);
    let key_id_b64 = base64_encode(&key_id);
    let invoice = invoice_for_key_id("message signing", &key_id_b64)?;

    let recipient = recipient_pub.copied().unwrap_or_else(anyone_public_key);
    let derived_priv = derive_child_private_key(sender_root, &recipient, &invoice)?;
    let digest = sha256(message);
    let sig = derived_priv.sign(&digest);
    let der = sig.to_der();

    let mut out = Vec::with_capacity(4 + 33 + 33 + 32 + der.len());
    out.extend_from_slice(&ENVELOPE_VERSION.to_be_bytes());
    out.extend_from_slice(&sender_root.public_key().to_bytes_compressed());
    out.extend_from_slice(&recipient.to_bytes_compressed());
    out.extend_from_slice(&key_id);
    out.extend_from_slice(&der);
    Ok(out)
}

/// Verifies a BRC-77 envelope. `recipient_private` is required only when
/// the envelope targeted a specific recipient (not `anyone`); supply
/// `None` for `anyone`-targeted messages.
pub fn verify_message(
    recipient_private: Option<&PrivateKey>,
    message: &[u8],
    envelope: &[u8],
) -> Result<bool> {
    if envelope.len() < 4 + 33 + 33 + 32 {
        return Err(Error::MalformedEncoding("message envelope too short"));
    }
    let version = u32::from_be_bytes(envelope[0..4].try_into().unwrap());
    if version != ENVELOPE_VERSION {
        return Err(Error::MalformedEncoding("unexpected message envelope version"));
    }
    let sender_pub = PublicKey::from_bytes(&envelope[4..37])?;
    let recipient_pub = PublicKey::from_bytes(&envelope[37..70])?;
    let key_id = &envelope[70..102];
    let der = &envelope[102..];

    let anyone = anyone_public_key();
    let recipient_key = if recipient_pub == anyone {
        None
    } else {
        Some(recipient_private.ok_or(Error::ConfigError(
            "verifying a recipient-targeted envelope requires the recipient's private key",
        ))?)
    };

    let key_id_b64 = base64_encode(key_id);
    let invoice = invoice_for_key_id("message signing", &key_id_b64)?;

    let expected_pub = if let Some(recipient_priv) = recipient_key {
        super::invoice::derive_child_public_key_for_counterparty(
            recipient_priv,
            &sender_pub,
            &invoice,
        )?
    } else {
        // Anyone-targeted: the signer derived with counterparty =
        // anyone = 1·G, so ECDH(sender_root, 1·G) = sender_root·G =
        // sender_pub itself. The verifier can reconstruct `h` from
        // `sender_pub` alone, with no private key.
        let h = crate::hash::hmac_sha256(&sender_pub.to_bytes_compressed(), invoice.as_bytes());
        let h_scalar = crate::secp256k1::scalar::Scalar::reduce(&h);
        anyone.add_point(crate::secp256k1::mul_generator(&h_scalar).point())
    };

    let sig = Signature::from_der(der)?;
    let digest = sha256(message);
    Ok(expected_pub.verify(&digest, &sig))
}

/// Minimal base64 (standard alphabet, with padding) used for envelope
/// key-id invoice components.
fn base64_encode(bytes: &[u8]) -> String {
    const ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::with_capacity((bytes.len() + 2) / 3 * 4);
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);
        out.push(ALPHABET[(b0 >> 2) as usize] as char);
        out.push(ALPHABET[(((b0 & 0x03) << 4) | (b1 >> 4)) as usize] as char);
        if chunk.len() > 1 {
            out.push(ALPHABET[(((b1 & 0x0F) << 2) | (b2 >> 6)) as usize] as char);
        } else {
            out.push('=');
        }
        if chunk.len() > 2 {
            out.push(ALPHABET[(b2 & 0x3F) as usize] as char);
        } else {
            out.push('=');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_message_round_trips() {
        let sender = PrivateKey::random();
        let recipient = PrivateKey::random();
        let envelope =
            encrypt_message(&sender, &recipient.public_key(), b"top secret payload").unwrap();
        let plaintext = decrypt_message(&recipient, &envelope).unwrap();
        assert_eq!(plaintext, b"top secret payload");
    }

    #[test]
    fn sign_then_verify_message_for_specific_recipient() {
        let sender = PrivateKey::random();
        let recipient = PrivateKey::random();
        let envelope =
            sign_message(&sender, Some(&recipient.public_key()), b"hello").unwrap();
        assert!(verify_message(Some(&recipient), b"hello", &envelope).unwrap());
    }

    #[test]
    fn base64_encode_matches_known_vector() {
        assert_eq!(base64_encode(b"man"), "bWFu");
        assert_eq!(base64_encode(b"ma"), "bWE=");
    }
}
