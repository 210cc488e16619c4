//! `ProtoWallet` (spec §4.10): a key-deriver-backed facade exposing
//! encryption, signing, and HMAC scoped to `(protocol, key_id,
//! counterparty)`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::hash::{hmac_sha256, secure_compare};
use crate::keys::ecdh;
use crate::keys::private_key::PrivateKey;
use crate::keys::public_key::PublicKey;
use crate::keys::symmetric_key::SymmetricKey;
use crate::secp256k1::FieldElement;
use crate::{Error, Result};

use super::invoice::{
    compute_invoice_number, derive_child_private_key, derive_child_public_key_for_counterparty,
    Counterparty,
};

/// Arguments shared by every `ProtoWallet` operation. `counterparty` is
/// `None` until the caller sets one explicitly with
/// [`EncryptionArgs::with_counterparty`]; each operation resolves an unset
/// counterparty to its own default (spec §4.10).
#[derive(Debug, Clone)]
pub struct EncryptionArgs<'a> {
    pub protocol: &'a str,
    pub key_id: &'a str,
    pub counterparty: Option<Counterparty>,
    pub privileged: bool,
    pub privileged_reason: Option<&'a str>,
}

impl<'a> EncryptionArgs<'a> {
    #[must_use]
    pub fn new(protocol: &'a str, key_id: &'a str) -> Self {
        EncryptionArgs {
            protocol,
            key_id,
            counterparty: None,
            privileged: false,
            privileged_reason: None,
        }
    }

    #[must_use]
    pub fn with_counterparty(mut self, counterparty: Counterparty) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    /// Resolves the counterparty the caller set, or `default` if none was
    /// set.
    fn resolved_counterparty(&self, default: Counterparty) -> Counterparty {
        self.counterparty.unwrap_or(default)
    }
}

/// A wallet backed by a single root key pair, deriving every child key,
/// symmetric key, and signature through BRC-42/43.
pub struct ProtoWallet {
    root: PrivateKey,
}

impl ProtoWallet {
    #[must_use]
    pub fn new(root: PrivateKey) -> Self {
        ProtoWallet { root }
    }

    fn resolve_counterparty_for_kdf(&self, counterparty: Counterparty) -> PublicKey {
        match counterparty {
            Counterparty::SelfParty => self.root.public_key(),
            Counterparty::Anyone => PublicKey::from_point(crate::secp256k1::mul_generator(
                &crate::secp256k1::scalar::Scalar::ONE,
            )),
            Counterparty::Other(pubkey) => pubkey,
        }
    }

    fn invoice(&self, security_level: u8, args: &EncryptionArgs) -> Result<String> {
        compute_invoice_number(security_level, args.protocol, args.key_id)
    }

    /// Derives the public key for `args`'s scope. An unset counterparty
    /// defaults to `self` (spec §4.10).
    #[must_use]
    pub fn get_public_key(&self, args: &EncryptionArgs) -> Result<PublicKey> {
        let counterparty =
            self.resolve_counterparty_for_kdf(args.resolved_counterparty(Counterparty::SelfParty));
        let invoice = self.invoice(2, args)?;
        let child_priv = derive_child_private_key(&self.root, &counterparty, &invoice)?;
        Ok(child_priv.public_key())
    }

    fn derived_shared_x(&self, args: &EncryptionArgs) -> Result<FieldElement> {
        let counterparty =
            self.resolve_counterparty_for_kdf(args.resolved_counterparty(Counterparty::SelfParty));
        let invoice = self.invoice(2, args)?;
        let derived_priv = derive_child_private_key(&self.root, &counterparty, &invoice)?;
        let derived_pub =
            derive_child_public_key_for_counterparty(&self.root, &counterparty, &invoice)?;
        ecdh::shared_x(&derived_priv, &derived_pub)
    }

    pub fn encrypt(&self, args: &EncryptionArgs, plaintext: &[u8]) -> Result<Vec<u8>> {
        let x = self.derived_shared_x(args)?;
        let key = SymmetricKey::from_shared_x_modern(&x);
        Ok(key.encrypt(plaintext, &[]))
    }

    /// Tries the modern KDF with a 12-byte IV first, then the legacy KDF
    /// (raw x-coordinate) with both IV layouts, failing only if every
    /// combination's AEAD tag check fails.
    pub fn decrypt(&self, args: &EncryptionArgs, envelope: &[u8]) -> Result<Vec<u8>> {
        let x = self.derived_shared_x(args)?;
        let modern = SymmetricKey::from_shared_x_modern(&x);
        if let Ok(plaintext) = modern.decrypt(envelope, &[]) {
            return Ok(plaintext);
        }
        let legacy = SymmetricKey::from_shared_x_legacy(&x);
        if let Ok(plaintext) = legacy.decrypt(envelope, &[]) {
            return Ok(plaintext);
        }
        if let Ok(plaintext) = legacy.decrypt_legacy_iv(envelope, &[]) {
            return Ok(plaintext);
        }
        Err(Error::DecryptFailed)
    }

    /// `create_signature` defaults the counterparty to `anyone` when the
    /// caller leaves it unset (spec §4.10) — the one operation whose
    /// default differs from the rest of `ProtoWallet`, which default to
    /// `self`.
    pub fn create_signature(&self, args: &EncryptionArgs, digest: &[u8; 32]) -> Result<crate::ecdsa::Signature> {
        let counterparty =
            self.resolve_counterparty_for_kdf(args.resolved_counterparty(Counterparty::Anyone));
        let invoice = self.invoice(2, args)?;
        let derived_priv = derive_child_private_key(&self.root, &counterparty, &invoice)?;
        Ok(derived_priv.sign(digest))
    }

    /// Verifies `sig` against the public key `args` derives. An unset
    /// counterparty defaults to `self` (spec §4.10); to check a signature
    /// created under `create_signature`'s default (`anyone`), pass
    /// `args.with_counterparty(Counterparty::Anyone)` explicitly.
    pub fn verify_signature(
        &self,
        args: &EncryptionArgs,
        digest: &[u8; 32],
        sig: &crate::ecdsa::Signature,
    ) -> Result<bool> {
        let pubkey = self.get_public_key(args)?;
        Ok(pubkey.verify(digest, sig))
    }

    pub fn create_hmac(&self, args: &EncryptionArgs, data: &[u8]) -> Result<[u8; 32]> {
        let x = self.derived_shared_x(args)?;
        let key = SymmetricKey::from_shared_x_modern(&x);
        Ok(hmac_with_symmetric_key(&key, data))
    }

    /// Checks `mac` against the modern key first, then the legacy key,
    /// using constant-time comparison for both.
    pub fn verify_hmac(&self, args: &EncryptionArgs, data: &[u8], mac: &[u8; 32]) -> Result<bool> {
        let x = self.derived_shared_x(args)?;
        let modern = SymmetricKey::from_shared_x_modern(&x);
        if secure_compare(&hmac_with_symmetric_key(&modern, data), mac) {
            return Ok(true);
        }
        let legacy = SymmetricKey::from_shared_x_legacy(&x);
        Ok(secure_compare(&hmac_with_symmetric_key(&legacy, data), mac))
    }

    /// BRC-31 auth nonce: `base64(random(16) ∥ hmac(random))`, where the
    /// HMAC key is derived under `(security_level=1, protocol="server
    /// hmac", key_id=str(random_bytes))` so only this wallet's root key
    /// can mint or check one of its own nonces.
    pub fn create_nonce(&self) -> Result<String> {
        let mut random = [0u8; 16];
        OsRng.fill_bytes(&mut random);
        let mac = self.nonce_hmac(&random)?;
        let mut out = Vec::with_capacity(32);
        out.extend_from_slice(&random);
        out.extend_from_slice(&mac);
        Ok(BASE64.encode(out))
    }

    /// Recomputes the HMAC over the nonce's random prefix and compares it
    /// in constant time against the suffix the nonce carries.
    pub fn verify_nonce(&self, nonce: &str) -> Result<bool> {
        let bytes = BASE64
            .decode(nonce)
            .map_err(|_| Error::MalformedEncoding("BRC-31 nonce is not valid base64"))?;
        if bytes.len() != 48 {
            return Ok(false);
        }
        let (random, mac) = bytes.split_at(16);
        let expected = self.nonce_hmac(random)?;
        Ok(secure_compare(&expected, mac))
    }

    fn nonce_hmac(&self, random: &[u8]) -> Result<[u8; 32]> {
        let key_id = hex::encode(random);
        let args = EncryptionArgs::new("server hmac", &key_id);
        let x = self.derived_shared_x_at(1, &args)?;
        let key = SymmetricKey::from_shared_x_modern(&x);
        Ok(hmac_with_symmetric_key(&key, random))
    }

    fn derived_shared_x_at(&self, security_level: u8, args: &EncryptionArgs) -> Result<FieldElement> {
        let counterparty =
            self.resolve_counterparty_for_kdf(args.resolved_counterparty(Counterparty::SelfParty));
        let invoice = compute_invoice_number(security_level, args.protocol, args.key_id)?;
        let derived_priv = derive_child_private_key(&self.root, &counterparty, &invoice)?;
        let derived_pub =
            derive_child_public_key_for_counterparty(&self.root, &counterparty, &invoice)?;
        ecdh::shared_x(&derived_priv, &derived_pub)
    }
}

fn hmac_with_symmetric_key(key: &SymmetricKey, data: &[u8]) -> [u8; 32] {
    hmac_sha256(key.as_bytes(), data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_round_trips_for_self() {
        let wallet = ProtoWallet::new(PrivateKey::random());
        let args = EncryptionArgs::new("test protocol", "id-1");
        let ciphertext = wallet.encrypt(&args, b"hello proto wallet").unwrap();
        let plaintext = wallet.decrypt(&args, &ciphertext).unwrap();
        assert_eq!(plaintext, b"hello proto wallet");
    }

    #[test]
    fn create_signature_verifies_against_matching_counterparty() {
        let wallet = ProtoWallet::new(PrivateKey::random());
        // create_signature's unset counterparty defaults to `anyone`;
        // verify_signature's defaults to `self`, so a verifier checking a
        // default-created signature must opt into the same counterparty
        // explicitly.
        let sign_args = EncryptionArgs::new("sig protocol", "id-2");
        let verify_args =
            EncryptionArgs::new("sig protocol", "id-2").with_counterparty(Counterparty::Anyone);
        let digest = crate::hash::sha256(b"message");
        let sig = wallet.create_signature(&sign_args, &digest).unwrap();
        assert!(wallet.verify_signature(&verify_args, &digest, &sig).unwrap());
    }

    #[test]
    fn create_signature_default_counterparty_is_anyone() {
        let wallet = ProtoWallet::new(PrivateKey::random());
        let sign_args = EncryptionArgs::new("sig protocol", "id-2");
        let anyone_args =
            EncryptionArgs::new("sig protocol", "id-2").with_counterparty(Counterparty::Anyone);
        let self_args =
            EncryptionArgs::new("sig protocol", "id-2").with_counterparty(Counterparty::SelfParty);

        let digest = crate::hash::sha256(b"message");
        let sig = wallet.create_signature(&sign_args, &digest).unwrap();

        assert!(wallet.verify_signature(&anyone_args, &digest, &sig).unwrap());
        assert!(!wallet.verify_signature(&self_args, &digest, &sig).unwrap());
    }

    #[test]
    fn hmac_round_trips() {
        let wallet = ProtoWallet::new(PrivateKey::random());
        let args = EncryptionArgs::new("hmac protocol", "id-3");
        let mac = wallet.create_hmac(&args, b"hmac payload").unwrap();
        assert!(wallet.verify_hmac(&args, b"hmac payload", &mac).unwrap());
        assert!(!wallet.verify_hmac(&args, b"tampered", &mac).unwrap());
    }

    #[test]
    fn nonce_round_trips_and_rejects_tampering() {
        let wallet = ProtoWallet::new(PrivateKey::random());
        let nonce = wallet.create_nonce().unwrap();
        assert!(wallet.verify_nonce(&nonce).unwrap());

        let other_wallet = ProtoWallet::new(PrivateKey::random());
        assert!(!other_wallet.verify_nonce(&nonce).unwrap());
    }

    #[test]
    fn nonce_rejects_malformed_base64() {
        let wallet = ProtoWallet::new(PrivateKey::random());
        assert!(wallet.verify_nonce("not base64!!").is_err());
    }

    #[test]
    fn different_counterparties_derive_different_keys() {
        let wallet = ProtoWallet::new(PrivateKey::random());
        let args_self = EncryptionArgs::new("p", "id");
        let args_other =
            EncryptionArgs::new("p", "id").with_counterparty(Counterparty::Other(
                PrivateKey::random().public_key(),
            ));
        assert_ne!(
            wallet.get_public_key(&args_self).unwrap(),
            wallet.get_public_key(&args_other).unwrap()
        );
    }
}
