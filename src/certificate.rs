//! BRC-31 identity certificates: binary layout, signing, and per-field
//! selective-disclosure encryption (spec §4.12, §6).

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::ecdsa::Signature;
use crate::hash::sha256;
use crate::keys::private_key::PrivateKey;
use crate::keys::public_key::PublicKey;
use crate::keys::symmetric_key::SymmetricKey;
use crate::secp256k1::scalar::Scalar;
use crate::util::varint;
use crate::wallet::invoice::Counterparty;
use crate::wallet::protocol::{EncryptionArgs, ProtoWallet};
use crate::{Error, Result};

const CERTIFICATE_SIGNATURE_PROTOCOL: &str = "certificate signature";
const CERTIFICATE_FIELD_ENCRYPTION_PROTOCOL: &str = "certificate field encryption";

/// A BRC-31 identity certificate: who certified what, about whom, plus
/// whatever fields the certifier attests to. `fields` holds values in
/// whatever form they were given to [`Certificate::new`] — plaintext for
/// an unencrypted certificate, or base64 AES-256-GCM envelopes once
/// [`MasterCertificate::new`] has encrypted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub cert_type: [u8; 32],
    pub serial: [u8; 32],
    pub subject: PublicKey,
    pub certifier: PublicKey,
    pub revocation_txid: [u8; 32],
    pub revocation_vout: u32,
    /// Field name → value, kept sorted ascending by name (a `BTreeMap`
    /// guarantees this regardless of insertion order, which is what makes
    /// repeated `serialize` calls byte-identical).
    pub fields: BTreeMap<String, String>,
    pub signature: Option<Signature>,
}

impl Certificate {
    #[must_use]
    pub fn new(
        cert_type: [u8; 32],
        serial: [u8; 32],
        subject: PublicKey,
        certifier: PublicKey,
        revocation_txid: [u8; 32],
        revocation_vout: u32,
        fields: BTreeMap<String, String>,
    ) -> Self {
        Certificate {
            cert_type,
            serial,
            subject,
            certifier,
            revocation_txid,
            revocation_vout,
            fields,
            signature: None,
        }
    }

    fn serialize_unsigned(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.cert_type);
        out.extend_from_slice(&self.serial);
        out.extend_from_slice(&self.subject.to_bytes_compressed());
        out.extend_from_slice(&self.certifier.to_bytes_compressed());
        out.extend_from_slice(&self.revocation_txid);
        out.extend_from_slice(&self.revocation_vout.to_le_bytes());
        out.extend_from_slice(&varint::encode(self.fields.len() as u64));
        for (name, value) in &self.fields {
            out.extend_from_slice(&varint::encode(name.len() as u64));
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(&varint::encode(value.len() as u64));
            out.extend_from_slice(value.as_bytes());
        }
        out
    }

    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = self.serialize_unsigned();
        if let Some(sig) = &self.signature {
            let der = sig.to_der();
            out.extend_from_slice(&varint::encode(der.len() as u64));
            out.extend_from_slice(&der);
        }
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0usize;
        let cert_type = take_fixed::<32>(bytes, &mut cursor)?;
        let serial = take_fixed::<32>(bytes, &mut cursor)?;
        let subject = PublicKey::from_bytes(take_slice(bytes, &mut cursor, 33)?)?;
        let certifier = PublicKey::from_bytes(take_slice(bytes, &mut cursor, 33)?)?;
        let revocation_txid = take_fixed::<32>(bytes, &mut cursor)?;
        let revocation_vout = u32::from_le_bytes(take_fixed::<4>(bytes, &mut cursor)?);

        let (field_count, width) = varint::decode(&bytes[cursor..], None)?;
        cursor += width;
        let mut fields = BTreeMap::new();
        for _ in 0..field_count {
            let (name_len, width) = varint::decode(&bytes[cursor..], None)?;
            cursor += width;
            let name = String::from_utf8(take_slice(bytes, &mut cursor, name_len as usize)?.to_vec())
                .map_err(|_| Error::MalformedEncoding("certificate field name is not valid UTF-8"))?;
            let (val_len, width) = varint::decode(&bytes[cursor..], None)?;
            cursor += width;
            let value = String::from_utf8(take_slice(bytes, &mut cursor, val_len as usize)?.to_vec())
                .map_err(|_| Error::MalformedEncoding("certificate field value is not valid UTF-8"))?;
            fields.insert(name, value);
        }

        let signature = if cursor < bytes.len() {
            let (sig_len, width) = varint::decode(&bytes[cursor..], None)?;
            cursor += width;
            let der = take_slice(bytes, &mut cursor, sig_len as usize)?;
            Some(Signature::from_der(der)?)
        } else {
            None
        };

        Ok(Certificate {
            cert_type,
            serial,
            subject,
            certifier,
            revocation_txid,
            revocation_vout,
            fields,
            signature,
        })
    }

    fn key_id(&self) -> String {
        format!("{} {}", hex::encode(self.cert_type), hex::encode(self.serial))
    }

    fn signing_digest(&self) -> [u8; 32] {
        sha256(&self.serialize_unsigned())
    }

    /// Signs the certificate with `certifier_wallet`, whose root key must
    /// belong to [`Self::certifier`]. Per spec, signing always derives
    /// under `counterparty = anyone`.
    pub fn sign(&mut self, certifier_wallet: &ProtoWallet) -> Result<()> {
        let key_id = self.key_id();
        let args = EncryptionArgs::new(CERTIFICATE_SIGNATURE_PROTOCOL, &key_id)
            .with_counterparty(Counterparty::Anyone);
        let digest = self.signing_digest();
        self.signature = Some(certifier_wallet.create_signature(&args, &digest)?);
        Ok(())
    }

    /// Verifies the stored signature against [`Self::certifier`], using a
    /// wallet rooted at the shared "anyone" key (scalar `1`) as the spec
    /// requires for the verifying side of this asymmetric derivation.
    pub fn verify(&self) -> Result<bool> {
        let sig = self
            .signature
            .as_ref()
            .ok_or(Error::InvariantViolation("certificate has no signature to verify"))?;
        let key_id = self.key_id();
        let args = EncryptionArgs::new(CERTIFICATE_SIGNATURE_PROTOCOL, &key_id)
            .with_counterparty(Counterparty::Other(self.certifier));
        let anyone_wallet = ProtoWallet::new(PrivateKey::from_scalar(Scalar::ONE));
        let digest = self.signing_digest();
        anyone_wallet.verify_signature(&args, &digest, sig)
    }
}

/// A [`Certificate`] whose field values are AES-256-GCM ciphertext,
/// alongside the per-field symmetric key encrypted for the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterCertificate {
    pub certificate: Certificate,
    /// Field name → base64 envelope of that field's symmetric key,
    /// encrypted for [`Certificate::subject`].
    pub encrypted_field_keys: BTreeMap<String, String>,
}

impl MasterCertificate {
    /// Encrypts every field in `plaintext_fields` for `subject`, signs the
    /// resulting certificate with `certifier_wallet`, and returns the
    /// sealed master certificate plus its field-key map.
    pub fn new(
        cert_type: [u8; 32],
        serial: [u8; 32],
        subject: PublicKey,
        certifier_wallet: &ProtoWallet,
        certifier: PublicKey,
        revocation_txid: [u8; 32],
        revocation_vout: u32,
        plaintext_fields: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut encrypted_fields = BTreeMap::new();
        let mut encrypted_field_keys = BTreeMap::new();

        for (name, value) in &plaintext_fields {
            let mut symkey_bytes = [0u8; 32];
            OsRng.fill_bytes(&mut symkey_bytes);
            let symkey = SymmetricKey::from_bytes(symkey_bytes);
            let value_envelope = symkey.encrypt(value.as_bytes(), &[]);
            encrypted_fields.insert(name.clone(), BASE64.encode(value_envelope));

            let args = EncryptionArgs::new(CERTIFICATE_FIELD_ENCRYPTION_PROTOCOL, name)
                .with_counterparty(Counterparty::Other(subject));
            let key_envelope = certifier_wallet.encrypt(&args, &symkey_bytes)?;
            encrypted_field_keys.insert(name.clone(), BASE64.encode(key_envelope));
        }

        let mut certificate = Certificate::new(
            cert_type,
            serial,
            subject,
            certifier,
            revocation_txid,
            revocation_vout,
            encrypted_fields,
        );
        certificate.sign(certifier_wallet)?;

        Ok(MasterCertificate {
            certificate,
            encrypted_field_keys,
        })
    }

    /// The subject reveals `field_names` to `verifier`: decrypts each
    /// selected field's symmetric key (derived against the certifier) and
    /// re-encrypts it under `key_id = "{serial} {field}"` keyed for the
    /// verifier. The returned map travels alongside [`Self::certificate`]
    /// as the verifier's keyring.
    pub fn build_verifier_keyring(
        &self,
        subject_wallet: &ProtoWallet,
        verifier: PublicKey,
        field_names: &[&str],
    ) -> Result<BTreeMap<String, String>> {
        let mut keyring = BTreeMap::new();
        for &name in field_names {
            let key_envelope_b64 = self
                .encrypted_field_keys
                .get(name)
                .ok_or(Error::InvariantViolation("no encrypted key for requested field"))?;
            let key_envelope = BASE64
                .decode(key_envelope_b64)
                .map_err(|_| Error::MalformedEncoding("field key envelope is not valid base64"))?;

            let decrypt_args =
                EncryptionArgs::new(CERTIFICATE_FIELD_ENCRYPTION_PROTOCOL, name)
                    .with_counterparty(Counterparty::Other(self.certificate.certifier));
            let symkey_bytes = subject_wallet.decrypt(&decrypt_args, &key_envelope)?;

            let reveal_key_id = format!("{} {}", hex::encode(self.certificate.serial), name);
            let reveal_args =
                EncryptionArgs::new(CERTIFICATE_FIELD_ENCRYPTION_PROTOCOL, &reveal_key_id)
                    .with_counterparty(Counterparty::Other(verifier));
            let reveal_envelope = subject_wallet.encrypt(&reveal_args, &symkey_bytes)?;
            keyring.insert(name.to_string(), BASE64.encode(reveal_envelope));
        }
        Ok(keyring)
    }
}

/// The verifier's side of [`MasterCertificate::build_verifier_keyring`]:
/// decrypts every field named in `verifier_keyring` out of `certificate`.
pub fn decrypt_fields(
    certificate: &Certificate,
    verifier_keyring: &BTreeMap<String, String>,
    verifier_wallet: &ProtoWallet,
) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for (name, key_envelope_b64) in verifier_keyring {
        let value_envelope_b64 = match certificate.fields.get(name) {
            Some(v) => v,
            None => continue,
        };
        let key_envelope = BASE64
            .decode(key_envelope_b64)
            .map_err(|_| Error::MalformedEncoding("field key envelope is not valid base64"))?;
        let reveal_key_id = format!("{} {}", hex::encode(certificate.serial), name);
        let args = EncryptionArgs::new(CERTIFICATE_FIELD_ENCRYPTION_PROTOCOL, &reveal_key_id)
            .with_counterparty(Counterparty::Other(certificate.subject));
        let symkey_bytes = verifier_wallet.decrypt(&args, &key_envelope)?;
        let symkey_arr: [u8; 32] = symkey_bytes
            .try_into()
            .map_err(|_| Error::MalformedEncoding("field symmetric key is not 32 bytes"))?;
        let symkey = SymmetricKey::from_bytes(symkey_arr);

        let value_envelope = BASE64
            .decode(value_envelope_b64)
            .map_err(|_| Error::MalformedEncoding("field value envelope is not valid base64"))?;
        let plaintext = symkey.decrypt(&value_envelope, &[])?;
        let value = String::from_utf8(plaintext)
            .map_err(|_| Error::MalformedEncoding("decrypted field value is not valid UTF-8"))?;
        out.insert(name.clone(), value);
    }
    Ok(out)
}

fn take_fixed<const N: usize>(bytes: &[u8], cursor: &mut usize) -> Result<[u8; N]> {
    let slice = bytes
        .get(*cursor..*cursor + N)
        .ok_or(Error::MalformedLength("certificate field truncated"))?;
    *cursor += N;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

fn take_slice<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8]> {
    let slice = bytes
        .get(*cursor..*cursor + len)
        .ok_or(Error::MalformedLength("certificate field truncated"))?;
    *cursor += len;
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_unsigned() -> Certificate {
        let mut fields = BTreeMap::new();
        fields.insert("age".to_string(), "33".to_string());
        fields.insert("name".to_string(), "satoshi".to_string());
        Certificate::new(
            [0xAA; 32],
            [0xBB; 32],
            PrivateKey::random().public_key(),
            PrivateKey::random().public_key(),
            [0xCC; 32],
            1,
            fields,
        )
    }

    #[test]
    fn round_trips_unsigned_serialization() {
        let cert = sample_unsigned();
        let bytes = cert.serialize();
        assert_eq!(Certificate::parse(&bytes).unwrap(), cert);
    }

    #[test]
    fn round_trips_signed_serialization_and_verifies() {
        let certifier_key = PrivateKey::random();
        let mut cert = sample_unsigned();
        cert.certifier = certifier_key.public_key();
        let wallet = ProtoWallet::new(certifier_key);
        cert.sign(&wallet).unwrap();

        let bytes = cert.serialize();
        let parsed = Certificate::parse(&bytes).unwrap();
        assert_eq!(parsed, cert);
        assert!(parsed.verify().unwrap());
    }

    #[test]
    fn tampering_with_a_field_breaks_verification() {
        let certifier_key = PrivateKey::random();
        let mut cert = sample_unsigned();
        cert.certifier = certifier_key.public_key();
        let wallet = ProtoWallet::new(certifier_key);
        cert.sign(&wallet).unwrap();

        cert.fields.insert("age".to_string(), "34".to_string());
        assert!(!cert.verify().unwrap());
    }

    #[test]
    fn serialization_is_stable_regardless_of_field_insertion_order() {
        let mut a = BTreeMap::new();
        a.insert("b".to_string(), "2".to_string());
        a.insert("a".to_string(), "1".to_string());
        let mut b = BTreeMap::new();
        b.insert("a".to_string(), "1".to_string());
        b.insert("b".to_string(), "2".to_string());

        let subject = PrivateKey::random().public_key();
        let certifier = PrivateKey::random().public_key();
        let cert_a = Certificate::new([1; 32], [2; 32], subject, certifier, [3; 32], 0, a);
        let cert_b = Certificate::new([1; 32], [2; 32], subject, certifier, [3; 32], 0, b);
        assert_eq!(cert_a.serialize(), cert_b.serialize());
    }

    #[test]
    fn selective_disclosure_round_trips_through_verifier_keyring() {
        let certifier_key = PrivateKey::random();
        let subject_key = PrivateKey::random();
        let verifier_key = PrivateKey::random();

        let mut plaintext_fields = BTreeMap::new();
        plaintext_fields.insert("country".to_string(), "US".to_string());
        plaintext_fields.insert("over18".to_string(), "true".to_string());

        let certifier_wallet = ProtoWallet::new(certifier_key);
        let master = MasterCertificate::new(
            [1; 32],
            [2; 32],
            subject_key.public_key(),
            &certifier_wallet,
            certifier_key.public_key(),
            [3; 32],
            0,
            plaintext_fields,
        )
        .unwrap();
        assert!(master.certificate.verify().unwrap());

        let subject_wallet = ProtoWallet::new(subject_key);
        let keyring = master
            .build_verifier_keyring(&subject_wallet, verifier_key.public_key(), &["over18"])
            .unwrap();

        let verifier_wallet = ProtoWallet::new(verifier_key);
        let revealed = decrypt_fields(&master.certificate, &keyring, &verifier_wallet).unwrap();
        assert_eq!(revealed.get("over18"), Some(&"true".to_string()));
        assert_eq!(revealed.get("country"), None);
    }
}
