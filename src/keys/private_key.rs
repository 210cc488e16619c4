//! Private keys: a secp256k1 scalar in `(0, n)`, with signing, public-key
//! derivation, and WIF import/export.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use super::public_key::PublicKey;
use super::wif;
use crate::config::Network;
use crate::ecdsa::{self, Signature};
use crate::secp256k1::scalar::Scalar;
use crate::secp256k1::mul_generator;
use crate::{Error, Result};

#[derive(Clone)]
pub struct PrivateKey(Scalar);

impl PrivateKey {
    /// Parses a 32-byte big-endian scalar, rejecting `0` and anything
    /// `>= n` (spec §3).
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let scalar = Scalar::from_bytes(bytes).map_err(|_| Error::InvalidScalar)?;
        if scalar.is_zero() {
            return Err(Error::InvalidScalar);
        }
        Ok(PrivateKey(scalar))
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Generates a private key from OS randomness, retrying on the
    /// astronomically unlikely event of a zero or out-of-range scalar.
    #[must_use]
    pub fn random() -> Self {
        loop {
            let mut bytes = [0u8; 32];
            OsRng.fill_bytes(&mut bytes);
            if let Ok(key) = PrivateKey::from_bytes(&bytes) {
                return key;
            }
        }
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_point(mul_generator(&self.0))
    }

    #[must_use]
    pub fn sign(&self, digest: &[u8; 32]) -> Signature {
        ecdsa::sign(&self.0, digest)
    }

    #[must_use]
    pub fn verify(&self, digest: &[u8; 32], sig: &Signature) -> bool {
        self.public_key().verify(digest, sig)
    }

    #[must_use]
    pub fn to_wif(&self, network: Network, compressed: bool) -> String {
        wif::encode(self, network, compressed)
    }

    pub fn from_wif(s: &str) -> Result<(Self, Network, bool)> {
        wif::decode(s)
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }

    pub(crate) fn from_scalar(scalar: Scalar) -> Self {
        PrivateKey(scalar)
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey").field("d", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_keys_are_in_range_and_sign() {
        let key = PrivateKey::random();
        let digest = crate::hash::sha256(b"msg");
        let sig = key.sign(&digest);
        assert!(key.verify(&digest, &sig));
    }

    #[test]
    fn rejects_zero_scalar() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn wif_round_trips() {
        let key = PrivateKey::random();
        let wif = key.to_wif(Network::Mainnet, true);
        let (decoded, network, compressed) = PrivateKey::from_wif(&wif).unwrap();
        assert_eq!(decoded.to_bytes(), key.to_bytes());
        assert_eq!(network, Network::Mainnet);
        assert!(compressed);
    }
}
