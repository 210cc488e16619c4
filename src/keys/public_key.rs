//! Public keys: a thin, `Copy`-friendly wrapper over a curve [`Point`].

use crate::ecdsa::{self, Signature};
use crate::secp256k1::Point;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(Point);

impl PublicKey {
    pub(crate) fn from_point(point: Point) -> Self {
        PublicKey(point)
    }

    pub(crate) fn point(&self) -> &Point {
        &self.0
    }

    /// Parses a SEC1 compressed (33-byte) or uncompressed (65-byte)
    /// encoding, rejecting the point at infinity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let point = Point::from_sec1(bytes)?;
        if point.is_infinity() {
            return Err(Error::InvalidCurvePoint);
        }
        Ok(PublicKey(point))
    }

    #[must_use]
    pub fn to_bytes_compressed(&self) -> [u8; 33] {
        self.0.to_sec1_compressed()
    }

    #[must_use]
    pub fn to_bytes_uncompressed(&self) -> [u8; 65] {
        self.0.to_sec1_uncompressed()
    }

    #[must_use]
    pub fn verify(&self, digest: &[u8; 32], sig: &Signature) -> bool {
        ecdsa::verify(&self.0, digest, sig)
    }

    #[must_use]
    pub fn add_point(&self, other: &Point) -> Self {
        PublicKey(self.0.add(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secp256k1::scalar::Scalar;

    #[test]
    fn compressed_round_trips() {
        let mut bytes = [0u8; 32];
        bytes[31] = 5;
        let d = Scalar::from_bytes(&bytes).unwrap();
        let pk = PublicKey::from_point(crate::secp256k1::mul_generator(&d));
        let encoded = pk.to_bytes_compressed();
        let decoded = PublicKey::from_bytes(&encoded).unwrap();
        assert_eq!(decoded, pk);
    }
}
