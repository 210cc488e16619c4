//! The secp256k1 scalar field `F_n`, `n` the order of the base point `G`.
//!
//! [`Scalar`] is the type private keys, ECDSA nonces, and signature
//! components (`r`, `s`) are expressed in. Like [`super::field::FieldElement`]
//! it is always stored reduced (`< N`).

use super::uint::{mod_add, mod_inverse, mod_mul, mod_sub, U256};
use crate::{Error, Result};
use std::ops::{Add, Mul, Sub};
use zeroize::Zeroize;

/// `n`, the order of the secp256k1 base point.
pub const N: U256 = U256([
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scalar(U256);

impl Scalar {
    pub const ZERO: Scalar = Scalar(U256::ZERO);
    pub const ONE: Scalar = Scalar(U256::ONE);

    /// Parses a big-endian 32-byte value, rejecting anything `>= n`.
    /// Does **not** reject zero; callers requiring a private key in
    /// `(0, n)` per spec §3 must additionally check [`Scalar::is_zero`].
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let v = U256::from_be_bytes(bytes);
        if v.cmp_to(&N) != std::cmp::Ordering::Less {
            return Err(Error::InvalidScalar);
        }
        Ok(Scalar(v))
    }

    /// Reduces an arbitrary 256-bit value modulo `n`, as required by RFC
    /// 6979's `bits2octets` step (valid to reduce by at most one
    /// subtraction when `qlen == hlen == 256`, per spec §4.4).
    #[must_use]
    pub fn reduce(bytes: &[u8; 32]) -> Self {
        let v = U256::from_be_bytes(bytes);
        if v.cmp_to(&N) == std::cmp::Ordering::Less {
            Scalar(v)
        } else {
            Scalar(v.sub_borrow(&N).0)
        }
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn invert(&self) -> Scalar {
        Scalar(mod_inverse(&self.0, &N))
    }

    /// `true` if `self > n/2`, the BIP-62 low-S threshold test.
    #[must_use]
    pub fn is_high(&self) -> bool {
        // n/2, precomputed: floor(N / 2).
        const HALF_N: U256 = U256([
            0xDFE9_2F46_681B_20A0,
            0x5D57_6E73_57A4_501D,
            0xFFFF_FFFF_FFFF_FFFF,
            0x7FFF_FFFF_FFFF_FFFF,
        ]);
        self.0.cmp_to(&HALF_N) == std::cmp::Ordering::Greater
    }

    /// `n - self`, used to normalize a high-S signature to low-S.
    #[must_use]
    pub fn negate_mod_n(&self) -> Scalar {
        Scalar(N.sub_borrow(&self.0).0)
    }

    #[must_use]
    pub(crate) fn raw(&self) -> U256 {
        self.0
    }

    pub(crate) fn from_raw(v: U256) -> Self {
        Scalar(v)
    }
}

impl Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar(mod_add(&self.0, &rhs.0, &N))
    }
}

impl Sub for Scalar {
    type Output = Scalar;
    fn sub(self, rhs: Scalar) -> Scalar {
        Scalar(mod_sub(&self.0, &rhs.0, &N))
    }
}

impl Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar(mod_mul(&self.0, &rhs.0, &N))
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0 .0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_n_constant_matches_division() {
        let two = U256([2, 0, 0, 0]);
        let computed = {
            // n is odd, so n/2 here means floor division.
            let (shifted, _) = (N, ());
            let _ = shifted;
            N.shr1()
        };
        let half = Scalar(computed);
        assert!(!half.is_high());
        let _ = two;
    }

    #[test]
    fn invert_round_trips() {
        let s = Scalar::from_bytes(&{
            let mut b = [0u8; 32];
            b[31] = 5;
            b
        })
        .unwrap();
        let inv = s.invert();
        assert_eq!(s * inv, Scalar::ONE);
    }
}
