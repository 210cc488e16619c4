//! The secp256k1 base field `F_p`, `p = 2^256 - 2^32 - 977`.
//!
//! [`FieldElement`] wraps a reduced [`U256`] and overloads the standard
//! arithmetic operators so point arithmetic in [`crate::secp256k1::point`]
//! reads as ordinary algebra rather than a sequence of free-function calls.

use super::uint::{mod_add, mod_inverse, mod_mul, mod_pow, mod_sub, U256};
use crate::{Error, Result};
use std::ops::{Add, Mul, Neg, Sub};

/// `p = 2^256 - 2^32 - 977`.
pub const P: U256 = U256([
    0xFFFF_FFFE_FFFF_FC2F,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF,
]);

/// An element of `F_p`, always stored fully reduced (`< P`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldElement(U256);

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement(U256::ZERO);
    pub const ONE: FieldElement = FieldElement(U256::ONE);

    /// `7`, the secp256k1 curve constant `b` in `y^2 = x^3 + b`.
    pub const CURVE_B: FieldElement = FieldElement(U256([7, 0, 0, 0]));

    /// Wraps a raw, already-reduced limb value. Only used for constants
    /// defined in this module; general callers should use
    /// [`FieldElement::from_bytes`].
    const fn from_raw(v: U256) -> Self {
        FieldElement(v)
    }

    /// Parses a big-endian 32-byte value, rejecting anything `>= p`.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let v = U256::from_be_bytes(bytes);
        if v.cmp_to(&P) != std::cmp::Ordering::Less {
            return Err(Error::InvalidCurvePoint);
        }
        Ok(FieldElement(v))
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
    pub fn is_odd(&self) -> bool {
        !self.0.is_even()
    }

    #[must_use]
    pub fn square(&self) -> FieldElement {
        FieldElement(mod_mul(&self.0, &self.0, &P))
    }

    /// Multiplicative inverse. Undefined (returns zero) for zero input;
    /// callers must never invoke this on zero, consistent with the
    /// partial-function caveats throughout the point-arithmetic module.
    #[must_use]
    pub fn invert(&self) -> FieldElement {
        if self.0.is_zero() {
            return FieldElement::ZERO;
        }
        FieldElement(mod_inverse(&self.0, &P))
    }

    /// `self^((p+1)/4) mod p`, a square root candidate valid because
    /// `p ≡ 3 (mod 4)` for secp256k1. Callers must verify the result by
    /// squaring it back, since this computes *a* root, not necessarily
    /// one that exists.
    #[must_use]
    pub fn sqrt_candidate(&self) -> FieldElement {
        // (p + 1) / 4
        let exponent = U256([
            0xFFFF_FFFF_BFFF_FF0C,
            0xFFFF_FFFF_FFFF_FFFF,
            0xFFFF_FFFF_FFFF_FFFF,
            0x3FFF_FFFF_FFFF_FFFF,
        ]);
        FieldElement(mod_pow(&self.0, &exponent, &P))
    }

    #[must_use]
    pub(crate) fn raw(&self) -> U256 {
        self.0
    }
}

impl Add for FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: FieldElement) -> FieldElement {
        FieldElement(mod_add(&self.0, &rhs.0, &P))
    }
}

impl Sub for FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: FieldElement) -> FieldElement {
        FieldElement(mod_sub(&self.0, &rhs.0, &P))
    }
}

impl Mul for FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: FieldElement) -> FieldElement {
        FieldElement(mod_mul(&self.0, &rhs.0, &P))
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;
    fn neg(self) -> FieldElement {
        FieldElement::ZERO - self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_round_trips() {
        let three = FieldElement::from_raw(U256([3, 0, 0, 0]));
        let inv = three.invert();
        assert_eq!(three * inv, FieldElement::ONE);
    }

    #[test]
    fn sqrt_candidate_squares_back_for_residues() {
        // 4 is a quadratic residue mod p with root 2.
        let four = FieldElement::from_raw(U256([4, 0, 0, 0]));
        let root = four.sqrt_candidate();
        assert_eq!(root.square(), four);
    }

    #[test]
    fn rejects_values_at_or_above_p() {
        let bytes = P.to_be_bytes();
        assert!(FieldElement::from_bytes(&bytes).is_err());
    }
}
