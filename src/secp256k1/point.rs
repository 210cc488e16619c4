//! Points on the secp256k1 curve `y^2 = x^3 + 7` over `F_p`, and scalar
//! multiplication by the base point `G`.
//!
//! [`Point`] is a projective-free affine representation with an explicit
//! [`Point::Infinity`] variant for the group identity, following the same
//! "value type, no hidden state" shape as [`super::field::FieldElement`].
//! Addition and doubling use the textbook affine formulas; scalar
//! multiplication is double-and-add, MSB first. None of this is
//! constant-time — see the module-level caveat in [`super::uint`].

use super::field::FieldElement;
use super::scalar::Scalar;
use crate::{Error, Result};
use std::cmp::Ordering;

/// The base point `G`.
pub const GX: [u8; 32] = [
    0x79, 0xBE, 0x66, 0x7E, 0xF9, 0xDC, 0xBB, 0xAC, 0x55, 0xA0, 0x62, 0x95, 0xCE, 0x87, 0x0B, 0x07,
    0x02, 0x9B, 0xFC, 0xDB, 0x2D, 0xCE, 0x28, 0xD9, 0x59, 0xF2, 0x81, 0x5B, 0x16, 0xF8, 0x17, 0x98,
];
pub const GY: [u8; 32] = [
    0x48, 0x3A, 0xDA, 0x77, 0x26, 0xA3, 0xC4, 0x65, 0x5D, 0xA4, 0xFB, 0xFC, 0x0E, 0x11, 0x08, 0xA8,
    0xFD, 0x17, 0xB4, 0x48, 0xA6, 0x85, 0x54, 0x19, 0x9C, 0x47, 0xD0, 0x8F, 0xFB, 0x10, 0xD4, 0xB8,
];

/// A point on the curve: either the group identity, or an affine `(x, y)`
/// pair known to satisfy the curve equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Point {
    Infinity,
    Affine(FieldElement, FieldElement),
}

impl Point {
    #[must_use]
    pub fn generator() -> Self {
        let x = FieldElement::from_bytes(&GX).expect("GX is a valid field element");
        let y = FieldElement::from_bytes(&GY).expect("GY is a valid field element");
        Point::Affine(x, y)
    }

    #[must_use]
    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }

    /// Constructs a point from affine coordinates, verifying it lies on
    /// the curve.
    pub fn from_affine(x: FieldElement, y: FieldElement) -> Result<Self> {
        let lhs = y.square();
        let rhs = x.square() * x + FieldElement::CURVE_B;
        if lhs == rhs {
            Ok(Point::Affine(x, y))
        } else {
            Err(Error::InvalidCurvePoint)
        }
    }

    /// Decodes a SEC1 compressed (33-byte, `0x02`/`0x03` prefix) or
    /// uncompressed (65-byte, `0x04` prefix) point encoding.
    pub fn from_sec1(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            33 => {
                let prefix = bytes[0];
                if prefix != 0x02 && prefix != 0x03 {
                    return Err(Error::InvalidCurvePoint);
                }
                let mut x_bytes = [0u8; 32];
                x_bytes.copy_from_slice(&bytes[1..33]);
                let x = FieldElement::from_bytes(&x_bytes)?;
                let rhs = x.square() * x + FieldElement::CURVE_B;
                let candidate = rhs.sqrt_candidate();
                if candidate.square() != rhs {
                    return Err(Error::InvalidCurvePoint);
                }
                let want_odd = prefix == 0x03;
                let y = if candidate.is_odd() == want_odd {
                    candidate
                } else {
                    -candidate
                };
                Point::from_affine(x, y)
            }
            65 => {
                if bytes[0] != 0x04 {
                    return Err(Error::InvalidCurvePoint);
                }
                let mut x_bytes = [0u8; 32];
                let mut y_bytes = [0u8; 32];
                x_bytes.copy_from_slice(&bytes[1..33]);
                y_bytes.copy_from_slice(&bytes[33..65]);
                let x = FieldElement::from_bytes(&x_bytes)?;
                let y = FieldElement::from_bytes(&y_bytes)?;
                Point::from_affine(x, y)
            }
            _ => Err(Error::InvalidLength {
                expected: 33,
                actual: bytes.len(),
            }),
        }
    }

    #[must_use]
    pub fn to_sec1_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        match self {
            Point::Infinity => out,
            Point::Affine(x, y) => {
                out[0] = if y.is_odd() { 0x03 } else { 0x02 };
                out[1..33].copy_from_slice(&x.to_bytes());
                out
            }
        }
    }

    #[must_use]
    pub fn to_sec1_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        if let Point::Affine(x, y) = self {
            out[0] = 0x04;
            out[1..33].copy_from_slice(&x.to_bytes());
            out[33..65].copy_from_slice(&y.to_bytes());
        }
        out
    }

    /// Point doubling. `2 * Infinity = Infinity`; a point with `y = 0` is
    /// its own inverse under negation and doubles to `Infinity`.
    #[must_use]
    pub fn double(&self) -> Point {
        match self {
            Point::Infinity => Point::Infinity,
            Point::Affine(x, y) => {
                if y.is_zero() {
                    return Point::Infinity;
                }
                let three = FieldElement::ONE + FieldElement::ONE + FieldElement::ONE;
                let two = FieldElement::ONE + FieldElement::ONE;
                let lambda = (three * x.square()) * (two * *y).invert();
                let x3 = lambda.square() - *x - *x;
                let y3 = lambda * (*x - x3) - *y;
                Point::Affine(x3, y3)
            }
        }
    }

    /// Point addition. Handles `Infinity` operands, point-plus-negation
    /// (`P + (-P) = Infinity`), and point doubling (`P == Q`) as special
    /// cases of the generic chord formula.
    #[must_use]
    pub fn add(&self, other: &Point) -> Point {
        match (self, other) {
            (Point::Infinity, q) => *q,
            (p, Point::Infinity) => *p,
            (Point::Affine(x1, y1), Point::Affine(x2, y2)) => {
                if x1 == x2 {
                    if y1 == y2 {
                        return self.double();
                    }
                    return Point::Infinity;
                }
                let lambda = (*y2 - *y1) * (*x2 - *x1).invert();
                let x3 = lambda.square() - *x1 - *x2;
                let y3 = lambda * (*x1 - x3) - *y1;
                Point::Affine(x3, y3)
            }
        }
    }

    /// Scalar multiplication by double-and-add, most-significant-bit
    /// first. Not constant-time.
    #[must_use]
    pub fn mul(&self, scalar: &Scalar) -> Point {
        let raw = scalar.raw();
        let bits = raw.bits();
        let mut result = Point::Infinity;
        for i in (0..bits).rev() {
            result = result.double();
            if raw.bit(i) {
                result = result.add(self);
            }
        }
        result
    }

    #[must_use]
    pub fn x_field(&self) -> Option<FieldElement> {
        match self {
            Point::Infinity => None,
            Point::Affine(x, _) => Some(*x),
        }
    }
}

/// `k * G`, the public point for a private scalar `k`.
#[must_use]
pub fn mul_generator(scalar: &Scalar) -> Point {
    Point::generator().mul(scalar)
}

impl PartialOrd for Point {
    fn partial_cmp(&self, _other: &Self) -> Option<Ordering> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        let g = Point::generator();
        assert!(!g.is_infinity());
    }

    #[test]
    fn doubling_matches_self_addition() {
        let g = Point::generator();
        assert_eq!(g.double(), g.add(&g));
    }

    #[test]
    fn two_g_plus_neg_two_g_is_infinity() {
        let g = Point::generator();
        let two_g = g.double();
        let neg_two_g = match two_g {
            Point::Affine(x, y) => Point::Affine(x, -y),
            Point::Infinity => Point::Infinity,
        };
        assert_eq!(two_g.add(&neg_two_g), Point::Infinity);
    }

    #[test]
    fn compressed_round_trips() {
        let g = Point::generator();
        let enc = g.to_sec1_compressed();
        let decoded = Point::from_sec1(&enc).unwrap();
        assert_eq!(decoded, g);
    }

    #[test]
    fn scalar_mul_by_one_is_identity() {
        let g = Point::generator();
        let one = Scalar::ONE;
        assert_eq!(g.mul(&one), g);
    }

    #[test]
    fn scalar_mul_by_two_matches_double() {
        let g = Point::generator();
        let two = Scalar::ONE + Scalar::ONE;
        assert_eq!(g.mul(&two), g.double());
    }
}
