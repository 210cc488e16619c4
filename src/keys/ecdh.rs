//! Elliptic-curve Diffie-Hellman (spec §4.5): `S = d·P`.

use super::private_key::PrivateKey;
use super::public_key::PublicKey;
use crate::secp256k1::FieldElement;
use crate::{Error, Result};

/// Computes the shared point `S = d·P`.
#[must_use]
pub fn shared_point(d: &PrivateKey, p: &PublicKey) -> PublicKey {
    PublicKey::from_point(p.point().mul(d.scalar()))
}

/// The x-coordinate of the shared point, the usual input to a KDF.
pub fn shared_x(d: &PrivateKey, p: &PublicKey) -> Result<FieldElement> {
    shared_point(d, p)
        .point()
        .x_field()
        .ok_or(Error::InvalidCurvePoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_parties_agree_on_the_same_secret() {
        let alice = PrivateKey::random();
        let bob = PrivateKey::random();
        let s1 = shared_point(&alice, &bob.public_key());
        let s2 = shared_point(&bob, &alice.public_key());
        assert_eq!(s1, s2);
    }
}
