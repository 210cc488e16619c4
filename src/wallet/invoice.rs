//! BRC-42 child key derivation and BRC-43 invoice-number normalization
//! (spec §4.5).

use crate::hash::hmac_sha256;
use crate::keys::ecdh;
use crate::keys::private_key::PrivateKey;
use crate::keys::public_key::PublicKey;
use crate::secp256k1::scalar::Scalar;
use crate::{Error, Result};

/// Who a key is derived with respect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterparty {
    SelfParty,
    Anyone,
    Other(PublicKey),
}

/// Normalizes `(security_level, protocol_name, key_id)` into the BRC-43
/// invoice string `"{sec}-{name}-{key_id}"`, enforcing every rule in
/// spec §4.5.
pub fn compute_invoice_number(
    security_level: u8,
    protocol_name: &str,
    key_id: &str,
) -> Result<String> {
    if security_level > 2 {
        return Err(Error::ConfigError("security level must be 0, 1, or 2"));
    }
    if key_id.is_empty() || key_id.len() > 800 {
        return Err(Error::ConfigError("key_id length must be in [1, 800]"));
    }

    let trimmed = protocol_name.trim();
    let lower = trimmed.to_lowercase();

    if lower.contains("  ") {
        return Err(Error::ConfigError(
            "protocol name must not contain double spaces",
        ));
    }
    if !lower
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ')
    {
        return Err(Error::ConfigError(
            "protocol name must contain only [a-z0-9 ]",
        ));
    }
    if lower.ends_with(" protocol") {
        return Err(Error::ConfigError(
            "protocol name must not end with \" protocol\"",
        ));
    }

    let max_len = if lower.starts_with("specific linkage revelation ") {
        430
    } else {
        400
    };
    if lower.len() < 5 || lower.len() > max_len {
        return Err(Error::ConfigError(
            "protocol name length is outside the allowed range",
        ));
    }

    Ok(format!("{security_level}-{lower}-{key_id}"))
}

/// Computes `h = HMAC_SHA256(key = compressed(S), data = invoice)` where
/// `S = ECDH(d_root, P_cp)`.
fn derivation_hmac(d_root: &PrivateKey, p_cp: &PublicKey, invoice: &str) -> Result<[u8; 32]> {
    let shared = ecdh::shared_point(d_root, p_cp);
    let key = shared.to_bytes_compressed();
    Ok(hmac_sha256(&key, invoice.as_bytes()))
}

/// BRC-42 child private key: `d_child = (d_root + int(h)) mod n`.
pub fn derive_child_private_key(
    d_root: &PrivateKey,
    p_cp: &PublicKey,
    invoice: &str,
) -> Result<PrivateKey> {
    let h = derivation_hmac(d_root, p_cp, invoice)?;
    let h_scalar = Scalar::reduce(&h);
    let child = h_scalar + *d_root.scalar();
    if child.is_zero() {
        return Err(Error::InvalidScalar);
    }
    Ok(PrivateKey::from_scalar(child))
}

/// The BRC-42 derived public key belonging to `p_cp`'s owner, computable
/// without their private key: `P_child = P_cp + int(h)·G`. Useful when
/// `d_mine`'s owner wants to know what `p_cp`'s owner would derive as
/// their own child private key (since `h` is symmetric under ECDH,
/// `p_cp`'s owner running [`derive_child_private_key`] with `d_mine`'s
/// public key produces exactly this public key).
pub fn derive_child_public_key_for_counterparty(
    d_mine: &PrivateKey,
    p_cp: &PublicKey,
    invoice: &str,
) -> Result<PublicKey> {
    let h = derivation_hmac(d_mine, p_cp, invoice)?;
    let h_scalar = Scalar::reduce(&h);
    let offset = crate::secp256k1::mul_generator(&h_scalar);
    Ok(p_cp.add_point(offset.point()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_security_level_above_two() {
        assert!(compute_invoice_number(3, "some protocol name", "id").is_err());
    }

    #[test]
    fn rejects_double_spaces_and_trailing_protocol_suffix() {
        assert!(compute_invoice_number(1, "a  b valid name", "id").is_err());
        assert!(compute_invoice_number(1, "something something protocol", "id").is_err());
    }

    #[test]
    fn normalizes_case_and_trims_whitespace() {
        let invoice = compute_invoice_number(1, "  Example Protocol Name  ", "id").unwrap();
        assert_eq!(invoice, "1-example protocol name-id");
    }

    #[test]
    fn counterparty_derived_public_key_matches_their_own_private_derivation() {
        let root = PrivateKey::random();
        let counterparty = PrivateKey::random();
        let invoice = compute_invoice_number(0, "test protocol", "key-1").unwrap();

        // What the counterparty derives on their own, knowing only their
        // private key and root's public key.
        let counterparty_child_priv =
            derive_child_private_key(&counterparty, &root.public_key(), &invoice).unwrap();

        // What root computes about the counterparty's derived public key,
        // without ever seeing the counterparty's private key.
        let counterparty_child_pub_via_root =
            derive_child_public_key_for_counterparty(&root, &counterparty.public_key(), &invoice)
                .unwrap();

        assert_eq!(
            counterparty_child_priv.public_key(),
            counterparty_child_pub_via_root
        );
    }
}
