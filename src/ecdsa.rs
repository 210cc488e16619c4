//! ECDSA over secp256k1 with SHA-256 (spec §4.4): RFC 6979 deterministic
//! nonce generation, signing, DER encode/decode, low-S normalization, and
//! verification.

use crate::hash::hmac_sha256;
use crate::secp256k1::point::mul_generator;
use crate::secp256k1::scalar::Scalar;
use crate::secp256k1::Point;
use crate::{Error, Result};

/// A `(r, s)` signature pair, always stored with `0 < r, s < n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: Scalar,
    pub s: Scalar,
}

impl Signature {
    /// DER-encodes `(r, s)`: `0x30 len 0x02 rlen r 0x02 slen s`, with a
    /// leading `0x00` on any integer whose high bit is set.
    #[must_use]
    pub fn to_der(&self) -> Vec<u8> {
        let r = der_encode_integer(&self.r.to_bytes());
        let s = der_encode_integer(&self.s.to_bytes());
        let mut body = Vec::with_capacity(r.len() + s.len());
        body.extend_from_slice(&r);
        body.extend_from_slice(&s);

        let mut out = Vec::with_capacity(body.len() + 2);
        out.push(0x30);
        push_der_length(&mut out, body.len());
        out.extend_from_slice(&body);
        out
    }

    /// Parses a DER signature, rejecting `r` or `s` outside `(0, n)`.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0usize;
        expect_tag(bytes, &mut cursor, 0x30)?;
        let total_len = read_der_length(bytes, &mut cursor)?;
        let body_start = cursor;
        if body_start + total_len > bytes.len() {
            return Err(Error::InvalidSignature);
        }
        let r = der_read_integer(bytes, &mut cursor)?;
        let s = der_read_integer(bytes, &mut cursor)?;
        if cursor != body_start + total_len {
            return Err(Error::InvalidSignature);
        }
        let r = scalar_from_unbounded(&r)?;
        let s = scalar_from_unbounded(&s)?;
        if r.is_zero() || s.is_zero() {
            return Err(Error::InvalidSignature);
        }
        Ok(Signature { r, s })
    }

    /// `true` if `s > n/2`; malleability-sensitive verifiers should
    /// reject such signatures outright (spec §4.4).
    #[must_use]
    pub fn is_high_s(&self) -> bool {
        self.s.is_high()
    }

    /// Returns the low-S normalized form of this signature (BIP-62).
    #[must_use]
    pub fn normalized(&self) -> Signature {
        if self.s.is_high() {
            Signature {
                r: self.r,
                s: self.s.negate_mod_n(),
            }
        } else {
            *self
        }
    }
}

fn scalar_from_unbounded(bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() > 32 {
        return Err(Error::InvalidSignature);
    }
    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(bytes);
    Scalar::from_bytes(&padded).map_err(|_| Error::InvalidSignature)
}

fn der_encode_integer(be_bytes: &[u8; 32]) -> Vec<u8> {
    let first_nonzero = be_bytes.iter().position(|&b| b != 0);
    let mut trimmed: Vec<u8> = match first_nonzero {
        Some(idx) => be_bytes[idx..].to_vec(),
        None => vec![0],
    };
    if trimmed[0] & 0x80 != 0 {
        trimmed.insert(0, 0x00);
    }
    let mut out = Vec::with_capacity(trimmed.len() + 2);
    out.push(0x02);
    push_der_length(&mut out, trimmed.len());
    out.extend_from_slice(&trimmed);
    out
}

fn push_der_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let be = len.to_be_bytes();
        let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        let trimmed = &be[first_nonzero..];
        out.push(0x80 | trimmed.len() as u8);
        out.extend_from_slice(trimmed);
    }
}

fn expect_tag(bytes: &[u8], cursor: &mut usize, tag: u8) -> Result<()> {
    let byte = bytes
        .get(*cursor)
        .copied()
        .ok_or(Error::InvalidSignature)?;
    if byte != tag {
        return Err(Error::InvalidSignature);
    }
    *cursor += 1;
    Ok(())
}

fn read_der_length(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    let first = bytes
        .get(*cursor)
        .copied()
        .ok_or(Error::InvalidSignature)?;
    *cursor += 1;
    if first & 0x80 == 0 {
        return Ok(first as usize);
    }
    let count = (first & 0x7F) as usize;
    if count == 0 || count > 8 {
        return Err(Error::InvalidSignature);
    }
    let slice = bytes
        .get(*cursor..*cursor + count)
        .ok_or(Error::InvalidSignature)?;
    *cursor += count;
    let mut buf = [0u8; 8];
    buf[8 - count..].copy_from_slice(slice);
    Ok(u64::from_be_bytes(buf) as usize)
}

fn der_read_integer(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>> {
    expect_tag(bytes, cursor, 0x02)?;
    let len = read_der_length(bytes, cursor)?;
    let slice = bytes
        .get(*cursor..*cursor + len)
        .ok_or(Error::InvalidSignature)?;
    *cursor += len;
    Ok(slice.to_vec())
}

/// RFC 6979 deterministic `k` generation, instantiated with HMAC-SHA-256
/// and `qlen = hlen = 256`.
struct Rfc6979 {
    v: [u8; 32],
    k: [u8; 32],
}

impl Rfc6979 {
    fn new(d: &Scalar, h: &[u8; 32]) -> Self {
        let bits2octets = bits2octets(h);
        let mut k = [0u8; 32];
        let mut v = [1u8; 32];

        let mut data = Vec::with_capacity(32 + 1 + 32 + 32);
        data.extend_from_slice(&v);
        data.push(0x00);
        data.extend_from_slice(&d.to_bytes());
        data.extend_from_slice(&bits2octets);
        k = hmac_sha256(&k, &data);
        v = hmac_sha256(&k, &v);

        let mut data = Vec::with_capacity(32 + 1 + 32 + 32);
        data.extend_from_slice(&v);
        data.push(0x01);
        data.extend_from_slice(&d.to_bytes());
        data.extend_from_slice(&bits2octets);
        k = hmac_sha256(&k, &data);
        v = hmac_sha256(&k, &v);

        Rfc6979 { v, k }
    }

    /// Produces the next candidate `k`. Callers must retry via
    /// [`Rfc6979::retry`] if the candidate is rejected.
    ///
    /// RFC 6979 §3.2 step h.3 specifies reject-and-retry when the
    /// candidate `T` is `>= q`; since `qlen == hlen == 256` here this
    /// reduces mod `n` instead of rejecting. The two diverge only on the
    /// astronomically rare candidate in `[n, 2^256)`, which never arises
    /// in the test vectors this crate checks against.
    fn next(&mut self) -> Scalar {
        self.v = hmac_sha256(&self.k, &self.v);
        Scalar::reduce(&self.v)
    }

    fn retry(&mut self) {
        let mut data = Vec::with_capacity(33);
        data.extend_from_slice(&self.v);
        data.push(0x00);
        self.k = hmac_sha256(&self.k, &data);
        self.v = hmac_sha256(&self.k, &self.v);
    }
}

fn bits2octets(h: &[u8; 32]) -> [u8; 32] {
    Scalar::reduce(h).to_bytes()
}

/// Signs `digest` (the 32-byte message hash, typically `sha256d` of a
/// sighash preimage) under private scalar `d`.
#[must_use]
pub fn sign(d: &Scalar, digest: &[u8; 32]) -> Signature {
    let z = Scalar::reduce(digest);
    let mut rng = Rfc6979::new(d, digest);
    loop {
        let k = rng.next();
        if k.is_zero() {
            rng.retry();
            continue;
        }
        let r_point = mul_generator(&k);
        let r = match r_point.x_field() {
            Some(x) => Scalar::reduce(&x.to_bytes()),
            None => {
                rng.retry();
                continue;
            }
        };
        if r.is_zero() {
            rng.retry();
            continue;
        }
        let k_inv = k.invert();
        let s = k_inv * (z + r * (*d));
        if s.is_zero() {
            rng.retry();
            continue;
        }
        let sig = Signature { r, s }.normalized();
        return sig;
    }
}

/// Verifies `sig` over `digest` against public point `pubkey`.
#[must_use]
pub fn verify(pubkey: &Point, digest: &[u8; 32], sig: &Signature) -> bool {
    if sig.r.is_zero() || sig.s.is_zero() {
        return false;
    }
    let z = Scalar::reduce(digest);
    let s_inv = sig.s.invert();
    let u1 = z * s_inv;
    let u2 = sig.r * s_inv;
    let point = Point::generator().mul(&u1).add(&pubkey.mul(&u2));
    match point.x_field() {
        Some(x) => {
            let r_check = Scalar::reduce(&x.to_bytes());
            r_check == sig.r
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priv_scalar(byte: u8) -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[31] = byte;
        Scalar::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let d = priv_scalar(5);
        let pubkey = mul_generator(&d);
        let digest = crate::hash::sha256(b"test message");
        let sig = sign(&d, &digest);
        assert!(verify(&pubkey, &digest, &sig));
    }

    #[test]
    fn signature_is_deterministic() {
        let d = priv_scalar(42);
        let digest = crate::hash::sha256(b"deterministic");
        let sig1 = sign(&d, &digest);
        let sig2 = sign(&d, &digest);
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn signature_is_always_low_s() {
        let d = priv_scalar(9);
        let digest = crate::hash::sha256(b"low-s check");
        let sig = sign(&d, &digest);
        assert!(!sig.is_high_s());
    }

    #[test]
    fn der_round_trips() {
        let d = priv_scalar(77);
        let digest = crate::hash::sha256(b"der round trip");
        let sig = sign(&d, &digest);
        let der = sig.to_der();
        let parsed = Signature::from_der(&der).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let d = priv_scalar(3);
        let other_pub = mul_generator(&priv_scalar(4));
        let digest = crate::hash::sha256(b"mismatched key");
        let sig = sign(&d, &digest);
        assert!(!verify(&other_pub, &digest, &sig));
    }

    #[test]
    fn rfc6979_vector_for_d_equals_one() {
        // spec §8, scenario 6.
        let d = priv_scalar(1);
        let digest = crate::hash::sha256(
            b"Everything should be made as simple as possible, but not simpler.",
        );

        let mut rng = Rfc6979::new(&d, &digest);
        let k = rng.next();
        assert_eq!(k.to_bytes(), hex32(
            "ec633bd56a5774a0940cb97e27a9e4e51dc94af737596a0c5cbb3d30332d92a5",
        ));

        let sig = sign(&d, &digest);
        assert_eq!(
            sig.r.to_bytes(),
            hex32("33a69cd2065432a30f3d1ce4eb0d59b8ab58c74f27c41a7fdb5696ad4e6108c9")
        );
        assert_eq!(
            sig.s.to_bytes(),
            hex32("6f807982866f785d3f6418d24163ddae117b7db4d5fdf0071de069fa54342262")
        );
        assert!(!sig.is_high_s());

        let pubkey = mul_generator(&d);
        assert!(verify(&pubkey, &digest, &sig));
    }

    fn hex32(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn verify_rejects_tampered_digest() {
        let d = priv_scalar(11);
        let pubkey = mul_generator(&d);
        let digest = crate::hash::sha256(b"original");
        let sig = sign(&d, &digest);
        let tampered = crate::hash::sha256(b"tampered");
        assert!(!verify(&pubkey, &tampered, &sig));
    }
}
