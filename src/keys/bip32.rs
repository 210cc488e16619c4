//! BIP-32 hierarchical-deterministic key derivation (spec §4.5, §6).

use crate::config::Network;
use crate::hash::{hash160, hmac_sha512};
use crate::secp256k1::point::mul_generator;
use crate::secp256k1::scalar::Scalar;
use crate::secp256k1::Point;
use crate::util::base58;
use crate::{Error, Result};

use super::private_key::PrivateKey;
use super::public_key::PublicKey;

const HARDENED_OFFSET: u32 = 0x8000_0000;

const VERSION_XPRV: u32 = 0x0488_ADE4;
const VERSION_XPUB: u32 = 0x0488_B21E;
const VERSION_TPRV: u32 = 0x0435_8394;
const VERSION_TPUB: u32 = 0x0435_87CF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedPrivateKey {
    pub network: Network,
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub child_number: u32,
    pub chain_code: [u8; 32],
    d: Scalar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    pub network: Network,
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub child_number: u32,
    pub chain_code: [u8; 32],
    point: Point,
}

impl ExtendedPrivateKey {
    /// Derives the master key from a seed, `16..=64` bytes long.
    pub fn master(seed: &[u8], network: Network) -> Result<Self> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(Error::MalformedLength(
                "BIP-32 seed must be between 16 and 64 bytes",
            ));
        }
        let i = hmac_sha512(b"Bitcoin seed", seed);
        let (il, ir) = i.split_at(32);
        let mut il_arr = [0u8; 32];
        il_arr.copy_from_slice(il);
        let d = Scalar::from_bytes(&il_arr).map_err(|_| Error::InvalidScalar)?;
        if d.is_zero() {
            return Err(Error::InvalidScalar);
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);
        Ok(ExtendedPrivateKey {
            network,
            depth: 0,
            parent_fingerprint: [0; 4],
            child_number: 0,
            chain_code,
            d,
        })
    }

    #[must_use]
    pub fn private_key(&self) -> PrivateKey {
        PrivateKey::from_scalar(self.d)
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_point(mul_generator(&self.d))
    }

    #[must_use]
    pub fn neuter(&self) -> ExtendedPublicKey {
        ExtendedPublicKey {
            network: self.network,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            point: mul_generator(&self.d),
        }
    }

    #[must_use]
    pub fn fingerprint(&self) -> [u8; 4] {
        fingerprint_of(&self.public_key())
    }

    /// Derives the child at `index`. `index >= 2^31` is a hardened
    /// derivation.
    pub fn derive_child(&self, index: u32) -> Result<Self> {
        let hardened = index >= HARDENED_OFFSET;
        let mut data = Vec::with_capacity(37);
        if hardened {
            data.push(0x00);
            data.extend_from_slice(&self.d.to_bytes());
        } else {
            data.extend_from_slice(&self.public_key().to_bytes_compressed());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let i = hmac_sha512(&self.chain_code, &data);
        let (il, ir) = i.split_at(32);
        let mut il_arr = [0u8; 32];
        il_arr.copy_from_slice(il);
        let il_scalar = Scalar::from_bytes(&il_arr).map_err(|_| Error::InvalidScalar)?;
        let child_d = il_scalar + self.d;
        if child_d.is_zero() {
            return Err(Error::InvariantViolation(
                "derived child private key is zero",
            ));
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);
        Ok(ExtendedPrivateKey {
            network: self.network,
            depth: self.depth.wrapping_add(1),
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            chain_code,
            d: child_d,
        })
    }

    /// Derives along a `m/44'/0'/0'/0/0`-style path of raw indices
    /// (hardened indices already have [`HARDENED_OFFSET`] added).
    pub fn derive_path(&self, path: &[u32]) -> Result<Self> {
        let mut key = *self;
        for &index in path {
            key = key.derive_child(index)?;
        }
        Ok(key)
    }

    #[must_use]
    pub fn serialize(&self) -> [u8; 78] {
        let version = match self.network {
            Network::Mainnet => VERSION_XPRV,
            Network::Testnet => VERSION_TPRV,
        };
        serialize_extended_key(
            version,
            self.depth,
            self.parent_fingerprint,
            self.child_number,
            self.chain_code,
            &{
                let mut key_data = [0u8; 33];
                key_data[1..].copy_from_slice(&self.d.to_bytes());
                key_data
            },
        )
    }

    #[must_use]
    pub fn to_base58check(&self) -> String {
        base58::encode_check(&self.serialize())
    }

    pub fn from_base58check(s: &str) -> Result<Self> {
        let payload = base58::decode_check(s)?;
        let (version, depth, parent_fingerprint, child_number, chain_code, key_data) =
            parse_extended_key(&payload)?;
        let network = match version {
            VERSION_XPRV => Network::Mainnet,
            VERSION_TPRV => Network::Testnet,
            _ => {
                return Err(Error::MalformedEncoding(
                    "extended key version is not a private-key version",
                ))
            }
        };
        if key_data[0] != 0x00 {
            return Err(Error::MalformedEncoding(
                "extended private key data must start with 0x00",
            ));
        }
        let mut d_bytes = [0u8; 32];
        d_bytes.copy_from_slice(&key_data[1..]);
        let d = Scalar::from_bytes(&d_bytes).map_err(|_| Error::InvalidScalar)?;
        Ok(ExtendedPrivateKey {
            network,
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            d,
        })
    }
}

impl ExtendedPublicKey {
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_point(self.point)
    }

    #[must_use]
    pub fn fingerprint(&self) -> [u8; 4] {
        fingerprint_of(&self.public_key())
    }

    /// Public-parent (non-hardened only) child derivation:
    /// `P_child = P_parent + I_L·G`.
    pub fn derive_child(&self, index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(Error::InvalidScalar);
        }
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&self.public_key().to_bytes_compressed());
        data.extend_from_slice(&index.to_be_bytes());

        let i = hmac_sha512(&self.chain_code, &data);
        let (il, ir) = i.split_at(32);
        let mut il_arr = [0u8; 32];
        il_arr.copy_from_slice(il);
        let il_scalar = Scalar::from_bytes(&il_arr).map_err(|_| Error::InvalidScalar)?;
        let child_point = mul_generator(&il_scalar).add(&self.point);
        if child_point.is_infinity() {
            return Err(Error::InvariantViolation(
                "derived child public key is the point at infinity",
            ));
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);
        Ok(ExtendedPublicKey {
            network: self.network,
            depth: self.depth.wrapping_add(1),
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            chain_code,
            point: child_point,
        })
    }

    #[must_use]
    pub fn serialize(&self) -> [u8; 78] {
        let version = match self.network {
            Network::Mainnet => VERSION_XPUB,
            Network::Testnet => VERSION_TPUB,
        };
        serialize_extended_key(
            version,
            self.depth,
            self.parent_fingerprint,
            self.child_number,
            self.chain_code,
            &self.public_key().to_bytes_compressed(),
        )
    }

    #[must_use]
    pub fn to_base58check(&self) -> String {
        base58::encode_check(&self.serialize())
    }

    pub fn from_base58check(s: &str) -> Result<Self> {
        let payload = base58::decode_check(s)?;
        let (version, depth, parent_fingerprint, child_number, chain_code, key_data) =
            parse_extended_key(&payload)?;
        let network = match version {
            VERSION_XPUB => Network::Mainnet,
            VERSION_TPUB => Network::Testnet,
            _ => {
                return Err(Error::MalformedEncoding(
                    "extended key version is not a public-key version",
                ))
            }
        };
        let point = Point::from_sec1(&key_data)?;
        Ok(ExtendedPublicKey {
            network,
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            point,
        })
    }
}

fn fingerprint_of(pubkey: &PublicKey) -> [u8; 4] {
    let h = hash160(&pubkey.to_bytes_compressed());
    [h[0], h[1], h[2], h[3]]
}

fn serialize_extended_key(
    version: u32,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: [u8; 32],
    key_data: &[u8; 33],
) -> [u8; 78] {
    let mut out = [0u8; 78];
    out[0..4].copy_from_slice(&version.to_be_bytes());
    out[4] = depth;
    out[5..9].copy_from_slice(&parent_fingerprint);
    out[9..13].copy_from_slice(&child_number.to_be_bytes());
    out[13..45].copy_from_slice(&chain_code);
    out[45..78].copy_from_slice(key_data);
    out
}

#[allow(clippy::type_complexity)]
fn parse_extended_key(payload: &[u8]) -> Result<(u32, u8, [u8; 4], u32, [u8; 32], [u8; 33])> {
    if payload.len() != 78 {
        return Err(Error::InvalidLength {
            expected: 78,
            actual: payload.len(),
        });
    }
    let version = u32::from_be_bytes(payload[0..4].try_into().unwrap());
    let depth = payload[4];
    let mut parent_fingerprint = [0u8; 4];
    parent_fingerprint.copy_from_slice(&payload[5..9]);
    let child_number = u32::from_be_bytes(payload[9..13].try_into().unwrap());
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&payload[13..45]);
    let mut key_data = [0u8; 33];
    key_data.copy_from_slice(&payload[45..78]);
    Ok((
        version,
        depth,
        parent_fingerprint,
        child_number,
        chain_code,
        key_data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_key_from_seed_matches_bip32_test_vector_1() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let master = ExtendedPrivateKey::master(&seed, Network::Mainnet).unwrap();
        assert_eq!(
            master.to_base58check(),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
    }

    #[test]
    fn derive_m_0h_1_2h_matches_bip32_test_vector_1() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let master = ExtendedPrivateKey::master(&seed, Network::Mainnet).unwrap();
        let child = master
            .derive_path(&[0 | HARDENED_OFFSET, 1, 2 | HARDENED_OFFSET])
            .unwrap();
        assert_eq!(
            child.neuter().to_base58check(),
            "xpub6D4BDPcP2GT577Vvch3R8wDkScZWzQzMMUm3PWbmWvVJrZwQY4VUNgqFJPMM3No2dFDFGTsxxpG5uJh7n7epu4trkrX7x7DogT5Uv6fcLW5"
        );
    }

    #[test]
    fn child_derivation_round_trips_through_base58check() {
        let seed = [0u8; 32];
        let master = ExtendedPrivateKey::master(&seed, Network::Mainnet).unwrap();
        let child = master.derive_child(0).unwrap();
        let encoded = child.to_base58check();
        let decoded = ExtendedPrivateKey::from_base58check(&encoded).unwrap();
        assert_eq!(decoded, child);
    }

    #[test]
    fn public_derivation_matches_private_derivation() {
        let seed = [1u8; 32];
        let master = ExtendedPrivateKey::master(&seed, Network::Mainnet).unwrap();
        let child_priv = master.derive_child(5).unwrap();
        let child_pub = master.neuter().derive_child(5).unwrap();
        assert_eq!(child_priv.public_key(), child_pub.public_key());
    }

    #[test]
    fn hardened_index_rejected_for_public_derivation() {
        let seed = [2u8; 32];
        let master = ExtendedPrivateKey::master(&seed, Network::Mainnet).unwrap();
        assert!(master.neuter().derive_child(HARDENED_OFFSET).is_err());
    }
}
