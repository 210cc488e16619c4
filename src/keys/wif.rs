//! Wallet Import Format (spec §4.5): `prefix(1B) ∥ d(32B) ∥
//! compressed-flag(0 or 1B) ∥ checksum(4B)`, Base58Check-encoded.

use super::private_key::PrivateKey;
use crate::config::Network;
use crate::secp256k1::scalar::Scalar;
use crate::util::base58;
use crate::{Error, Result};

const MAINNET_PREFIX: u8 = 0x80;
const TESTNET_PREFIX: u8 = 0xEF;

#[must_use]
pub fn encode(key: &PrivateKey, network: Network, compressed: bool) -> String {
    let prefix = match network {
        Network::Mainnet => MAINNET_PREFIX,
        Network::Testnet => TESTNET_PREFIX,
    };
    let mut payload = Vec::with_capacity(34);
    payload.push(prefix);
    payload.extend_from_slice(&key.to_bytes());
    if compressed {
        payload.push(0x01);
    }
    base58::encode_check(&payload)
}

pub fn decode(s: &str) -> Result<(PrivateKey, Network, bool)> {
    let payload = base58::decode_check(s)?;
    if payload.len() != 33 && payload.len() != 34 {
        return Err(Error::MalformedEncoding("WIF payload has unexpected length"));
    }
    let network = match payload[0] {
        MAINNET_PREFIX => Network::Mainnet,
        TESTNET_PREFIX => Network::Testnet,
        _ => return Err(Error::MalformedEncoding("unknown WIF network prefix")),
    };
    let compressed = match payload.len() {
        33 => false,
        34 if payload[33] == 0x01 => true,
        _ => return Err(Error::MalformedEncoding("invalid WIF compression flag")),
    };
    let mut d_bytes = [0u8; 32];
    d_bytes.copy_from_slice(&payload[1..33]);
    let scalar = Scalar::from_bytes(&d_bytes).map_err(|_| Error::InvalidScalar)?;
    if scalar.is_zero() {
        return Err(Error::InvalidScalar);
    }
    Ok((PrivateKey::from_scalar(scalar), network, compressed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_compressed_round_trips() {
        let key = PrivateKey::random();
        let wif = encode(&key, Network::Mainnet, true);
        let (decoded, network, compressed) = decode(&wif).unwrap();
        assert_eq!(decoded.to_bytes(), key.to_bytes());
        assert_eq!(network, Network::Mainnet);
        assert!(compressed);
    }

    #[test]
    fn testnet_uncompressed_round_trips() {
        let key = PrivateKey::random();
        let wif = encode(&key, Network::Testnet, false);
        let (decoded, network, compressed) = decode(&wif).unwrap();
        assert_eq!(decoded.to_bytes(), key.to_bytes());
        assert_eq!(network, Network::Testnet);
        assert!(!compressed);
    }

    #[test]
    fn known_answer_vector_decodes_to_expected_scalar() {
        // spec §8, scenario 3.
        let (key, network, compressed) =
            decode("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ").unwrap();
        let expected: [u8; 32] = hex::decode(
            "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d",
        )
        .unwrap()
        .try_into()
        .unwrap();
        assert_eq!(key.to_bytes(), expected);
        assert_eq!(network, Network::Mainnet);
        assert!(!compressed);
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let key = PrivateKey::random();
        let wif = encode(&key, Network::Mainnet, true);
        let mut chars: Vec<char> = wif.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '1' { '2' } else { '1' };
        let corrupted: String = chars.into_iter().collect();
        assert!(decode(&corrupted).is_err());
    }
}
