//! Fixed 80-byte block header (spec §3).

use crate::hash::{reversed_hex, sha256d};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_hash: [u8; 32],
    pub merkle_root: [u8; 32],
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub const SERIALIZED_LEN: usize = 80;

    #[must_use]
    pub fn serialize(&self) -> [u8; 80] {
        let mut out = [0u8; 80];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.prev_hash);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.time.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SERIALIZED_LEN {
            return Err(Error::InvalidLength {
                expected: Self::SERIALIZED_LEN,
                actual: bytes.len(),
            });
        }
        let mut prev_hash = [0u8; 32];
        prev_hash.copy_from_slice(&bytes[4..36]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&bytes[36..68]);
        Ok(BlockHeader {
            version: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            prev_hash,
            merkle_root,
            time: u32::from_le_bytes(bytes[68..72].try_into().unwrap()),
            bits: u32::from_le_bytes(bytes[72..76].try_into().unwrap()),
            nonce: u32::from_le_bytes(bytes[76..80].try_into().unwrap()),
        })
    }

    #[must_use]
    pub fn block_hash(&self) -> [u8; 32] {
        sha256d(&self.serialize())
    }

    #[must_use]
    pub fn hash_hex(&self) -> String {
        reversed_hex(&self.block_hash())
    }

    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.prev_hash == [0u8; 32]
    }
}
