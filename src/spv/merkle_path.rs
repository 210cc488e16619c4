//! BRC-74 compact Merkle paths (spec §3, §4.11).

use crate::hash::sha256d;
use crate::util::varint;
use crate::{Error, Result};
use std::collections::HashSet;

/// Set when a node has no real sibling and is paired with itself
/// (the odd-node-at-this-level case).
pub const FLAG_DUPLICATE: u8 = 0x01;
/// Set on the level-0 leaf the path is proving membership for.
pub const FLAG_CLIENT_TXID: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MerkleNode {
    pub offset: u64,
    pub flags: u8,
    pub hash: Option<[u8; 32]>,
}

impl MerkleNode {
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.flags & FLAG_DUPLICATE != 0
    }

    #[must_use]
    pub fn is_client_txid(&self) -> bool {
        self.flags & FLAG_CLIENT_TXID != 0
    }
}

/// One sibling level per step from a level-0 leaf up to the root; the
/// root itself is not stored, only the `tree_height` siblings needed to
/// recompute it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerklePath {
    pub block_height: u64,
    pub tree_height: u8,
    pub levels: Vec<Vec<MerkleNode>>,
}

impl MerklePath {
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&varint::encode(self.block_height));
        out.push(self.tree_height);
        for level in &self.levels {
            out.extend_from_slice(&varint::encode(level.len() as u64));
            for node in level {
                out.extend_from_slice(&varint::encode(node.offset));
                out.push(node.flags);
                if !node.is_duplicate() {
                    let hash = node
                        .hash
                        .ok_or(())
                        .expect("non-duplicate node must carry a hash to serialize");
                    out.extend_from_slice(&hash);
                }
            }
        }
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0usize;
        let (block_height, width) = varint::decode(&bytes[cursor..], None)?;
        cursor += width;
        let tree_height = *bytes
            .get(cursor)
            .ok_or(Error::MalformedLength("merkle path truncated before tree_height"))?;
        cursor += 1;

        let mut levels = Vec::with_capacity(tree_height as usize);
        for _ in 0..tree_height {
            let (node_count, width) = varint::decode(&bytes[cursor..], None)?;
            cursor += width;
            let mut seen_offsets = HashSet::with_capacity(node_count as usize);
            let mut level = Vec::with_capacity(node_count as usize);
            for _ in 0..node_count {
                let (offset, width) = varint::decode(&bytes[cursor..], None)?;
                cursor += width;
                let flags = *bytes
                    .get(cursor)
                    .ok_or(Error::MalformedLength("merkle path node truncated"))?;
                cursor += 1;
                let hash = if flags & FLAG_DUPLICATE == 0 {
                    let slice = bytes
                        .get(cursor..cursor + 32)
                        .ok_or(Error::MalformedLength("merkle path node hash truncated"))?;
                    cursor += 32;
                    let mut h = [0u8; 32];
                    h.copy_from_slice(slice);
                    Some(h)
                } else {
                    None
                };
                if !seen_offsets.insert(offset) {
                    return Err(Error::InvariantViolation(
                        "duplicate offset within a merkle path level",
                    ));
                }
                level.push(MerkleNode { offset, flags, hash });
            }
            levels.push(level);
        }

        let path = MerklePath {
            block_height,
            tree_height,
            levels,
        };
        if tree_height > 0 && !path.levels[0].iter().any(MerkleNode::is_client_txid) {
            return Err(Error::InvariantViolation(
                "merkle path level 0 has no client-txid leaf",
            ));
        }
        Ok(path)
    }

    /// Recomputes the merkle root for the leaf at `offset_at_level_0`
    /// whose hash is `txid`, walking up through the stored sibling
    /// levels. A sibling flagged [`FLAG_DUPLICATE`] is paired with
    /// itself; any other missing sibling is [`Error::InvariantViolation`].
    pub fn compute_root(&self, txid: &[u8; 32], offset_at_level_0: u64) -> Result<[u8; 32]> {
        let mut current_hash = *txid;
        let mut current_offset = offset_at_level_0;
        for level in &self.levels {
            let sibling_offset = current_offset ^ 1;
            let sibling = level
                .iter()
                .find(|n| n.offset == sibling_offset)
                .ok_or(Error::InvariantViolation(
                    "merkle path missing sibling at a non-terminal level",
                ))?;
            let sibling_hash = if sibling.is_duplicate() {
                current_hash
            } else {
                sibling.hash.ok_or(Error::InvariantViolation(
                    "merkle path sibling node has neither a hash nor the duplicate flag",
                ))?
            };
            let (left, right) = if current_offset % 2 == 0 {
                (current_hash, sibling_hash)
            } else {
                (sibling_hash, current_hash)
            };
            let mut buf = Vec::with_capacity(64);
            buf.extend_from_slice(&left);
            buf.extend_from_slice(&right);
            current_hash = sha256d(&buf);
            current_offset /= 2;
        }
        Ok(current_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(offset: u64, hash: [u8; 32], client_txid: bool) -> MerkleNode {
        MerkleNode {
            offset,
            flags: if client_txid { FLAG_CLIENT_TXID } else { 0 },
            hash: Some(hash),
        }
    }

    fn duplicate(offset: u64) -> MerkleNode {
        MerkleNode {
            offset,
            flags: FLAG_DUPLICATE,
            hash: None,
        }
    }

    #[test]
    fn round_trips_serialization() {
        let txid = [0x11u8; 32];
        let sibling = [0x22u8; 32];
        let path = MerklePath {
            block_height: 700_000,
            tree_height: 1,
            levels: vec![vec![leaf(0, txid, true), leaf(1, sibling, false)]],
        };
        let bytes = path.serialize();
        assert_eq!(MerklePath::parse(&bytes).unwrap(), path);
    }

    #[test]
    fn compute_root_matches_manual_hash_for_two_leaves() {
        let txid = [0x11u8; 32];
        let sibling = [0x22u8; 32];
        let path = MerklePath {
            block_height: 1,
            tree_height: 1,
            levels: vec![vec![leaf(0, txid, true), leaf(1, sibling, false)]],
        };
        let mut buf = txid.to_vec();
        buf.extend_from_slice(&sibling);
        let expected = sha256d(&buf);
        assert_eq!(path.compute_root(&txid, 0).unwrap(), expected);
    }

    #[test]
    fn duplicate_sibling_pairs_with_itself() {
        let txid = [0x33u8; 32];
        let path = MerklePath {
            block_height: 1,
            tree_height: 1,
            levels: vec![vec![leaf(0, txid, true), duplicate(1)]],
        };
        let mut buf = txid.to_vec();
        buf.extend_from_slice(&txid);
        let expected = sha256d(&buf);
        assert_eq!(path.compute_root(&txid, 0).unwrap(), expected);
    }

    #[test]
    fn rejects_duplicate_offsets_within_a_level() {
        let txid = [0x44u8; 32];
        let bytes = MerklePath {
            block_height: 1,
            tree_height: 1,
            levels: vec![vec![leaf(0, txid, true), leaf(0, txid, false)]],
        }
        .serialize();
        assert!(MerklePath::parse(&bytes).is_err());
    }

    #[test]
    fn rejects_missing_client_txid_leaf() {
        let a = [0x55u8; 32];
        let b = [0x66u8; 32];
        let bytes = MerklePath {
            block_height: 1,
            tree_height: 1,
            levels: vec![vec![leaf(0, a, false), leaf(1, b, false)]],
        }
        .serialize();
        assert!(MerklePath::parse(&bytes).is_err());
    }

    #[test]
    fn missing_sibling_is_invariant_violation() {
        let txid = [0x77u8; 32];
        let path = MerklePath {
            block_height: 1,
            tree_height: 1,
            levels: vec![vec![leaf(0, txid, true)]],
        };
        assert!(path.compute_root(&txid, 0).is_err());
    }
}
