//! A block header plus its ordered transactions (spec §3).

use super::block_header::BlockHeader;
use crate::hash::sha256d;
use crate::transaction::Transaction;
use crate::util::varint;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.header.is_genesis()
    }

    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.header.serialize());
        out.extend_from_slice(&varint::encode(self.transactions.len() as u64));
        for tx in &self.transactions {
            out.extend_from_slice(&tx.serialize());
        }
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let header = BlockHeader::parse(&bytes[..BlockHeader::SERIALIZED_LEN])?;
        let mut cursor = BlockHeader::SERIALIZED_LEN;
        let (count, width) = varint::decode(&bytes[cursor..], None)?;
        cursor += width;
        let mut transactions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            // Transactions don't self-delimit their length, so hand the
            // parser the remaining tail and walk forward by its consumed
            // size via a round trip through `serialize`.
            let tx = Transaction::parse(&bytes[cursor..])?;
            cursor += tx.serialize().len();
            transactions.push(tx);
        }
        Ok(Block { header, transactions })
    }

    /// Computes the merkle root over this block's txids: pairs adjacent
    /// nodes level by level, hashing `sha256d(left ∥ right)`, pairing a
    /// trailing odd node with itself (Satoshi's original algorithm,
    /// vulnerable to CVE-2012-2459 at the tree-construction level — the
    /// BRC-74 path validator in [`crate::spv::merkle_path`] guards the
    /// proof-verification side of that same issue).
    #[must_use]
    pub fn calc_merkle_root(&self) -> [u8; 32] {
        merkle_root(self.transactions.iter().map(Transaction::txid).collect())
    }
}

pub(crate) fn merkle_root(mut level: Vec<[u8; 32]>) -> [u8; 32] {
    if level.is_empty() {
        return [0u8; 32];
    }
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        level = level
            .chunks_exact(2)
            .map(|pair| {
                let mut buf = Vec::with_capacity(64);
                buf.extend_from_slice(&pair[0]);
                buf.extend_from_slice(&pair[1]);
                sha256d(&buf)
            })
            .collect();
    }
    level[0]
}
