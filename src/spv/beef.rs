//! BEEF (Background Evaluation Extended Format) transaction containers,
//! versions 1 and 2, plus the optional Atomic BEEF prefix (spec §4.11).

use super::merkle_path::MerklePath;
use crate::transaction::Transaction;
use crate::util::varint;
use crate::{Error, Result};

const V1_MAGIC: u32 = 0x0100_BEEF;
const V2_MAGIC: u32 = 0x0200_BEEF;
const ATOMIC_PREFIX: u32 = 0x0101_0101;
const ATOMIC_SKIP_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeefVersion {
    V1,
    V2,
}

/// A single transaction entry and however it references its merkle proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeefTx {
    /// Raw transaction with no bump reference.
    Raw(Transaction),
    /// Raw transaction accompanied by the index of its bump in
    /// [`Beef::bumps`].
    RawWithBump { tx: Transaction, bump_index: u64 },
    /// `v2` format 2: a bare txid standing in for a transaction the
    /// recipient is assumed to already hold.
    TxidOnly([u8; 32]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beef {
    pub version: BeefVersion,
    /// Whether an Atomic BEEF prefix preceded this container on the wire.
    pub atomic: bool,
    pub bumps: Vec<MerklePath>,
    pub transactions: Vec<BeefTx>,
}

impl Beef {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0usize;
        let atomic = if read_u32(bytes, cursor)? == ATOMIC_PREFIX {
            cursor += 4 + ATOMIC_SKIP_LEN;
            true
        } else {
            false
        };

        let magic = read_u32(bytes, cursor)?;
        cursor += 4;
        let version = match magic {
            V1_MAGIC => BeefVersion::V1,
            V2_MAGIC => BeefVersion::V2,
            _ => return Err(Error::MalformedEncoding("unrecognized BEEF magic")),
        };

        let (num_bumps, width) = varint::decode(&bytes[cursor..], None)?;
        cursor += width;
        let mut bumps = Vec::with_capacity(num_bumps as usize);
        for _ in 0..num_bumps {
            let bump = MerklePath::parse(&bytes[cursor..])?;
            cursor += bump.serialize().len();
            bumps.push(bump);
        }

        let (num_tx, width) = varint::decode(&bytes[cursor..], None)?;
        cursor += width;
        let mut transactions = Vec::with_capacity(num_tx as usize);
        for _ in 0..num_tx {
            let entry = match version {
                BeefVersion::V1 => parse_v1_tx(bytes, &mut cursor)?,
                BeefVersion::V2 => parse_v2_tx(bytes, &mut cursor)?,
            };
            transactions.push(entry);
        }

        let beef = Beef {
            version,
            atomic,
            bumps,
            transactions,
        };
        beef.check_bump_indices()?;
        Ok(beef)
    }

    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if self.atomic {
            out.extend_from_slice(&ATOMIC_PREFIX.to_le_bytes());
            out.extend_from_slice(&[0u8; ATOMIC_SKIP_LEN]);
        }
        let magic = match self.version {
            BeefVersion::V1 => V1_MAGIC,
            BeefVersion::V2 => V2_MAGIC,
        };
        out.extend_from_slice(&magic.to_le_bytes());
        out.extend_from_slice(&varint::encode(self.bumps.len() as u64));
        for bump in &self.bumps {
            out.extend_from_slice(&bump.serialize());
        }
        out.extend_from_slice(&varint::encode(self.transactions.len() as u64));
        for entry in &self.transactions {
            match self.version {
                BeefVersion::V1 => serialize_v1_tx(entry, &mut out),
                BeefVersion::V2 => serialize_v2_tx(entry, &mut out),
            }
        }
        out
    }

    fn check_bump_indices(&self) -> Result<()> {
        for entry in &self.transactions {
            if let BeefTx::RawWithBump { bump_index, .. } = entry {
                if *bump_index as usize >= self.bumps.len() {
                    return Err(Error::InvariantViolation(
                        "BEEF transaction references an out-of-range bump index",
                    ));
                }
            }
        }
        Ok(())
    }
}

fn parse_v1_tx(bytes: &[u8], cursor: &mut usize) -> Result<BeefTx> {
    let tx = Transaction::parse(&bytes[*cursor..])?;
    *cursor += tx.serialize().len();
    // A legacy encoder may omit the trailing flag at EOF; treat that as flag 0.
    let flag = match bytes.get(*cursor) {
        Some(b) => {
            *cursor += 1;
            *b
        }
        None => 0,
    };
    match flag {
        0 => Ok(BeefTx::Raw(tx)),
        1 => {
            let (bump_index, width) = varint::decode(&bytes[*cursor..], None)?;
            *cursor += width;
            Ok(BeefTx::RawWithBump { tx, bump_index })
        }
        _ => Err(Error::MalformedEncoding("unknown BEEF v1 tx flag")),
    }
}

fn serialize_v1_tx(entry: &BeefTx, out: &mut Vec<u8>) {
    match entry {
        BeefTx::Raw(tx) => {
            out.extend_from_slice(&tx.serialize());
            out.push(0);
        }
        BeefTx::RawWithBump { tx, bump_index } => {
            out.extend_from_slice(&tx.serialize());
            out.push(1);
            out.extend_from_slice(&varint::encode(*bump_index));
        }
        BeefTx::TxidOnly(_) => unreachable!("BEEF v1 has no txid-only format"),
    }
}

fn parse_v2_tx(bytes: &[u8], cursor: &mut usize) -> Result<BeefTx> {
    let format = *bytes
        .get(*cursor)
        .ok_or(Error::MalformedLength("BEEF v2 tx truncated before format byte"))?;
    *cursor += 1;
    match format {
        0 => {
            let tx = Transaction::parse(&bytes[*cursor..])?;
            *cursor += tx.serialize().len();
            Ok(BeefTx::Raw(tx))
        }
        1 => {
            let (bump_index, width) = varint::decode(&bytes[*cursor..], None)?;
            *cursor += width;
            let tx = Transaction::parse(&bytes[*cursor..])?;
            *cursor += tx.serialize().len();
            Ok(BeefTx::RawWithBump { tx, bump_index })
        }
        2 => {
            let slice = bytes
                .get(*cursor..*cursor + 32)
                .ok_or(Error::MalformedLength("BEEF v2 txid-only entry truncated"))?;
            *cursor += 32;
            let mut txid = [0u8; 32];
            txid.copy_from_slice(slice);
            Ok(BeefTx::TxidOnly(txid))
        }
        _ => Err(Error::MalformedEncoding("unknown BEEF v2 tx format")),
    }
}

fn serialize_v2_tx(entry: &BeefTx, out: &mut Vec<u8>) {
    match entry {
        BeefTx::Raw(tx) => {
            out.push(0);
            out.extend_from_slice(&tx.serialize());
        }
        BeefTx::RawWithBump { tx, bump_index } => {
            out.push(1);
            out.extend_from_slice(&varint::encode(*bump_index));
            out.extend_from_slice(&tx.serialize());
        }
        BeefTx::TxidOnly(txid) => {
            out.push(2);
            out.extend_from_slice(txid);
        }
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    let slice = bytes
        .get(at..at + 4)
        .ok_or(Error::MalformedLength("BEEF container truncated before magic"))?;
    Ok(u32::from_le_bytes(slice.try_into().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Chunk, Script};

    fn sample_tx() -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![crate::transaction::Input {
                source_txid: [0xAB; 32],
                source_vout: 0,
                unlocking_script: Script::from_chunks(vec![Chunk::Push(vec![1, 2, 3])]),
                sequence: 0xFFFF_FFFF,
                source_output: None,
            }],
            outputs: vec![crate::transaction::Output {
                satoshis: 1000,
                locking_script: Script::template_p2pkh(&[0xCD; 20]),
                is_change: false,
            }],
            lock_time: 0,
        }
    }

    fn sample_bump() -> MerklePath {
        use crate::spv::merkle_path::{MerkleNode, FLAG_CLIENT_TXID};
        MerklePath {
            block_height: 1,
            tree_height: 1,
            levels: vec![vec![
                MerkleNode {
                    offset: 0,
                    flags: FLAG_CLIENT_TXID,
                    hash: Some([0x11; 32]),
                },
                MerkleNode {
                    offset: 1,
                    flags: 0,
                    hash: Some([0x22; 32]),
                },
            ]],
        }
    }

    #[test]
    fn round_trips_v1_with_bump_reference() {
        let beef = Beef {
            version: BeefVersion::V1,
            atomic: false,
            bumps: vec![sample_bump()],
            transactions: vec![BeefTx::RawWithBump {
                tx: sample_tx(),
                bump_index: 0,
            }],
        };
        let bytes = beef.serialize();
        assert_eq!(Beef::parse(&bytes).unwrap(), beef);
    }

    #[test]
    fn round_trips_v2_with_all_three_formats() {
        let beef = Beef {
            version: BeefVersion::V2,
            atomic: false,
            bumps: vec![sample_bump()],
            transactions: vec![
                BeefTx::Raw(sample_tx()),
                BeefTx::RawWithBump {
                    tx: sample_tx(),
                    bump_index: 0,
                },
                BeefTx::TxidOnly([0x99; 32]),
            ],
        };
        let bytes = beef.serialize();
        assert_eq!(Beef::parse(&bytes).unwrap(), beef);
    }

    #[test]
    fn round_trips_atomic_beef_prefix() {
        let beef = Beef {
            version: BeefVersion::V2,
            atomic: true,
            bumps: vec![],
            transactions: vec![BeefTx::Raw(sample_tx())],
        };
        let bytes = beef.serialize();
        assert_eq!(Beef::parse(&bytes).unwrap(), beef);
    }

    #[test]
    fn v1_tolerates_missing_trailing_flag_at_eof() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&V1_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&varint::encode(0));
        bytes.extend_from_slice(&varint::encode(1));
        bytes.extend_from_slice(&sample_tx().serialize());
        let beef = Beef::parse(&bytes).unwrap();
        assert_eq!(beef.transactions, vec![BeefTx::Raw(sample_tx())]);
    }

    #[test]
    fn rejects_out_of_range_bump_index() {
        let beef = Beef {
            version: BeefVersion::V1,
            atomic: false,
            bumps: vec![],
            transactions: vec![BeefTx::RawWithBump {
                tx: sample_tx(),
                bump_index: 3,
            }],
        };
        let bytes = beef.serialize();
        assert!(Beef::parse(&bytes).is_err());
    }

    #[test]
    fn rejects_unknown_v2_format() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&V2_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&varint::encode(0));
        bytes.extend_from_slice(&varint::encode(1));
        bytes.push(7);
        assert!(Beef::parse(&bytes).is_err());
    }
}
