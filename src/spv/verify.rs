//! Injected-collaborator verification for BEEF bundles (spec §5, §6, §9).
//!
//! The core never performs I/O. Confirming that a BEEF bundle's ancestry
//! actually lands in a block the caller trusts requires looking things up
//! — a parent transaction not carried in the bundle, a block's merkle root
//! at a given height — so those lookups are injected as synchronous
//! collaborator traits rather than baked in as an HTTP client.

use std::collections::HashMap;

use crate::hash;
use crate::spv::beef::{Beef, BeefTx};
use crate::transaction::Transaction;
use crate::{Error, Result};

/// Resolves a txid to its raw transaction bytes (spec §6's `TxFetcher`
/// contract). The core verifies `sha256d(raw_tx) == txid` before trusting
/// anything the fetcher returns.
pub trait TxFetcher {
    fn fetch(&self, txid: &[u8; 32]) -> Result<Vec<u8>>;
}

impl<F> TxFetcher for F
where
    F: Fn(&[u8; 32]) -> Result<Vec<u8>>,
{
    fn fetch(&self, txid: &[u8; 32]) -> Result<Vec<u8>> {
        self(txid)
    }
}

/// Resolves a block height to the merkle root recorded in that block's
/// header, so a BEEF bump can be checked against a chain the caller
/// actually trusts rather than merely self-consistent.
pub trait BlockRootFetcher {
    fn merkle_root_at(&self, block_height: u64) -> Result<[u8; 32]>;
}

impl<F> BlockRootFetcher for F
where
    F: Fn(u64) -> Result<[u8; 32]>,
{
    fn merkle_root_at(&self, block_height: u64) -> Result<[u8; 32]> {
        self(block_height)
    }
}

/// Fetches and parses the transaction for `txid`, rejecting any payload
/// whose hash doesn't match what was asked for.
pub fn fetch_transaction(fetcher: &dyn TxFetcher, txid: &[u8; 32]) -> Result<Transaction> {
    let raw = fetcher.fetch(txid)?;
    if hash::sha256d(&raw) != *txid {
        return Err(Error::InvariantViolation(
            "transaction fetcher returned a payload whose hash did not match the requested txid",
        ));
    }
    Transaction::parse(&raw)
}

/// Verifies a BEEF bundle: every `raw_tx_and_bump` entry's merkle path
/// must recompute to the root `roots` reports for its declared height,
/// and every `raw_tx` entry's ancestry must resolve — from the bundle
/// itself, or from `fetcher` when supplied — back to either a coinbase
/// input or a bump-anchored transaction.
///
/// Only input 0 is followed when walking ancestors, matching the
/// reference lineage validator (spec §9 open question); a multi-input
/// transaction's other inputs are not required to resolve.
pub fn verify_beef(
    beef: &Beef,
    roots: &dyn BlockRootFetcher,
    fetcher: Option<&dyn TxFetcher>,
    max_depth: usize,
) -> Result<()> {
    let by_txid = index_by_txid(beef);

    for entry in &beef.transactions {
        if let BeefTx::RawWithBump { tx, bump_index } = entry {
            let bump = beef.bumps.get(*bump_index as usize).ok_or(
                Error::InvariantViolation("BEEF transaction references an out-of-range bump index"),
            )?;
            let txid = tx.txid();
            let offset = bump
                .levels
                .first()
                .and_then(|level| level.iter().find(|node| node.is_client_txid()))
                .map(|node| node.offset)
                .ok_or(Error::InvariantViolation("bump has no client-txid leaf"))?;
            let root = bump.compute_root(&txid, offset)?;
            let expected = roots.merkle_root_at(bump.block_height)?;
            if root != expected {
                return Err(Error::InvariantViolation(
                    "BEEF bump's recomputed root does not match the chain root at its declared height",
                ));
            }
        }
    }

    for entry in &beef.transactions {
        if let BeefTx::Raw(tx) = entry {
            verify_lineage_input0(tx, &by_txid, fetcher, max_depth)?;
        }
    }
    Ok(())
}

fn index_by_txid(beef: &Beef) -> HashMap<[u8; 32], &BeefTx> {
    let mut map = HashMap::with_capacity(beef.transactions.len());
    for entry in &beef.transactions {
        let txid = match entry {
            BeefTx::Raw(tx) | BeefTx::RawWithBump { tx, .. } => tx.txid(),
            BeefTx::TxidOnly(txid) => *txid,
        };
        map.insert(txid, entry);
    }
    map
}

fn verify_lineage_input0(
    tx: &Transaction,
    by_txid: &HashMap<[u8; 32], &BeefTx>,
    fetcher: Option<&dyn TxFetcher>,
    max_depth: usize,
) -> Result<()> {
    let mut current = tx.clone();
    for _ in 0..=max_depth {
        let Some(input) = current.inputs.first() else {
            return Ok(());
        };
        if input.is_coinbase_input() {
            return Ok(());
        }
        let parent_txid = input.source_txid;
        current = match by_txid.get(&parent_txid) {
            Some(BeefTx::Raw(parent) | BeefTx::RawWithBump { tx: parent, .. }) => parent.clone(),
            Some(BeefTx::TxidOnly(_)) => return Ok(()),
            None => match fetcher {
                Some(fetcher) => fetch_transaction(fetcher, &parent_txid)?,
                None => {
                    return Err(Error::InvariantViolation(
                        "BEEF lineage references a transaction absent from the bundle with no fetcher supplied",
                    ))
                }
            },
        };
    }
    Err(Error::InvariantViolation(
        "BEEF lineage walk exceeded the configured depth",
    ))
}
