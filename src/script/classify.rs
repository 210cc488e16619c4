//! Script template classifiers (spec §4.6): P2PKH, P2SH, OP_RETURN.

use super::chunk::{Chunk, Script};
use super::opcode::Opcode;

impl Script {
    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    #[must_use]
    pub fn is_p2pkh(&self) -> bool {
        matches!(
            self.0.as_slice(),
            [
                Chunk::Op(Opcode::OP_DUP),
                Chunk::Op(Opcode::OP_HASH160),
                Chunk::Push(hash),
                Chunk::Op(Opcode::OP_EQUALVERIFY),
                Chunk::Op(Opcode::OP_CHECKSIG),
            ] if hash.len() == 20
        )
    }

    /// `OP_HASH160 <20 bytes> OP_EQUAL`.
    #[must_use]
    pub fn is_p2sh(&self) -> bool {
        matches!(
            self.0.as_slice(),
            [
                Chunk::Op(Opcode::OP_HASH160),
                Chunk::Push(hash),
                Chunk::Op(Opcode::OP_EQUAL),
            ] if hash.len() == 20
        )
    }

    /// Any script beginning with `OP_RETURN`, `OP_FALSE OP_RETURN`, or a
    /// leading empty push followed by `OP_RETURN`.
    #[must_use]
    pub fn is_op_return(&self) -> bool {
        match self.0.as_slice() {
            [Chunk::Op(Opcode::OP_RETURN), ..] => true,
            [Chunk::Push(empty), Chunk::Op(Opcode::OP_RETURN), ..] if empty.is_empty() => true,
            _ => false,
        }
    }

    /// Builds a standard P2PKH locking script for `pubkey_hash` (20
    /// bytes, e.g. `hash160` of a compressed public key).
    #[must_use]
    pub fn template_p2pkh(pubkey_hash: &[u8; 20]) -> Self {
        Script::from_chunks(vec![
            Chunk::Op(Opcode::OP_DUP),
            Chunk::Op(Opcode::OP_HASH160),
            Chunk::Push(pubkey_hash.to_vec()),
            Chunk::Op(Opcode::OP_EQUALVERIFY),
            Chunk::Op(Opcode::OP_CHECKSIG),
        ])
    }

    /// Builds a standard P2SH locking script for `script_hash` (20
    /// bytes, `hash160` of the redeem script).
    #[must_use]
    pub fn template_p2sh(script_hash: &[u8; 20]) -> Self {
        Script::from_chunks(vec![
            Chunk::Op(Opcode::OP_HASH160),
            Chunk::Push(script_hash.to_vec()),
            Chunk::Op(Opcode::OP_EQUAL),
        ])
    }

    /// Builds an unspendable `OP_RETURN` data-carrier script with one
    /// push per element of `data`.
    #[must_use]
    pub fn template_op_return(data: &[Vec<u8>]) -> Self {
        let mut chunks = vec![Chunk::Op(Opcode::OP_RETURN)];
        chunks.extend(data.iter().cloned().map(Chunk::Push));
        Script::from_chunks(chunks)
    }
}
