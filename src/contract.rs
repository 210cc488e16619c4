//! A small DSL for assembling scripts and simulating their evaluation
//! end to end, in the style of rust-bitcoin's `script::Builder` (spec
//! §4.13). Not a consensus surface itself — it composes
//! [`crate::script`], [`crate::transaction`], and [`crate::sighash`] the
//! same way a caller building a spend by hand would.

use crate::config::InterpreterLimits;
use crate::ecdsa::Signature;
use crate::keys::public_key::PublicKey;
use crate::script::{Chunk, Interpreter, Opcode, Script};
use crate::sighash;
use crate::transaction::{Input, Output, SourceOutput, Transaction};
use crate::util::scriptnum::ScriptNum;
use crate::Result;

/// Accumulates [`Chunk`]s with helpers for pushing data/integers and for
/// structured `OP_IF`/`OP_ELSE`/`OP_ENDIF` branches, then hands back a
/// finished [`Script`].
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    chunks: Vec<Chunk>,
}

impl ScriptBuilder {
    #[must_use]
    pub fn new() -> Self {
        ScriptBuilder { chunks: Vec::new() }
    }

    #[must_use]
    pub fn push_slice(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.chunks.push(Chunk::Push(data.into()));
        self
    }

    /// Pushes `n`, using the one-byte `OP_1NEGATE`/`OP_1`..`OP_16` opcodes
    /// where they exist and a minimally-encoded `ScriptNum` push
    /// otherwise. `0` pushes empty data, matching how the rest of this
    /// crate represents `OP_0` (see [`crate::script::chunk`]).
    #[must_use]
    pub fn push_int(mut self, n: i64) -> Self {
        self.chunks.push(match n {
            0 => Chunk::Push(Vec::new()),
            -1 => Chunk::Op(Opcode::OP_1NEGATE),
            1..=16 => Chunk::Op(Opcode::from_byte(Opcode::OP_1.to_byte() + (n - 1) as u8)),
            _ => Chunk::Push(ScriptNum(n).encode()),
        });
        self
    }

    #[must_use]
    pub fn op(mut self, opcode: Opcode) -> Self {
        self.chunks.push(Chunk::Op(opcode));
        self
    }

    /// `OP_IF <then> OP_ENDIF`.
    #[must_use]
    pub fn op_if(mut self, then: impl FnOnce(ScriptBuilder) -> ScriptBuilder) -> Self {
        self.chunks.push(Chunk::Op(Opcode::OP_IF));
        self.chunks.extend(then(ScriptBuilder::new()).chunks);
        self.chunks.push(Chunk::Op(Opcode::OP_ENDIF));
        self
    }

    /// `OP_IF <then> OP_ELSE <else_> OP_ENDIF`.
    #[must_use]
    pub fn op_if_else(
        mut self,
        then: impl FnOnce(ScriptBuilder) -> ScriptBuilder,
        else_: impl FnOnce(ScriptBuilder) -> ScriptBuilder,
    ) -> Self {
        self.chunks.push(Chunk::Op(Opcode::OP_IF));
        self.chunks.extend(then(ScriptBuilder::new()).chunks);
        self.chunks.push(Chunk::Op(Opcode::OP_ELSE));
        self.chunks.extend(else_(ScriptBuilder::new()).chunks);
        self.chunks.push(Chunk::Op(Opcode::OP_ENDIF));
        self
    }

    /// `OP_NOTIF <then> OP_ENDIF`.
    #[must_use]
    pub fn op_notif(mut self, then: impl FnOnce(ScriptBuilder) -> ScriptBuilder) -> Self {
        self.chunks.push(Chunk::Op(Opcode::OP_NOTIF));
        self.chunks.extend(then(ScriptBuilder::new()).chunks);
        self.chunks.push(Chunk::Op(Opcode::OP_ENDIF));
        self
    }

    #[must_use]
    pub fn build(self) -> Script {
        Script::from_chunks(self.chunks)
    }
}

/// Builds the self-contained funding (coinbase-shaped) transaction that
/// pays `locking_script`, and the spending transaction that consumes it
/// via `unlocking_script`. Both carry a placeholder [`SourceOutput`]/
/// change output so [`simulate`] and [`sighash_for_spend`] agree on the
/// exact bytes a real signer would hash.
fn build_funding_and_spending(
    locking_script: &Script,
    funding_satoshis: u64,
    unlocking_script: Script,
) -> (Transaction, Transaction) {
    let funding_tx = Transaction {
        version: 1,
        inputs: vec![Input {
            source_txid: [0u8; 32],
            source_vout: 0xFFFF_FFFF,
            unlocking_script: Script::new(),
            sequence: 0xFFFF_FFFF,
            source_output: None,
        }],
        outputs: vec![Output {
            satoshis: funding_satoshis,
            locking_script: locking_script.clone(),
            is_change: false,
        }],
        lock_time: 0,
    };
    let funding_txid = funding_tx.txid();

    let spending_tx = Transaction {
        version: 1,
        inputs: vec![Input {
            source_txid: funding_txid,
            source_vout: 0,
            unlocking_script,
            sequence: 0xFFFF_FFFF,
            source_output: Some(SourceOutput {
                satoshis: funding_satoshis,
                locking_script: locking_script.clone(),
            }),
        }],
        outputs: vec![Output {
            satoshis: funding_satoshis.saturating_sub(1),
            locking_script: Script::new(),
            is_change: true,
        }],
        lock_time: 0,
    };
    (funding_tx, spending_tx)
}

/// The digest a signer must produce to satisfy `locking_script` when
/// spending an output of `funding_satoshis`, under the simulated
/// single-input/single-output spend [`simulate`] evaluates against.
/// Callers sign this digest, append the sighash-type byte, and pass the
/// resulting signature (plus pubkey) into the unlocking script they hand
/// to [`simulate`].
pub fn sighash_for_spend(
    locking_script: &Script,
    funding_satoshis: u64,
    sighash_type: u8,
) -> Result<[u8; 32]> {
    let (_, spending_tx) = build_funding_and_spending(locking_script, funding_satoshis, Script::new());
    sighash::compute_sighash(&spending_tx, 0, locking_script, funding_satoshis, sighash_type)
}

#[derive(Debug)]
pub struct SimulationResult {
    pub funding_tx: Transaction,
    pub spending_tx: Transaction,
    pub outcome: Result<()>,
}

/// Builds a funding transaction paying `locking_script`, a transaction
/// spending it with `unlocking_script`, and evaluates the pair with a
/// [`crate::script::SighashFn`] that performs real BIP-143 sighash
/// computation and ECDSA verification — exercising the interpreter the
/// same way a miner or wallet would, without any network or storage
/// dependency.
#[must_use]
pub fn simulate(
    locking_script: &Script,
    funding_satoshis: u64,
    unlocking_script: Script,
    limits: InterpreterLimits,
) -> SimulationResult {
    let (funding_tx, spending_tx) =
        build_funding_and_spending(locking_script, funding_satoshis, unlocking_script.clone());

    let sighash_fn = |subscript: &Script, sig_body: &[u8], pubkey_bytes: &[u8], sighash_type: u8| -> Result<bool> {
        let digest = sighash::compute_sighash(&spending_tx, 0, subscript, funding_satoshis, sighash_type)?;
        let pubkey = PublicKey::from_bytes(pubkey_bytes)?;
        let sig = Signature::from_der(sig_body)?;
        Ok(pubkey.verify(&digest, &sig))
    };

    let mut interp = Interpreter::with_sighash_fn(limits, &sighash_fn);
    let outcome = interp.eval(&unlocking_script, locking_script);

    SimulationResult {
        funding_tx,
        spending_tx,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::private_key::PrivateKey;
    use crate::sighash::{SIGHASH_ALL, SIGHASH_FORKID};

    const SIGHASH_ALL_FORKID: u8 = SIGHASH_ALL | SIGHASH_FORKID;

    #[test]
    fn builder_matches_p2pkh_template() {
        let hash = [0x42u8; 20];
        let built = ScriptBuilder::new()
            .op(Opcode::OP_DUP)
            .op(Opcode::OP_HASH160)
            .push_slice(hash.to_vec())
            .op(Opcode::OP_EQUALVERIFY)
            .op(Opcode::OP_CHECKSIG)
            .build();
        assert_eq!(built, Script::template_p2pkh(&hash));
    }

    #[test]
    fn push_int_uses_one_byte_opcodes_in_range() {
        let built = ScriptBuilder::new().push_int(0).push_int(1).push_int(16).push_int(17).build();
        assert_eq!(
            built,
            Script::from_chunks(vec![
                Chunk::Push(Vec::new()),
                Chunk::Op(Opcode::OP_1),
                Chunk::Op(Opcode::OP_16),
                Chunk::Push(ScriptNum(17).encode()),
            ])
        );
    }

    #[test]
    fn simulate_p2pkh_spend_succeeds_with_a_valid_signature() {
        let key = PrivateKey::random();
        let pubkey = key.public_key();
        let pubkey_hash = crate::hash::hash160(&pubkey.to_bytes_compressed());
        let locking_script = Script::template_p2pkh(&pubkey_hash);

        let digest = sighash_for_spend(&locking_script, 5000, SIGHASH_ALL_FORKID).unwrap();
        let sig = key.sign(&digest);
        let mut sig_bytes = sig.to_der();
        sig_bytes.push(SIGHASH_ALL_FORKID);

        let unlocking_script = ScriptBuilder::new()
            .push_slice(sig_bytes)
            .push_slice(pubkey.to_bytes_compressed().to_vec())
            .build();

        let result = simulate(&locking_script, 5000, unlocking_script, InterpreterLimits::POST_GENESIS);
        assert!(result.outcome.is_ok());
    }

    #[test]
    fn simulate_p2pkh_spend_fails_with_wrong_key() {
        let key = PrivateKey::random();
        let wrong_key = PrivateKey::random();
        let pubkey_hash = crate::hash::hash160(&key.public_key().to_bytes_compressed());
        let locking_script = Script::template_p2pkh(&pubkey_hash);

        let digest = sighash_for_spend(&locking_script, 5000, SIGHASH_ALL_FORKID).unwrap();
        let sig = wrong_key.sign(&digest);
        let mut sig_bytes = sig.to_der();
        sig_bytes.push(SIGHASH_ALL_FORKID);

        let unlocking_script = ScriptBuilder::new()
            .push_slice(sig_bytes)
            .push_slice(wrong_key.public_key().to_bytes_compressed().to_vec())
            .build();

        let result = simulate(&locking_script, 5000, unlocking_script, InterpreterLimits::POST_GENESIS);
        assert!(result.outcome.is_err());
    }

    #[test]
    fn op_if_else_builder_nests_correctly() {
        let built = ScriptBuilder::new()
            .push_int(1)
            .op_if_else(|b| b.push_int(2), |b| b.push_int(3))
            .build();
        assert_eq!(
            built,
            Script::from_chunks(vec![
                Chunk::Op(Opcode::OP_1),
                Chunk::Op(Opcode::OP_IF),
                Chunk::Op(Opcode::OP_2),
                Chunk::Op(Opcode::OP_ELSE),
                Chunk::Op(Opcode::OP_3),
                Chunk::Op(Opcode::OP_ENDIF),
            ])
        );
    }
}
