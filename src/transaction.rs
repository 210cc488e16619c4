//! Transaction model and wire codec (spec §4.8).

use crate::hash;
use crate::script::Script;
use crate::util::varint;
use crate::{Error, Result};

const MAX_SATOSHIS: u64 = 21_000_000 * 100_000_000;

/// The `(satoshis, locking_script)` of the output an [`Input`] spends.
/// Off-wire: carried alongside a parsed `Input` only when the caller has
/// independently fetched it, for sighash computation (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutput {
    pub satoshis: u64,
    pub locking_script: Script,
}

/// A reference to a previous output being spent, plus the unlocking
/// script and sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub source_txid: [u8; 32],
    pub source_vout: u32,
    pub unlocking_script: Script,
    pub sequence: u32,
    /// Not part of the wire encoding; a builder or verifier attaches this
    /// after independently resolving the spent output.
    pub source_output: Option<SourceOutput>,
}

impl Input {
    #[must_use]
    pub fn is_coinbase_input(&self) -> bool {
        self.source_txid == [0u8; 32] && self.source_vout == 0xFFFF_FFFF
    }

    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.source_txid);
        out.extend_from_slice(&self.source_vout.to_le_bytes());
        let script_bytes = self.unlocking_script.serialize();
        out.extend_from_slice(&varint::encode(script_bytes.len() as u64));
        out.extend_from_slice(&script_bytes);
        out.extend_from_slice(&self.sequence.to_le_bytes());
    }

    fn parse(bytes: &[u8], cursor: &mut usize) -> Result<Self> {
        let source_txid = take_fixed::<32>(bytes, cursor)?;
        let source_vout = u32::from_le_bytes(take_fixed::<4>(bytes, cursor)?);
        let (script_len, _) = varint::decode(&bytes[*cursor..], None)?;
        *cursor += varint_width(script_len);
        let script_bytes = take_slice(bytes, cursor, script_len as usize)?;
        let unlocking_script = Script::parse(script_bytes)?;
        let sequence = u32::from_le_bytes(take_fixed::<4>(bytes, cursor)?);
        Ok(Input {
            source_txid,
            source_vout,
            unlocking_script,
            sequence,
            source_output: None,
        })
    }
}

/// A spendable output: an amount and a locking script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub satoshis: u64,
    pub locking_script: Script,
    /// Not part of the wire encoding; set by transaction builders to mark
    /// a change output, never read by `serialize`/`parse`.
    pub is_change: bool,
}

impl Output {
    fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.satoshis.to_le_bytes());
        let script_bytes = self.locking_script.serialize();
        out.extend_from_slice(&varint::encode(script_bytes.len() as u64));
        out.extend_from_slice(&script_bytes);
    }

    fn parse(bytes: &[u8], cursor: &mut usize) -> Result<Self> {
        let satoshis = u64::from_le_bytes(take_fixed::<8>(bytes, cursor)?);
        if satoshis > MAX_SATOSHIS {
            return Err(Error::MalformedEncoding("output satoshis exceed 21,000,000 BSV"));
        }
        let (script_len, _) = varint::decode(&bytes[*cursor..], None)?;
        *cursor += varint_width(script_len);
        let script_bytes = take_slice(bytes, cursor, script_len as usize)?;
        let locking_script = Script::parse(script_bytes)?;
        Ok(Output {
            satoshis,
            locking_script,
            is_change: false,
        })
    }
}

/// A full transaction: version, inputs, outputs, and lock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub lock_time: u32,
}

impl Transaction {
    /// `version(4) ∥ varint(ins) ∥ ins ∥ varint(outs) ∥ outs ∥ lock_time(4)`.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&varint::encode(self.inputs.len() as u64));
        for input in &self.inputs {
            input.serialize(&mut out);
        }
        out.extend_from_slice(&varint::encode(self.outputs.len() as u64));
        for output in &self.outputs {
            output.serialize(&mut out);
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = 0usize;
        let version = u32::from_le_bytes(take_fixed::<4>(bytes, &mut cursor)?);
        let (num_inputs, _) = varint::decode(&bytes[cursor..], None)?;
        cursor += varint_width(num_inputs);
        let mut inputs = Vec::with_capacity(num_inputs as usize);
        for _ in 0..num_inputs {
            inputs.push(Input::parse(bytes, &mut cursor)?);
        }
        let (num_outputs, _) = varint::decode(&bytes[cursor..], None)?;
        cursor += varint_width(num_outputs);
        let mut outputs = Vec::with_capacity(num_outputs as usize);
        for _ in 0..num_outputs {
            outputs.push(Output::parse(bytes, &mut cursor)?);
        }
        let lock_time = u32::from_le_bytes(take_fixed::<4>(bytes, &mut cursor)?);
        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// `sha256d` of the serialized transaction, in wire order.
    #[must_use]
    pub fn txid(&self) -> [u8; 32] {
        hash::sha256d(&self.serialize())
    }

    /// Conventional byte-reversed lowercase-hex display form of [`Self::txid`].
    #[must_use]
    pub fn txid_hex(&self) -> String {
        hash::reversed_hex(&self.txid())
    }

    /// A coinbase transaction has exactly one input whose `source_txid`
    /// is all zeros and `source_vout == 0xFFFF_FFFF`.
    #[must_use]
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_coinbase_input()
    }

    /// Size in bytes of the current serialization — used by fee/size
    /// estimation helpers, not part of consensus.
    #[must_use]
    pub fn estimated_size(&self) -> usize {
        self.serialize().len()
    }

    /// `sum(inputs) - sum(outputs)`, saturating at zero. Not a consensus
    /// check; callers validating a transaction must independently confirm
    /// `input_satoshis` against the actual previous outputs.
    #[must_use]
    pub fn fee(input_satoshis: u64, output_satoshis: u64) -> u64 {
        input_satoshis.saturating_sub(output_satoshis)
    }
}

fn take_fixed<const N: usize>(bytes: &[u8], cursor: &mut usize) -> Result<[u8; N]> {
    let slice = bytes
        .get(*cursor..*cursor + N)
        .ok_or(Error::MalformedLength("transaction field truncated"))?;
    *cursor += N;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

fn take_slice<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8]> {
    let slice = bytes
        .get(*cursor..*cursor + len)
        .ok_or(Error::MalformedLength("transaction script truncated"))?;
    *cursor += len;
    Ok(slice)
}

fn varint_width(n: u64) -> usize {
    match n {
        0..=0xFC => 1,
        0xFD..=0xFFFF => 3,
        0x1_0000..=0xFFFF_FFFF => 5,
        _ => 9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Chunk;

    fn sample_tx() -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![Input {
                source_txid: [0xAB; 32],
                source_vout: 0,
                unlocking_script: Script::from_chunks(vec![Chunk::Push(vec![1, 2, 3])]),
                sequence: 0xFFFF_FFFF,
                source_output: None,
            }],
            outputs: vec![Output {
                satoshis: 5000,
                locking_script: Script::template_p2pkh(&[0xCD; 20]),
                is_change: false,
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn round_trips_serialization() {
        let tx = sample_tx();
        let bytes = tx.serialize();
        assert_eq!(Transaction::parse(&bytes).unwrap(), tx);
    }

    #[test]
    fn rejects_satoshis_over_cap() {
        let mut tx = sample_tx();
        tx.outputs[0].satoshis = MAX_SATOSHIS + 1;
        let bytes = tx.serialize();
        assert!(Transaction::parse(&bytes).is_err());
    }

    #[test]
    fn detects_coinbase() {
        let mut tx = sample_tx();
        tx.inputs[0].source_txid = [0u8; 32];
        tx.inputs[0].source_vout = 0xFFFF_FFFF;
        assert!(tx.is_coinbase());
    }

    #[test]
    fn non_coinbase_is_not_flagged() {
        assert!(!sample_tx().is_coinbase());
    }
}
