//! A parsed Script as a list of chunks: each chunk is either a data push
//! or a bare opcode (spec §4.6).

use super::opcode::Opcode;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Push(Vec<u8>),
    Op(Opcode),
}

/// A script is just its flat chunk list; binary (de)serialization and ASM
/// rendering live alongside it here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script(pub Vec<Chunk>);

impl Script {
    #[must_use]
    pub fn new() -> Self {
        Script(Vec::new())
    }

    #[must_use]
    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Script(chunks)
    }

    /// Parses a binary script, decoding pushdata opcodes into
    /// [`Chunk::Push`] and everything else into [`Chunk::Op`]. Truncated
    /// pushdata length prefixes or payloads are [`Error::MalformedLength`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut chunks = Vec::new();
        let mut i = 0usize;
        while i < bytes.len() {
            let byte = bytes[i];
            i += 1;
            match byte {
                0x00 => chunks.push(Chunk::Push(Vec::new())),
                0x01..=0x4B => {
                    let len = byte as usize;
                    let data = take(bytes, &mut i, len)?;
                    chunks.push(Chunk::Push(data));
                }
                0x4C => {
                    let len = take(bytes, &mut i, 1)?[0] as usize;
                    let data = take(bytes, &mut i, len)?;
                    chunks.push(Chunk::Push(data));
                }
                0x4D => {
                    let raw = take(bytes, &mut i, 2)?;
                    let len = u16::from_le_bytes([raw[0], raw[1]]) as usize;
                    let data = take(bytes, &mut i, len)?;
                    chunks.push(Chunk::Push(data));
                }
                0x4E => {
                    let raw = take(bytes, &mut i, 4)?;
                    let len =
                        u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
                    let data = take(bytes, &mut i, len)?;
                    chunks.push(Chunk::Push(data));
                }
                other => chunks.push(Chunk::Op(Opcode::from_byte(other))),
            }
        }
        Ok(Script(chunks))
    }

    /// Serializes back to binary, always choosing the minimal pushdata
    /// form for each push.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for chunk in &self.0 {
            match chunk {
                Chunk::Push(data) => encode_push(&mut out, data),
                Chunk::Op(op) => out.push(op.to_byte()),
            }
        }
        out
    }
}

fn take(bytes: &[u8], i: &mut usize, len: usize) -> Result<Vec<u8>> {
    let end = *i + len;
    let slice = bytes
        .get(*i..end)
        .ok_or(Error::MalformedLength("pushdata truncated (DataTooSmall)"))?;
    *i = end;
    Ok(slice.to_vec())
}

fn encode_push(out: &mut Vec<u8>, data: &[u8]) {
    let len = data.len();
    if len == 0 {
        out.push(0x00);
    } else if len <= 0x4B {
        out.push(len as u8);
        out.extend_from_slice(data);
    } else if len <= 0xFF {
        out.push(0x4C);
        out.push(len as u8);
        out.extend_from_slice(data);
    } else if len <= 0xFFFF {
        out.push(0x4D);
        out.extend_from_slice(&(len as u16).to_le_bytes());
        out.extend_from_slice(data);
    } else {
        out.push(0x4E);
        out.extend_from_slice(&(len as u32).to_le_bytes());
        out.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_small_push() {
        let script = Script::from_chunks(vec![Chunk::Push(vec![1, 2, 3])]);
        let bytes = script.serialize();
        assert_eq!(bytes, vec![3, 1, 2, 3]);
        assert_eq!(Script::parse(&bytes).unwrap(), script);
    }

    #[test]
    fn round_trips_pushdata1() {
        let data = vec![0xAB; 200];
        let script = Script::from_chunks(vec![Chunk::Push(data.clone())]);
        let bytes = script.serialize();
        assert_eq!(bytes[0], 0x4C);
        assert_eq!(Script::parse(&bytes).unwrap(), script);
    }

    #[test]
    fn round_trips_opcodes_and_empty_push() {
        let script = Script::from_chunks(vec![
            Chunk::Push(Vec::new()),
            Chunk::Op(Opcode::OP_DUP),
            Chunk::Op(Opcode::OP_HASH160),
            Chunk::Push(vec![0u8; 20]),
            Chunk::Op(Opcode::OP_EQUALVERIFY),
            Chunk::Op(Opcode::OP_CHECKSIG),
        ]);
        let bytes = script.serialize();
        assert_eq!(Script::parse(&bytes).unwrap(), script);
    }

    #[test]
    fn rejects_truncated_pushdata() {
        assert!(Script::parse(&[0x4C, 0x05, 0x01, 0x02]).is_err());
    }
}
