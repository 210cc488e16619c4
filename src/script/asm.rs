//! ASM (human-readable) rendering and parsing of [`Script`] (spec §4.6).

use super::chunk::{Chunk, Script};
use super::opcode::Opcode;
use crate::{Error, Result};

impl Script {
    /// Renders each push as lowercase hex (empty as `"OP_0"`) and each
    /// opcode as its canonical name, space-joined.
    #[must_use]
    pub fn to_asm(&self) -> String {
        self.0
            .iter()
            .map(|chunk| match chunk {
                Chunk::Push(data) if data.is_empty() => "OP_0".to_string(),
                Chunk::Push(data) => hex::encode(data),
                Chunk::Op(op) => op.name(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parses an ASM string back into a script. Tokens that decode as
    /// hex are treated as data pushes; everything else must be a
    /// recognized opcode name (including the aliases in spec §4.6).
    pub fn from_asm(asm: &str) -> Result<Self> {
        let mut chunks = Vec::new();
        for token in asm.split_whitespace() {
            // `OP_0`/`OP_FALSE` is the empty data push on the wire (byte
            // 0x00), never a bare opcode chunk — see `Script::parse`.
            if token == "OP_0" || token == "OP_FALSE" {
                chunks.push(Chunk::Push(Vec::new()));
                continue;
            }
            if let Some(op) = Opcode::from_name(token) {
                chunks.push(Chunk::Op(op));
                continue;
            }
            let data = hex::decode(token)
                .map_err(|_| Error::MalformedEncoding("ASM token is neither an opcode nor hex"))?;
            chunks.push(Chunk::Push(data));
        }
        Ok(Script::from_chunks(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_p2pkh_style_script() {
        let script = Script::from_chunks(vec![
            Chunk::Op(Opcode::OP_DUP),
            Chunk::Op(Opcode::OP_HASH160),
            Chunk::Push(vec![0xAB; 20]),
            Chunk::Op(Opcode::OP_EQUALVERIFY),
            Chunk::Op(Opcode::OP_CHECKSIG),
        ]);
        let asm = script.to_asm();
        assert_eq!(
            asm,
            format!("OP_DUP OP_HASH160 {} OP_EQUALVERIFY OP_CHECKSIG", "ab".repeat(20))
        );
        assert_eq!(Script::from_asm(&asm).unwrap(), script);
    }

    #[test]
    fn empty_push_renders_as_op_0() {
        let script = Script::from_chunks(vec![Chunk::Push(Vec::new())]);
        assert_eq!(script.to_asm(), "OP_0");
        assert_eq!(Script::from_asm("OP_0").unwrap(), script);
    }

    #[test]
    fn accepts_true_false_aliases_on_parse() {
        let script = Script::from_asm("OP_TRUE OP_FALSE").unwrap();
        assert_eq!(
            script,
            Script::from_chunks(vec![Chunk::Op(Opcode::OP_1), Chunk::Push(Vec::new())])
        );
    }

    #[test]
    fn unknown_opcode_round_trips_through_asm() {
        let script = Script::from_chunks(vec![Chunk::Op(Opcode::OP_UNKNOWN(0xFF))]);
        let asm = script.to_asm();
        assert_eq!(asm, "OP_UNKNOWN255");
        assert_eq!(Script::from_asm(&asm).unwrap(), script);
    }
}
