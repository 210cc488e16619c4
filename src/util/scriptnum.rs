//! Bitcoin Script's `CScriptNum` encoding: little-endian, minimally
//! encoded, sign carried in the high bit of the last byte.

use crate::error::ScriptError;

/// A decoded script number. Stored as `i64`, wide enough for every
/// value producible by the arithmetic opcodes without overflow under the
/// post-genesis length caps being misused as an invitation to overflow —
/// callers doing repeated arithmetic should still watch for `i64`
/// overflow at the edges of the allowed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScriptNum(pub i64);

impl ScriptNum {
    pub const ZERO: ScriptNum = ScriptNum(0);

    /// Decodes a minimally-encoded script number, rejecting inputs longer
    /// than `max_len` bytes.
    pub fn decode(bytes: &[u8], max_len: usize) -> Result<ScriptNum, ScriptError> {
        if bytes.len() > max_len {
            return Err(ScriptError::InvalidOperandSize);
        }
        if bytes.is_empty() {
            return Ok(ScriptNum(0));
        }
        let mut result: i64 = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            result |= (byte as i64) << (8 * i);
        }
        let last = bytes[bytes.len() - 1];
        if last & 0x80 != 0 {
            result &= !(0x80i64 << (8 * (bytes.len() - 1)));
            result = -result;
        }
        Ok(ScriptNum(result))
    }

    /// Encodes minimally: no trailing zero bytes unless needed to keep the
    /// sign bit from colliding with the magnitude's top bit.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        if self.0 == 0 {
            return Vec::new();
        }
        let neg = self.0 < 0;
        let mut abs = self.0.unsigned_abs();
        let mut out = Vec::new();
        while abs > 0 {
            out.push((abs & 0xFF) as u8);
            abs >>= 8;
        }
        if out.last().copied().unwrap_or(0) & 0x80 != 0 {
            out.push(if neg { 0x80 } else { 0x00 });
        } else if neg {
            *out.last_mut().unwrap() |= 0x80;
        }
        out
    }

    #[must_use]
    pub fn to_bool(self) -> bool {
        self.0 != 0
    }
}

impl From<i64> for ScriptNum {
    fn from(v: i64) -> Self {
        ScriptNum(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_encodes_empty() {
        assert_eq!(ScriptNum(0).encode(), Vec::<u8>::new());
        assert_eq!(ScriptNum::decode(&[], 4).unwrap(), ScriptNum(0));
    }

    #[test]
    fn round_trips_positive_and_negative() {
        for n in [1i64, -1, 127, 128, -128, 255, 256, -256, 65535, 70000, -70000] {
            let num = ScriptNum(n);
            let encoded = num.encode();
            let decoded = ScriptNum::decode(&encoded, 8).unwrap();
            assert_eq!(decoded, num, "n={n} encoded={encoded:?}");
        }
    }

    #[test]
    fn rejects_over_length_operand() {
        let bytes = [1u8, 2, 3, 4, 5];
        assert!(ScriptNum::decode(&bytes, 4).is_err());
    }

    #[test]
    fn to_bool_matches_nonzero() {
        assert!(!ScriptNum(0).to_bool());
        assert!(ScriptNum(1).to_bool());
        assert!(ScriptNum(-1).to_bool());
    }
}
