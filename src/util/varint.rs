//! Bitcoin's compact variable-length integer encoding (spec §4.2).

use crate::{Error, Result};

/// Encodes `n` using the shortest of the four Bitcoin VarInt forms.
#[must_use]
pub fn encode(n: u64) -> Vec<u8> {
    if n < 0xFD {
        vec![n as u8]
    } else if n <= 0xFFFF {
        let mut out = vec![0xFD];
        out.extend_from_slice(&(n as u16).to_le_bytes());
        out
    } else if n <= 0xFFFF_FFFF {
        let mut out = vec![0xFE];
        out.extend_from_slice(&(n as u32).to_le_bytes());
        out
    } else {
        let mut out = vec![0xFF];
        out.extend_from_slice(&n.to_le_bytes());
        out
    }
}

/// Decodes a VarInt from the front of `bytes`, returning the value and the
/// number of bytes consumed. `max`, if given, bounds the decoded value;
/// exceeding it is [`Error::MalformedLength`] rather than a successful
/// decode of an oversized count.
pub fn decode(bytes: &[u8], max: Option<u64>) -> Result<(u64, usize)> {
    let first = *bytes
        .first()
        .ok_or(Error::MalformedEncoding("empty VarInt"))?;
    let (value, consumed) = match first {
        0xFD => {
            let raw = bytes
                .get(1..3)
                .ok_or(Error::MalformedEncoding("truncated VarInt"))?;
            (u16::from_le_bytes([raw[0], raw[1]]) as u64, 3)
        }
        0xFE => {
            let raw = bytes
                .get(1..5)
                .ok_or(Error::MalformedEncoding("truncated VarInt"))?;
            (
                u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as u64,
                5,
            )
        }
        0xFF => {
            let raw = bytes
                .get(1..9)
                .ok_or(Error::MalformedEncoding("truncated VarInt"))?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(raw);
            (u64::from_le_bytes(buf), 9)
        }
        n => (n as u64, 1),
    };
    if let Some(max) = max {
        if value > max {
            return Err(Error::MalformedLength("VarInt exceeds caller bound"));
        }
    }
    Ok((value, consumed))
}
