//! The full Bitcoin Script opcode roster (spec §4.6/§4.7).

#![allow(non_camel_case_types)]

/// A single Script opcode byte, named per Bitcoin convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    OP_0,
    OP_PUSHDATA1,
    OP_PUSHDATA2,
    OP_PUSHDATA4,
    OP_1NEGATE,
    OP_RESERVED,
    OP_1,
    OP_2,
    OP_3,
    OP_4,
    OP_5,
    OP_6,
    OP_7,
    OP_8,
    OP_9,
    OP_10,
    OP_11,
    OP_12,
    OP_13,
    OP_14,
    OP_15,
    OP_16,

    OP_NOP,
    OP_VER,
    OP_IF,
    OP_NOTIF,
    OP_VERIF,
    OP_VERNOTIF,
    OP_ELSE,
    OP_ENDIF,
    OP_VERIFY,
    OP_RETURN,

    OP_TOALTSTACK,
    OP_FROMALTSTACK,
    OP_2DROP,
    OP_2DUP,
    OP_3DUP,
    OP_2OVER,
    OP_2ROT,
    OP_2SWAP,
    OP_IFDUP,
    OP_DEPTH,
    OP_DROP,
    OP_DUP,
    OP_NIP,
    OP_OVER,
    OP_PICK,
    OP_ROLL,
    OP_ROT,
    OP_SWAP,
    OP_TUCK,

    OP_CAT,
    OP_SPLIT,
    OP_NUM2BIN,
    OP_BIN2NUM,
    OP_SIZE,

    OP_INVERT,
    OP_AND,
    OP_OR,
    OP_XOR,
    OP_EQUAL,
    OP_EQUALVERIFY,

    OP_1ADD,
    OP_1SUB,
    OP_NEGATE,
    OP_ABS,
    OP_NOT,
    OP_0NOTEQUAL,
    OP_ADD,
    OP_SUB,
    OP_MUL,
    OP_DIV,
    OP_MOD,
    OP_LSHIFT,
    OP_RSHIFT,

    OP_BOOLAND,
    OP_BOOLOR,
    OP_NUMEQUAL,
    OP_NUMEQUALVERIFY,
    OP_NUMNOTEQUAL,
    OP_LESSTHAN,
    OP_GREATERTHAN,
    OP_LESSTHANOREQUAL,
    OP_GREATERTHANOREQUAL,
    OP_MIN,
    OP_MAX,
    OP_WITHIN,

    OP_RIPEMD160,
    OP_SHA1,
    OP_SHA256,
    OP_HASH160,
    OP_HASH256,
    OP_CODESEPARATOR,
    OP_CHECKSIG,
    OP_CHECKSIGVERIFY,
    OP_CHECKMULTISIG,
    OP_CHECKMULTISIGVERIFY,

    OP_NOP1,
    OP_CHECKLOCKTIMEVERIFY,
    OP_CHECKSEQUENCEVERIFY,
    OP_NOP4,
    OP_NOP5,
    OP_NOP6,
    OP_NOP7,
    OP_NOP8,
    OP_NOP9,
    OP_NOP10,

    /// Any byte not otherwise assigned a meaning; carries the raw value
    /// so it can still round-trip through ASM as `OP_UNKNOWN{n}`.
    OP_UNKNOWN(u8),
}

impl Opcode {
    #[must_use]
    pub fn from_byte(b: u8) -> Opcode {
        use Opcode::*;
        match b {
            0x00 => OP_0,
            0x4C => OP_PUSHDATA1,
            0x4D => OP_PUSHDATA2,
            0x4E => OP_PUSHDATA4,
            0x4F => OP_1NEGATE,
            0x50 => OP_RESERVED,
            0x51 => OP_1,
            0x52 => OP_2,
            0x53 => OP_3,
            0x54 => OP_4,
            0x55 => OP_5,
            0x56 => OP_6,
            0x57 => OP_7,
            0x58 => OP_8,
            0x59 => OP_9,
            0x5A => OP_10,
            0x5B => OP_11,
            0x5C => OP_12,
            0x5D => OP_13,
            0x5E => OP_14,
            0x5F => OP_15,
            0x60 => OP_16,
            0x61 => OP_NOP,
            0x62 => OP_VER,
            0x63 => OP_IF,
            0x64 => OP_NOTIF,
            0x65 => OP_VERIF,
            0x66 => OP_VERNOTIF,
            0x67 => OP_ELSE,
            0x68 => OP_ENDIF,
            0x69 => OP_VERIFY,
            0x6A => OP_RETURN,
            0x6B => OP_TOALTSTACK,
            0x6C => OP_FROMALTSTACK,
            0x6D => OP_2DROP,
            0x6E => OP_2DUP,
            0x6F => OP_3DUP,
            0x70 => OP_2OVER,
            0x71 => OP_2ROT,
            0x72 => OP_2SWAP,
            0x73 => OP_IFDUP,
            0x74 => OP_DEPTH,
            0x75 => OP_DROP,
            0x76 => OP_DUP,
            0x77 => OP_NIP,
            0x78 => OP_OVER,
            0x79 => OP_PICK,
            0x7A => OP_ROLL,
            0x7B => OP_ROT,
            0x7C => OP_SWAP,
            0x7D => OP_TUCK,
            0x7E => OP_CAT,
            0x7F => OP_SPLIT,
            0x80 => OP_NUM2BIN,
            0x81 => OP_BIN2NUM,
            0x82 => OP_SIZE,
            0x83 => OP_INVERT,
            0x84 => OP_AND,
            0x85 => OP_OR,
            0x86 => OP_XOR,
            0x87 => OP_EQUAL,
            0x88 => OP_EQUALVERIFY,
            0x8B => OP_1ADD,
            0x8C => OP_1SUB,
            0x8F => OP_NEGATE,
            0x90 => OP_ABS,
            0x91 => OP_NOT,
            0x92 => OP_0NOTEQUAL,
            0x93 => OP_ADD,
            0x94 => OP_SUB,
            0x95 => OP_MUL,
            0x96 => OP_DIV,
            0x97 => OP_MOD,
            0x98 => OP_LSHIFT,
            0x99 => OP_RSHIFT,
            0x9A => OP_BOOLAND,
            0x9B => OP_BOOLOR,
            0x9C => OP_NUMEQUAL,
            0x9D => OP_NUMEQUALVERIFY,
            0x9E => OP_NUMNOTEQUAL,
            0x9F => OP_LESSTHAN,
            0xA0 => OP_GREATERTHAN,
            0xA1 => OP_LESSTHANOREQUAL,
            0xA2 => OP_GREATERTHANOREQUAL,
            0xA3 => OP_MIN,
            0xA4 => OP_MAX,
            0xA5 => OP_WITHIN,
            0xA6 => OP_RIPEMD160,
            0xA7 => OP_SHA1,
            0xA8 => OP_SHA256,
            0xA9 => OP_HASH160,
            0xAA => OP_HASH256,
            0xAB => OP_CODESEPARATOR,
            0xAC => OP_CHECKSIG,
            0xAD => OP_CHECKSIGVERIFY,
            0xAE => OP_CHECKMULTISIG,
            0xAF => OP_CHECKMULTISIGVERIFY,
            0xB0 => OP_NOP1,
            0xB1 => OP_CHECKLOCKTIMEVERIFY,
            0xB2 => OP_CHECKSEQUENCEVERIFY,
            0xB3 => OP_NOP4,
            0xB4 => OP_NOP5,
            0xB5 => OP_NOP6,
            0xB6 => OP_NOP7,
            0xB7 => OP_NOP8,
            0xB8 => OP_NOP9,
            0xB9 => OP_NOP10,
            other => OP_UNKNOWN(other),
        }
    }

    #[must_use]
    pub fn to_byte(self) -> u8 {
        use Opcode::*;
        match self {
            OP_0 => 0x00,
            OP_PUSHDATA1 => 0x4C,
            OP_PUSHDATA2 => 0x4D,
            OP_PUSHDATA4 => 0x4E,
            OP_1NEGATE => 0x4F,
            OP_RESERVED => 0x50,
            OP_1 => 0x51,
            OP_2 => 0x52,
            OP_3 => 0x53,
            OP_4 => 0x54,
            OP_5 => 0x55,
            OP_6 => 0x56,
            OP_7 => 0x57,
            OP_8 => 0x58,
            OP_9 => 0x59,
            OP_10 => 0x5A,
            OP_11 => 0x5B,
            OP_12 => 0x5C,
            OP_13 => 0x5D,
            OP_14 => 0x5E,
            OP_15 => 0x5F,
            OP_16 => 0x60,
            OP_NOP => 0x61,
            OP_VER => 0x62,
            OP_IF => 0x63,
            OP_NOTIF => 0x64,
            OP_VERIF => 0x65,
            OP_VERNOTIF => 0x66,
            OP_ELSE => 0x67,
            OP_ENDIF => 0x68,
            OP_VERIFY => 0x69,
            OP_RETURN => 0x6A,
            OP_TOALTSTACK => 0x6B,
            OP_FROMALTSTACK => 0x6C,
            OP_2DROP => 0x6D,
            OP_2DUP => 0x6E,
            OP_3DUP => 0x6F,
            OP_2OVER => 0x70,
            OP_2ROT => 0x71,
            OP_2SWAP => 0x72,
            OP_IFDUP => 0x73,
            OP_DEPTH => 0x74,
            OP_DROP => 0x75,
            OP_DUP => 0x76,
            OP_NIP => 0x77,
            OP_OVER => 0x78,
            OP_PICK => 0x79,
            OP_ROLL => 0x7A,
            OP_ROT => 0x7B,
            OP_SWAP => 0x7C,
            OP_TUCK => 0x7D,
            OP_CAT => 0x7E,
            OP_SPLIT => 0x7F,
            OP_NUM2BIN => 0x80,
            OP_BIN2NUM => 0x81,
            OP_SIZE => 0x82,
            OP_INVERT => 0x83,
            OP_AND => 0x84,
            OP_OR => 0x85,
            OP_XOR => 0x86,
            OP_EQUAL => 0x87,
            OP_EQUALVERIFY => 0x88,
            OP_1ADD => 0x8B,
            OP_1SUB => 0x8C,
            OP_NEGATE => 0x8F,
            OP_ABS => 0x90,
            OP_NOT => 0x91,
            OP_0NOTEQUAL => 0x92,
            OP_ADD => 0x93,
            OP_SUB => 0x94,
            OP_MUL => 0x95,
            OP_DIV => 0x96,
            OP_MOD => 0x97,
            OP_LSHIFT => 0x98,
            OP_RSHIFT => 0x99,
            OP_BOOLAND => 0x9A,
            OP_BOOLOR => 0x9B,
            OP_NUMEQUAL => 0x9C,
            OP_NUMEQUALVERIFY => 0x9D,
            OP_NUMNOTEQUAL => 0x9E,
            OP_LESSTHAN => 0x9F,
            OP_GREATERTHAN => 0xA0,
            OP_LESSTHANOREQUAL => 0xA1,
            OP_GREATERTHANOREQUAL => 0xA2,
            OP_MIN => 0xA3,
            OP_MAX => 0xA4,
            OP_WITHIN => 0xA5,
            OP_RIPEMD160 => 0xA6,
            OP_SHA1 => 0xA7,
            OP_SHA256 => 0xA8,
            OP_HASH160 => 0xA9,
            OP_HASH256 => 0xAA,
            OP_CODESEPARATOR => 0xAB,
            OP_CHECKSIG => 0xAC,
            OP_CHECKSIGVERIFY => 0xAD,
            OP_CHECKMULTISIG => 0xAE,
            OP_CHECKMULTISIGVERIFY => 0xAF,
            OP_NOP1 => 0xB0,
            OP_CHECKLOCKTIMEVERIFY => 0xB1,
            OP_CHECKSEQUENCEVERIFY => 0xB2,
            OP_NOP4 => 0xB3,
            OP_NOP5 => 0xB4,
            OP_NOP6 => 0xB5,
            OP_NOP7 => 0xB6,
            OP_NOP8 => 0xB7,
            OP_NOP9 => 0xB8,
            OP_NOP10 => 0xB9,
            OP_UNKNOWN(b) => b,
        }
    }

    /// Canonical ASM name, matching Bitcoin Core's naming exactly.
    #[must_use]
    pub fn name(self) -> String {
        use Opcode::*;
        match self {
            OP_0 => "OP_0".to_string(),
            OP_UNKNOWN(b) => format!("OP_UNKNOWN{b}"),
            other => format!("{other:?}"),
        }
    }

    /// Parses a canonical name (and the accepted aliases `OP_TRUE`,
    /// `OP_FALSE` — spec §4.6 — plus `OP_UNKNOWN{n}`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Opcode> {
        use Opcode::*;
        match name {
            "OP_0" | "OP_FALSE" => return Some(OP_0),
            "OP_1" | "OP_TRUE" => return Some(OP_1),
            _ => {}
        }
        if let Some(rest) = name.strip_prefix("OP_UNKNOWN") {
            if let Ok(b) = rest.parse::<u16>() {
                if b <= 255 {
                    return Some(OP_UNKNOWN(b as u8));
                }
            }
        }
        ALL_NAMED.iter().find(|op| op.name() == name).copied()
    }
}

/// Every named opcode other than `OP_UNKNOWN`, used by [`Opcode::from_name`].
const ALL_NAMED: &[Opcode] = &{
    use Opcode::*;
    [
        OP_0,
        OP_PUSHDATA1,
        OP_PUSHDATA2,
        OP_PUSHDATA4,
        OP_1NEGATE,
        OP_RESERVED,
        OP_1,
        OP_2,
        OP_3,
        OP_4,
        OP_5,
        OP_6,
        OP_7,
        OP_8,
        OP_9,
        OP_10,
        OP_11,
        OP_12,
        OP_13,
        OP_14,
        OP_15,
        OP_16,
        OP_NOP,
        OP_VER,
        OP_IF,
        OP_NOTIF,
        OP_VERIF,
        OP_VERNOTIF,
        OP_ELSE,
        OP_ENDIF,
        OP_VERIFY,
        OP_RETURN,
        OP_TOALTSTACK,
        OP_FROMALTSTACK,
        OP_2DROP,
        OP_2DUP,
        OP_3DUP,
        OP_2OVER,
        OP_2ROT,
        OP_2SWAP,
        OP_IFDUP,
        OP_DEPTH,
        OP_DROP,
        OP_DUP,
        OP_NIP,
        OP_OVER,
        OP_PICK,
        OP_ROLL,
        OP_ROT,
        OP_SWAP,
        OP_TUCK,
        OP_CAT,
        OP_SPLIT,
        OP_NUM2BIN,
        OP_BIN2NUM,
        OP_SIZE,
        OP_INVERT,
        OP_AND,
        OP_OR,
        OP_XOR,
        OP_EQUAL,
        OP_EQUALVERIFY,
        OP_1ADD,
        OP_1SUB,
        OP_NEGATE,
        OP_ABS,
        OP_NOT,
        OP_0NOTEQUAL,
        OP_ADD,
        OP_SUB,
        OP_MUL,
        OP_DIV,
        OP_MOD,
        OP_LSHIFT,
        OP_RSHIFT,
        OP_BOOLAND,
        OP_BOOLOR,
        OP_NUMEQUAL,
        OP_NUMEQUALVERIFY,
        OP_NUMNOTEQUAL,
        OP_LESSTHAN,
        OP_GREATERTHAN,
        OP_LESSTHANOREQUAL,
        OP_GREATERTHANOREQUAL,
        OP_MIN,
        OP_MAX,
        OP_WITHIN,
        OP_RIPEMD160,
        OP_SHA1,
        OP_SHA256,
        OP_HASH160,
        OP_HASH256,
        OP_CODESEPARATOR,
        OP_CHECKSIG,
        OP_CHECKSIGVERIFY,
        OP_CHECKMULTISIG,
        OP_CHECKMULTISIGVERIFY,
        OP_NOP1,
        OP_CHECKLOCKTIMEVERIFY,
        OP_CHECKSEQUENCEVERIFY,
        OP_NOP4,
        OP_NOP5,
        OP_NOP6,
        OP_NOP7,
        OP_NOP8,
        OP_NOP9,
        OP_NOP10,
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trips_for_every_named_opcode() {
        for &op in ALL_NAMED {
            assert_eq!(Opcode::from_byte(op.to_byte()), op);
        }
    }

    #[test]
    fn unknown_byte_round_trips() {
        let op = Opcode::from_byte(0xFF);
        assert_eq!(op, Opcode::OP_UNKNOWN(0xFF));
        assert_eq!(op.to_byte(), 0xFF);
    }

    #[test]
    fn true_false_are_accepted_aliases() {
        assert_eq!(Opcode::from_name("OP_TRUE"), Some(Opcode::OP_1));
        assert_eq!(Opcode::from_name("OP_FALSE"), Some(Opcode::OP_0));
    }

    #[test]
    fn name_round_trips_through_from_name() {
        assert_eq!(
            Opcode::from_name(&Opcode::OP_CHECKSIG.name()),
            Some(Opcode::OP_CHECKSIG)
        );
        assert_eq!(
            Opcode::from_name(&Opcode::OP_UNKNOWN(0xFF).name()),
            Some(Opcode::OP_UNKNOWN(0xFF))
        );
    }
}
