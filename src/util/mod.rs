//! Container codecs that don't belong to any single higher-level module:
//! VarInt framing, Base58/Base58Check, and Script's number encoding.

pub mod base58;
pub mod scriptnum;
pub mod varint;
