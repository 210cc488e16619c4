//! BRC-42/43 key derivation and the `ProtoWallet` facade built on top of
//! it (spec §4.5, §4.10).

pub mod invoice;
pub mod message;
pub mod protocol;

pub use invoice::Counterparty;
pub use protocol::{EncryptionArgs, ProtoWallet};
