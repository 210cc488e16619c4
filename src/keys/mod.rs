//! Key types and derivations (spec §4.5): private/public/symmetric keys,
//! WIF, ECDH, BIP-32 HD tree, BIP-39 mnemonics. BRC-42 child derivation
//! lives in [`crate::wallet::invoice`] since it is shared with the
//! wallet-protocol layer.

pub mod bip32;
pub mod bip39;
pub mod ecdh;
pub mod private_key;
pub mod public_key;
pub mod symmetric_key;
pub mod wif;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use symmetric_key::SymmetricKey;
