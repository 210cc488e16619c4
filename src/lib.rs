//! bsv-core
//!
//! Core primitives for constructing, signing, serializing, and verifying
//! Bitcoin SV transactions and scripts: secp256k1 and ECDSA, BRC-42/43 and
//! BIP-32 key derivation, the Script stack machine, the transaction model
//! and BIP-143 sighash, SPV containers (block headers, BRC-74 merkle
//! paths, BEEF), BRC-31 identity certificates, and a small contract-DSL
//! harness for simulating spends.
//!
//! This crate has no network, storage, or mining surface — callers wire
//! it to a chain source (a broadcaster, an index server, a UTXO store)
//! through the injected-collaborator contracts documented on
//! [`script::SighashFn`] and [`transaction::SourceOutput`].

pub mod certificate;
pub mod config;
pub mod contract;
pub mod ecdsa;
pub mod error;
pub mod hash;
pub mod keys;
pub mod script;
pub mod secp256k1;
pub mod sighash;
pub mod spv;
pub mod transaction;
pub mod util;
pub mod wallet;

pub use error::{Error, Result, ScriptError};
