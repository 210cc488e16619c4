//! Error types for the **bsv-core** crate.
//!
//! All fallible operations return [`crate::Result`], a convenient alias for
//! `core::result::Result<T, Error>`. The variants mirror the error taxonomy
//! of the specification this crate implements: every failure mode a caller
//! can hit is a distinct, matchable variant rather than a string.
//!
//! Lower-level errors (DER parsing, VarInt bounds, script interpretation)
//! are mapped into one of these variants before bubbling up; nested script
//! errors keep their own detail in [`ScriptError`] so callers can match on
//! the specific opcode failure without string parsing.
//!
//! `Error`'s `#[error(...)]` messages never print key material: variants
//! that originate from key handling carry no byte payloads, only fixed
//! strings or safely-printable context (e.g. a byte count, not the bytes).
//!
//! # Examples
//!
//! ```
//! use bsv_core::{Error, Result};
//!
//! fn demo_fn(fail: bool) -> Result<()> {
//!     if fail {
//!         Err(Error::InvalidScalar)
//!     } else {
//!         Ok(())
//!     }
//! }
//! ```

use thiserror::Error;

/// Core crate error type.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// Too-short fixed-width or size-mismatched operand.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Bad Base58, hex, DER, VarInt, ScriptNum, or envelope version.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(&'static str),

    /// A declared length exceeds the caller- or spec-supplied bound.
    #[error("malformed length: {0}")]
    MalformedLength(&'static str),

    /// Point not on curve, or decompression failed.
    #[error("invalid curve point")]
    InvalidCurvePoint,

    /// Private key or HD offset out of `(0, n)`.
    #[error("invalid scalar")]
    InvalidScalar,

    /// DER parse failure, high-S where forbidden, or r/s out of range.
    #[error("invalid signature")]
    InvalidSignature,

    /// ECDSA verify returned false, or an HMAC comparison mismatched.
    #[error("verification failed")]
    VerifyFailed,

    /// AEAD authentication failed across all attempted KDF/IV variants.
    #[error("decryption failed")]
    DecryptFailed,

    /// Sighash type lacked the required FORKID flag.
    #[error("sighash type is missing the FORKID flag")]
    MissingForkId,

    /// Sighash was requested for an input the transaction does not have.
    #[error("input index {0} out of range")]
    InputIndexOutOfRange(usize),

    /// Nested script interpreter failure.
    #[error("script interpreter error: {0}")]
    ScriptInterpretError(#[from] ScriptError),

    /// Merkle-path duplicate offsets, lineage depth exceeded, or a
    /// transaction fetcher returned a payload whose hash didn't match.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),

    /// Invoice-number rule violated, out-of-range security level, or
    /// key-id length outside the allowed bounds.
    #[error("config error: {0}")]
    ConfigError(&'static str),
}

/// Errors raised while evaluating a [`crate::script::Interpreter`].
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ScriptError {
    #[error("stack underflow")]
    StackUnderflow,
    #[error("alt stack underflow")]
    AltStackUnderflow,
    #[error("stack size exceeded")]
    StackSizeExceeded,
    #[error("too many operations")]
    TooManyOps,
    #[error("element size exceeded")]
    ElementSizeExceeded,
    #[error("invalid split range")]
    InvalidSplitRange,
    #[error("invalid operand size")]
    InvalidOperandSize,
    #[error("divide by zero")]
    DivideByZero,
    #[error("invalid shift")]
    InvalidShift,
    #[error("unbalanced conditional")]
    UnbalancedConditional,
    #[error("OP_VERIFY failed")]
    VerifyFailed,
    #[error("OP_RETURN encountered")]
    OpReturn,
    #[error("OP_EQUALVERIFY failed")]
    EqualVerifyFailed,
    #[error("OP_NUMEQUALVERIFY failed")]
    NumEqualVerifyFailed,
    #[error("OP_CHECKSIGVERIFY failed")]
    CheckSigVerifyFailed,
    #[error("OP_CHECKMULTISIGVERIFY failed")]
    CheckMultiSigVerifyFailed,
    #[error("invalid public key count")]
    InvalidPubKeyCount,
    #[error("invalid signature count")]
    InvalidSigCount,
    #[error("no sighash function supplied")]
    NoSighashFn,
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),
    #[error("stack is empty after execution")]
    EmptyStack,
    #[error("top stack element is false")]
    EvalFalse,
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
