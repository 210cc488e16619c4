//! Runtime configuration for **bsv-core**.
//!
//! Two independent knobs live here: which network a key or address belongs
//! to (selects WIF and BIP-32 version-byte prefixes), and which resource-cap
//! profile the script interpreter enforces (selects the pre-/post-genesis
//! limits of spec §4.7). Both are plain value types; nothing here is a
//! process-wide singleton, consistent with the "value-only" design note.
//!
//! [`InterpreterLimits`] is built via the fluent [`InterpreterLimitsBuilder`]
//! so callers can override a single cap while keeping the profile defaults.
//!
//! ```
//! use bsv_core::config::{InterpreterLimits, Network};
//!
//! let limits = InterpreterLimits::for_network(Network::Mainnet, true);
//! assert_eq!(limits.max_ops, 500_000_000);
//! ```

use serde::{Deserialize, Serialize};

/// Which Bitcoin SV network a key, address, or extended key belongs to.
///
/// Only `Mainnet`/`Testnet` are distinguished at the wire-prefix level
/// (spec §4.5, §6): WIF prefix `0x80` vs `0xEF`, and BIP-32 version bytes
/// `xprv`/`xpub` vs `tprv`/`tpub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

/// Resource caps enforced by the script [`crate::script::Interpreter`]
/// (spec §4.7). Selecting `utxo_after_genesis` picks the post-genesis
/// profile; the interpreter rejects inputs that would exceed any cap with
/// a specific [`crate::ScriptError`] variant rather than silently
/// truncating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterLimits {
    pub max_ops: u64,
    pub max_script_num_len: u64,
    pub max_element_size: u64,
    pub max_stack_size: u64,
}

impl InterpreterLimits {
    pub const PRE_GENESIS: InterpreterLimits = InterpreterLimits {
        max_ops: 500,
        max_script_num_len: 4,
        max_element_size: 520,
        max_stack_size: 1_000,
    };

    /// Post-genesis caps as specified. Implementations targeting hostile,
    /// untrusted input SHOULD further clamp these via
    /// [`InterpreterLimitsBuilder`] — the spec-mandated values are large
    /// enough to be a denial-of-service surface for adversarial scripts.
    pub const POST_GENESIS: InterpreterLimits = InterpreterLimits {
        max_ops: 500_000_000,
        max_script_num_len: 750_000,
        max_element_size: 4_000_000_000,
        max_stack_size: 4_000_000_000,
    };

    /// Picks the profile matching `utxo_after_genesis`. `network` is
    /// accepted for API symmetry with [`Network`]-scoped construction even
    /// though the cap values themselves don't currently vary by network.
    #[must_use]
    pub fn for_network(_network: Network, utxo_after_genesis: bool) -> Self {
        if utxo_after_genesis {
            Self::POST_GENESIS
        } else {
            Self::PRE_GENESIS
        }
    }
}

/// Fluent builder for [`InterpreterLimits`], for callers that want the
/// post-genesis profile but with a safer, application-specific ceiling.
pub struct InterpreterLimitsBuilder {
    inner: InterpreterLimits,
}

impl InterpreterLimitsBuilder {
    #[must_use]
    pub fn new(base: InterpreterLimits) -> Self {
        Self { inner: base }
    }

    #[must_use]
    pub fn max_ops(mut self, v: u64) -> Self {
        self.inner.max_ops = v;
        self
    }

    #[must_use]
    pub fn max_script_num_len(mut self, v: u64) -> Self {
        self.inner.max_script_num_len = v;
        self
    }

    #[must_use]
    pub fn max_element_size(mut self, v: u64) -> Self {
        self.inner.max_element_size = v;
        self
    }

    #[must_use]
    pub fn max_stack_size(mut self, v: u64) -> Self {
        self.inner.max_stack_size = v;
        self
    }

    #[must_use]
    pub fn finish(self) -> InterpreterLimits {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_genesis_profile_matches_spec() {
        let limits = InterpreterLimits::for_network(Network::Mainnet, false);
        assert_eq!(limits.max_ops, 500);
        assert_eq!(limits.max_script_num_len, 4);
        assert_eq!(limits.max_element_size, 520);
        assert_eq!(limits.max_stack_size, 1_000);
    }

    #[test]
    fn builder_overrides_a_single_cap() {
        let limits = InterpreterLimitsBuilder::new(InterpreterLimits::POST_GENESIS)
            .max_element_size(1_000_000)
            .finish();
        assert_eq!(limits.max_element_size, 1_000_000);
        assert_eq!(limits.max_ops, InterpreterLimits::POST_GENESIS.max_ops);
    }
}
