//! This module contains the [SpanBatchSignature] type, which represents the ECDSA signature of a
//! transaction within a span batch.

use alloy_primitives::U256;

/// The ECDSA signature of a transaction within a span batch.
///
/// `v` is never stored. It is rebuilt from the y parity, the transaction type and, for legacy
/// transactions, the protected bit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpanBatchSignature {
    /// The parity of the `y` coordinate of the curve point.
    pub y_parity: bool,
    /// The `r` value.
    pub r: U256,
    /// The `s` value.
    pub s: U256,
}

/// The `v` base of a replay protected legacy signature.
pub const REPLAY_PROTECTED_V_BASE: u64 = 35;

/// The `v` base of an unprotected legacy signature.
pub const REPLAY_UNPROTECTED_V_BASE: u64 = 27;

impl SpanBatchSignature {
    /// Returns the legacy `v` value, EIP-155 encoded when `chain_id` is given.
    pub const fn legacy_v(&self, chain_id: Option<u64>) -> u64 {
        let y = self.y_parity as u64;
        match chain_id {
            Some(chain_id) => chain_id * 2 + REPLAY_PROTECTED_V_BASE + y,
            None => REPLAY_UNPROTECTED_V_BASE + y,
        }
    }
}
