//! This module contains the [SystemConfig] type.

use alloy_primitives::{address, Address, B256, U256};

/// Scalar version byte for pre-Ecotone scalars.
pub const L1_SCALAR_BEDROCK: u8 = 0;

/// Scalar version byte for Ecotone scalars.
pub const L1_SCALAR_ECOTONE: u8 = 1;

/// Optimism system config contract values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SystemConfig {
    /// Batch sender address
    pub batcher_addr: Address,
    /// L2 gas limit
    pub gas_limit: u64,
    /// Fee overhead
    #[cfg_attr(feature = "serde", serde(rename = "overhead"))]
    pub l1_fee_overhead: U256,
    /// Fee scalar
    #[cfg_attr(feature = "serde", serde(rename = "scalar"))]
    pub l1_fee_scalar: U256,
}

impl SystemConfig {
    /// Returns the batcher address left-padded to a 32 byte word.
    pub fn batcher_hash(&self) -> B256 {
        self.batcher_addr.into_word()
    }

    /// Splits the fee scalar into `(blob_base_fee_scalar, base_fee_scalar)`.
    ///
    /// The first byte of the 32 byte scalar is a version tag: version 0 carries only the base fee
    /// scalar in the low 4 bytes, version 1 additionally packs the blob base fee scalar in the 4
    /// bytes before it. Returns [None] for any other version.
    pub fn ecotone_scalars(&self) -> Option<(u32, u32)> {
        let scalar = self.l1_fee_scalar.to_be_bytes::<32>();
        let word = |range: core::ops::Range<usize>| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&scalar[range]);
            u32::from_be_bytes(buf)
        };
        match scalar[0] {
            L1_SCALAR_BEDROCK => Some((0, word(28..32))),
            L1_SCALAR_ECOTONE => Some((word(24..28), word(28..32))),
            _ => None,
        }
    }
}

/// System accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemAccounts {
    /// The address that can deposit attributes
    pub attributes_depositor: Address,
    /// The address of the attributes predeploy
    pub attributes_predeploy: Address,
    /// The address of the fee vault
    pub fee_vault: Address,
}

impl Default for SystemAccounts {
    fn default() -> Self {
        Self {
            attributes_depositor: address!("deaddeaddeaddeaddeaddeaddeaddeaddead0001"),
            attributes_predeploy: address!("4200000000000000000000000000000000000015"),
            fee_vault: address!("4200000000000000000000000000000000000011"),
        }
    }
}
