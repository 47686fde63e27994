//! This module contains the [PayloadAttributes] type.

use crate::block::Epoch;
use alloy_eips::eip4895::Withdrawal;
use alloy_primitives::{Address, Bytes, B256};

/// The attributes needed to build the next L2 block, handed to the execution engine.
///
/// Numeric fields are plain integers here; their hex-quantity encoding belongs to the engine API
/// client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PayloadAttributes {
    /// The L2 block timestamp.
    pub timestamp: u64,
    /// The mix hash of the L1 origin.
    pub prev_randao: B256,
    /// Receives the transaction fees of the block.
    pub suggested_fee_recipient: Address,
    /// Encoded transactions forced into the block, deposits first.
    pub transactions: Vec<Bytes>,
    /// Withdrawals, always empty once Canyon is active and absent before.
    pub withdrawals: Option<Vec<Withdrawal>>,
    /// Whether the engine must not add transactions from its own pool.
    pub no_tx_pool: bool,
    /// The block gas limit.
    pub gas_limit: u64,
    /// The L1 origin of the block, carrying its position within the epoch.
    pub epoch: Epoch,
    /// The L1 block in which the batch for this block was included.
    pub l1_inclusion_block: u64,
    /// The position of the block within its epoch.
    pub seq_number: u64,
    /// The parent beacon block root, present once Ecotone is active.
    pub parent_beacon_block_root: Option<B256>,
}
