//! Block references used throughout derivation.

use alloy_primitives::{BlockHash, BlockNumber, B256, U256};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Block Header Info
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct BlockInfo {
    /// The block hash
    pub hash: B256,
    /// The block number
    pub number: u64,
    /// The parent block hash
    pub parent_hash: B256,
    /// The block timestamp
    pub timestamp: u64,
}

impl BlockInfo {
    /// Instantiates a new [BlockInfo].
    pub const fn new(hash: B256, number: u64, parent_hash: B256, timestamp: u64) -> Self {
        Self { hash, number, parent_hash, timestamp }
    }

    /// Returns the block ID.
    pub const fn id(&self) -> BlockId {
        BlockId { hash: self.hash, number: self.number }
    }
}

impl core::fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "BlockInfo {{ hash: {}, number: {}, parent_hash: {}, timestamp: {} }}",
            self.hash, self.number, self.parent_hash, self.timestamp
        )
    }
}

/// Block ID identifies a block by its hash and number
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct BlockId {
    /// The block hash
    pub hash: BlockHash,
    /// The block number
    pub number: BlockNumber,
}

impl core::fmt::Display for BlockId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{{ hash: {}, number: {} }}", self.hash, self.number)
    }
}

/// An L1 block acting as the origin of a run of L2 blocks, together with the
/// number of L2 blocks derived from it so far.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Epoch {
    /// The L1 block number.
    pub number: u64,
    /// The L1 block hash.
    pub hash: B256,
    /// The L1 block timestamp.
    pub timestamp: u64,
    /// Position of the L2 block within this epoch.
    pub sequence_number: u64,
}

impl Epoch {
    /// Creates a new [Epoch] with a zero sequence number.
    pub const fn new(number: u64, hash: B256, timestamp: u64) -> Self {
        Self { number, hash, timestamp, sequence_number: 0 }
    }

    /// Returns the same epoch at the given sequence number.
    pub const fn with_sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = sequence_number;
        self
    }
}

impl From<&L1BlockInfo> for Epoch {
    fn from(info: &L1BlockInfo) -> Self {
        Self::new(info.number, info.hash, info.timestamp)
    }
}

/// The subset of an L1 block header consumed by derivation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct L1BlockInfo {
    /// The block number
    pub number: u64,
    /// The block hash
    pub hash: B256,
    /// The parent block hash
    pub parent_hash: B256,
    /// The block timestamp
    pub timestamp: u64,
    /// The base fee per gas
    pub base_fee: U256,
    /// The mix hash, surfaced to L2 as `prev_randao`
    pub mix_hash: B256,
    /// Excess blob gas, present once L1 runs Cancun
    pub excess_blob_gas: Option<u64>,
    /// The parent beacon block root, present once L1 runs Cancun
    pub parent_beacon_root: Option<B256>,
}

impl L1BlockInfo {
    /// Returns the blob base fee implied by the header's excess blob gas, or `1` before Cancun.
    pub fn blob_base_fee(&self) -> u128 {
        self.excess_blob_gas.map_or(1, alloy_eips::eip4844::calc_blob_gasprice)
    }

    /// Returns the block ID.
    pub const fn id(&self) -> BlockId {
        BlockId { hash: self.hash, number: self.number }
    }
}
