//! This module contains the [RollupConfig] type.

use crate::{
    block::BlockId,
    genesis::Genesis,
    system_config::SystemConfig,
};
use alloy_primitives::{address, b256, Address, U256};

/// The maximum size of all pending channels before Fjord.
pub const MAX_CHANNEL_BANK_SIZE: u64 = 100_000_000;

/// The maximum size of all pending channels from Fjord.
pub const FJORD_MAX_CHANNEL_BANK_SIZE: u64 = 1_000_000_000;

/// The maximum amount of bytes that will be read from a decompressed channel before Fjord.
pub const MAX_RLP_BYTES_PER_CHANNEL: u64 = 10_000_000;

/// The maximum amount of bytes that will be read from a decompressed channel from Fjord.
pub const FJORD_MAX_RLP_BYTES_PER_CHANNEL: u64 = 100_000_000;

/// The maximum sequencer drift from Fjord, in seconds.
pub const FJORD_MAX_SEQUENCER_DRIFT: u64 = 1800;

/// The channel timeout from Granite, in L1 blocks.
pub const GRANITE_CHANNEL_TIMEOUT: u64 = 50;

/// The Rollup configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollupConfig {
    /// The genesis state of the rollup.
    pub genesis: Genesis,
    /// The block time of the L2, in seconds.
    pub block_time: u64,
    /// Sequencer batches may not be more than MaxSequencerDrift seconds after
    /// the L1 timestamp of the sequencing window end.
    ///
    /// Note: When L1 has many 1 second consecutive blocks, and L2 grows at fixed 2 seconds,
    /// the L2 time may still grow beyond this difference.
    pub max_sequencer_drift: u64,
    /// The sequencer window size.
    pub seq_window_size: u64,
    /// Number of L1 blocks between when a channel can be opened and when it can be closed.
    pub channel_timeout: u64,
    /// The L1 chain ID
    pub l1_chain_id: u64,
    /// The L2 chain ID
    pub l2_chain_id: u64,
    /// `regolith_time` sets the activation time of the Regolith network-upgrade.
    /// Active if regolith_time != None && L2 block timestamp >= Some(regolith_time), inactive
    /// otherwise.
    pub regolith_time: Option<u64>,
    /// `canyon_time` sets the activation time of the Canyon network upgrade.
    pub canyon_time: Option<u64>,
    /// `delta_time` sets the activation time of the Delta network upgrade.
    pub delta_time: Option<u64>,
    /// `ecotone_time` sets the activation time of the Ecotone network upgrade.
    pub ecotone_time: Option<u64>,
    /// `fjord_time` sets the activation time of the Fjord network upgrade.
    pub fjord_time: Option<u64>,
    /// `granite_time` sets the activation time of the Granite network upgrade.
    pub granite_time: Option<u64>,
    /// `batch_inbox_address` is the L1 address that batches are sent to.
    pub batch_inbox_address: Address,
    /// `deposit_contract_address` is the L1 address that deposits are sent to.
    pub deposit_contract_address: Address,
}

impl RollupConfig {
    /// Returns true if Regolith is active at the given timestamp.
    pub fn is_regolith_active(&self, timestamp: u64) -> bool {
        self.regolith_time.is_some_and(|t| timestamp >= t)
    }

    /// Returns true if Canyon is active at the given timestamp.
    pub fn is_canyon_active(&self, timestamp: u64) -> bool {
        self.canyon_time.is_some_and(|t| timestamp >= t)
    }

    /// Returns true if Delta is active at the given timestamp.
    pub fn is_delta_active(&self, timestamp: u64) -> bool {
        self.delta_time.is_some_and(|t| timestamp >= t)
    }

    /// Returns true if Ecotone is active at the given timestamp.
    pub fn is_ecotone_active(&self, timestamp: u64) -> bool {
        self.ecotone_time.is_some_and(|t| timestamp >= t)
    }

    /// Returns true if Fjord is active at the given timestamp.
    pub fn is_fjord_active(&self, timestamp: u64) -> bool {
        self.fjord_time.is_some_and(|t| timestamp >= t)
    }

    /// Returns true if Granite is active at the given timestamp.
    pub fn is_granite_active(&self, timestamp: u64) -> bool {
        self.granite_time.is_some_and(|t| timestamp >= t)
    }

    /// Returns true if the L2 block at `timestamp` is the first block with Ecotone active.
    pub fn is_ecotone_activation_block(&self, timestamp: u64) -> bool {
        self.is_ecotone_active(timestamp) &&
            timestamp >= self.block_time &&
            !self.is_ecotone_active(timestamp - self.block_time)
    }

    /// Returns true if Ecotone is active at `timestamp` and at the block before it.
    pub fn is_ecotone_and_not_first(&self, timestamp: u64) -> bool {
        self.is_ecotone_active(timestamp) &&
            timestamp >= self.block_time &&
            self.is_ecotone_active(timestamp - self.block_time)
    }

    /// Returns true if the L2 block at `timestamp` is the first block with Fjord active.
    pub fn is_fjord_activation_block(&self, timestamp: u64) -> bool {
        self.is_fjord_active(timestamp) &&
            timestamp >= self.block_time &&
            !self.is_fjord_active(timestamp - self.block_time)
    }

    /// Returns the total size budget of pending channels at the given L1 timestamp.
    pub fn max_channel_size(&self, timestamp: u64) -> u64 {
        if self.is_fjord_active(timestamp) {
            FJORD_MAX_CHANNEL_BANK_SIZE
        } else {
            MAX_CHANNEL_BANK_SIZE
        }
    }

    /// Returns the upper bound of a decompressed channel at the given L1 timestamp.
    pub fn max_rlp_bytes_per_channel(&self, timestamp: u64) -> u64 {
        if self.is_fjord_active(timestamp) {
            FJORD_MAX_RLP_BYTES_PER_CHANNEL
        } else {
            MAX_RLP_BYTES_PER_CHANNEL
        }
    }

    /// Returns the max sequencer drift at the given L1 timestamp.
    pub fn max_sequencer_drift(&self, timestamp: u64) -> u64 {
        if self.is_fjord_active(timestamp) {
            FJORD_MAX_SEQUENCER_DRIFT
        } else {
            self.max_sequencer_drift
        }
    }

    /// Returns the channel timeout at the given L1 timestamp.
    pub fn channel_timeout(&self, timestamp: u64) -> u64 {
        if self.is_granite_active(timestamp) {
            GRANITE_CHANNEL_TIMEOUT
        } else {
            self.channel_timeout
        }
    }

    /// The OP Mainnet rollup configuration.
    pub fn optimism_mainnet() -> Self {
        Self {
            genesis: Genesis {
                l1: BlockId {
                    hash: b256!("438335a20d98863a4c0c97999eb2481921ccd28553eac6f913af7c12aec04108"),
                    number: 17_422_590,
                },
                l2: BlockId {
                    hash: b256!("dbf6a80fef073de06add9b0d14026d6e5a86c85f6d102c36d3d8e9cf89c2afd3"),
                    number: 105_235_063,
                },
                l2_time: 1_686_068_903,
                system_config: SystemConfig {
                    batcher_addr: address!("6887246668a3b87f54deb3b94ba47a6f63f32985"),
                    gas_limit: 30_000_000,
                    l1_fee_overhead: U256::from(188),
                    l1_fee_scalar: U256::from(684_000),
                },
            },
            block_time: 2,
            max_sequencer_drift: 600,
            seq_window_size: 3600,
            channel_timeout: 300,
            l1_chain_id: 1,
            l2_chain_id: 10,
            regolith_time: Some(0),
            canyon_time: Some(1_704_992_401),
            delta_time: Some(1_708_560_000),
            ecotone_time: Some(1_710_374_401),
            fjord_time: Some(1_720_627_201),
            granite_time: Some(1_726_070_401),
            batch_inbox_address: address!("ff00000000000000000000000000000000000010"),
            deposit_contract_address: address!("beb5fc579115071764c7423a4f12edde41f106ed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_activation() {
        let config = RollupConfig { ecotone_time: Some(10), block_time: 2, ..Default::default() };
        assert!(!config.is_ecotone_active(9));
        assert!(config.is_ecotone_active(10));
        assert!(config.is_ecotone_activation_block(10));
        assert!(config.is_ecotone_activation_block(11));
        assert!(!config.is_ecotone_activation_block(12));
        assert!(!config.is_ecotone_and_not_first(10));
        assert!(config.is_ecotone_and_not_first(12));
        assert!(!config.is_fjord_active(u64::MAX));
    }

    #[test]
    fn test_activation_at_genesis_is_not_an_activation_block() {
        let config = RollupConfig { fjord_time: Some(0), block_time: 2, ..Default::default() };
        assert!(config.is_fjord_active(0));
        assert!(!config.is_fjord_activation_block(0));
        assert!(!config.is_fjord_activation_block(2));
    }

    #[test]
    fn test_protocol_constants_follow_forks() {
        let config = RollupConfig {
            max_sequencer_drift: 600,
            channel_timeout: 300,
            fjord_time: Some(100),
            granite_time: Some(200),
            ..Default::default()
        };
        assert_eq!(config.max_channel_size(99), MAX_CHANNEL_BANK_SIZE);
        assert_eq!(config.max_channel_size(100), FJORD_MAX_CHANNEL_BANK_SIZE);
        assert_eq!(config.max_rlp_bytes_per_channel(99), MAX_RLP_BYTES_PER_CHANNEL);
        assert_eq!(config.max_rlp_bytes_per_channel(100), FJORD_MAX_RLP_BYTES_PER_CHANNEL);
        assert_eq!(config.max_sequencer_drift(99), 600);
        assert_eq!(config.max_sequencer_drift(100), FJORD_MAX_SEQUENCER_DRIFT);
        assert_eq!(config.channel_timeout(199), 300);
        assert_eq!(config.channel_timeout(200), GRANITE_CHANNEL_TIMEOUT);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn test_rollup_config_serde_roundtrip() {
        let config = RollupConfig::optimism_mainnet();
        let raw = serde_json::to_string(&config).unwrap();
        let decoded: RollupConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(config, decoded);
    }
}
