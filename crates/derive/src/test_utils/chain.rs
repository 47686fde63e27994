//! A deterministic test chain.
//!
//! L1 block `n` has timestamp `6 * n`. L2 block `k` has timestamp `2 * k` and L1 origin `k / 3`,
//! so every epoch holds three L2 blocks.

use crate::state::{L1Info, State};
use alloy_primitives::{B256, U256};
use rollup_primitives::prelude::{BlockInfo, Epoch, L1BlockInfo, RollupConfig};
use std::sync::Arc;

/// The L1 block time of the test chain.
pub const TEST_L1_BLOCK_TIME: u64 = 6;

/// The L2 chain id of the test chain.
pub const TEST_CHAIN_ID: u64 = 10;

/// Returns the rollup config of the test chain. Every fork up to Delta is active from genesis.
pub fn test_config() -> RollupConfig {
    RollupConfig {
        block_time: 2,
        max_sequencer_drift: 600,
        seq_window_size: 100,
        channel_timeout: 30,
        l1_chain_id: 1,
        l2_chain_id: TEST_CHAIN_ID,
        regolith_time: Some(0),
        canyon_time: Some(0),
        delta_time: Some(0),
        ..Default::default()
    }
}

/// Returns the hash of L1 block `number`.
pub fn l1_hash(number: u64) -> B256 {
    B256::from(U256::from(0x1000_0000u64 + number))
}

/// Returns the hash of L2 block `number`.
pub fn l2_hash(number: u64) -> B256 {
    B256::from(U256::from(0x2000_0000u64 + number))
}

/// Returns the L1 info of block `number`.
pub fn l1_info(number: u64) -> L1Info {
    L1Info {
        block_info: L1BlockInfo {
            number,
            hash: l1_hash(number),
            parent_hash: l1_hash(number.saturating_sub(1)),
            timestamp: number * TEST_L1_BLOCK_TIME,
            base_fee: U256::from(7),
            mix_hash: B256::repeat_byte(0x33),
            ..Default::default()
        },
        system_config: test_config().genesis.system_config,
        ..Default::default()
    }
}

/// Returns L2 block `number`.
pub fn l2_block(number: u64) -> BlockInfo {
    BlockInfo::new(l2_hash(number), number, l2_hash(number.saturating_sub(1)), number * 2)
}

/// Returns the L1 origin of L2 block `number`.
pub fn l2_epoch(number: u64) -> Epoch {
    l1_info(number / 3).epoch().with_sequence_number(number % 3)
}

/// Returns a [State] with L2 blocks up to `safe_head` and L1 blocks up to `l1_head`.
pub fn test_state(safe_head: u64, l1_head: u64) -> State {
    test_state_with_config(test_config(), safe_head, l1_head)
}

/// Returns a [State] like [test_state] under a custom rollup config.
pub fn test_state_with_config(config: RollupConfig, safe_head: u64, l1_head: u64) -> State {
    let mut state = State::new(Arc::new(config), l2_block(0), l2_epoch(0));
    for number in 1..=safe_head {
        state.update_safe_head(l2_block(number), l2_epoch(number));
    }
    for number in 0..=l1_head {
        state.update_l1_info(l1_info(number));
    }
    state
}
