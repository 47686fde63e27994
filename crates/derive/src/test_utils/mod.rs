//! Test utilities for the derivation pipeline: a deterministic test chain, mock stages and a
//! tracing layer collecting log output.

mod chain;
pub use chain::{
    l1_hash, l1_info, l2_block, l2_epoch, l2_hash, test_config, test_state,
    test_state_with_config, TEST_CHAIN_ID, TEST_L1_BLOCK_TIME,
};

mod stages;
pub use stages::{TestBatchProvider, TestChannelProvider, TestFrameProvider};

mod tracing;
pub use tracing::{CollectingLayer, TraceStorage};
