//! This module contains the [SingleBatch] type.

use super::{span_batch::has_invalid_transactions, BatchValidity};
use crate::state::State;
use alloy_primitives::{BlockHash, Bytes};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use tracing::{info, warn};

/// Represents a single batch: a single encoded L2 block
#[derive(Debug, Default, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct SingleBatch {
    /// Block hash of the previous L2 block
    pub parent_hash: BlockHash,
    /// The batch epoch number. Same as the first L1 block number in the epoch.
    pub epoch_num: u64,
    /// The block hash of the first L1 block in the epoch
    pub epoch_hash: BlockHash,
    /// The L2 block timestamp of this batch
    pub timestamp: u64,
    /// The L2 block transactions in this batch
    pub transactions: Vec<Bytes>,
}

impl SingleBatch {
    /// If any transactions are empty or deposited transaction types.
    pub fn has_invalid_transactions(&self) -> bool {
        has_invalid_transactions(&self.transactions)
    }

    /// Validates the batch against the given chain state.
    pub fn check_batch(&self, state: &State, inclusion_block: u64) -> BatchValidity {
        let cfg = state.config();
        let safe_head = state.safe_head();
        let epoch = state.safe_epoch();
        let next_epoch = state.epoch(epoch.number + 1);
        let next_timestamp = safe_head.timestamp + cfg.block_time;

        if self.timestamp > next_timestamp {
            return BatchValidity::Future;
        }
        if self.timestamp < next_timestamp {
            warn!(
                target: "batch-validator",
                "past batch: timestamp {}, expected {}",
                self.timestamp,
                next_timestamp
            );
            return BatchValidity::Drop;
        }

        if self.parent_hash != safe_head.hash {
            warn!(
                target: "batch-validator",
                "ignoring batch with mismatching parent hash {}, safe head {}",
                self.parent_hash,
                safe_head.hash
            );
            return BatchValidity::Drop;
        }

        if self.epoch_num.saturating_add(cfg.seq_window_size) < inclusion_block {
            warn!(
                target: "batch-validator",
                "batch was included too late: epoch {} + window {} < inclusion block {}",
                self.epoch_num,
                cfg.seq_window_size,
                inclusion_block
            );
            return BatchValidity::Drop;
        }

        let batch_origin = if self.epoch_num == epoch.number {
            epoch
        } else if self.epoch_num == epoch.number + 1 {
            match next_epoch {
                Some(next) => next,
                None => {
                    info!(target: "batch-validator", "missing next L1 block {}", epoch.number + 1);
                    return BatchValidity::Undecided;
                }
            }
        } else {
            warn!(
                target: "batch-validator",
                "invalid batch epoch {}, safe epoch {}",
                self.epoch_num,
                epoch.number
            );
            return BatchValidity::Drop;
        };

        if self.epoch_hash != batch_origin.hash {
            warn!(
                target: "batch-validator",
                "epoch hash mismatch: batch {}, L1 origin {}",
                self.epoch_hash,
                batch_origin.hash
            );
            return BatchValidity::Drop;
        }

        if self.timestamp < batch_origin.timestamp {
            warn!(
                target: "batch-validator",
                "batch timestamp {} is before its L1 origin {}",
                self.timestamp,
                batch_origin.timestamp
            );
            return BatchValidity::Drop;
        }

        let max_drift = batch_origin.timestamp + cfg.max_sequencer_drift(batch_origin.timestamp);
        if self.timestamp > max_drift {
            if !self.transactions.is_empty() {
                warn!(
                    target: "batch-validator",
                    "batch exceeded sequencer time drift with transactions, max {}",
                    max_drift
                );
                return BatchValidity::Drop;
            }
            if epoch.number == batch_origin.number {
                match next_epoch {
                    Some(next) if self.timestamp >= next.timestamp => {
                        warn!(
                            target: "batch-validator",
                            "empty batch exceeded sequencer time drift without adopting the next origin"
                        );
                        return BatchValidity::Drop;
                    }
                    Some(_) => {}
                    None => {
                        info!(
                            target: "batch-validator",
                            "missing next L1 block {} to check sequencer drift",
                            epoch.number + 1
                        );
                        return BatchValidity::Undecided;
                    }
                }
            }
        }

        if self.has_invalid_transactions() {
            warn!(target: "batch-validator", "invalid transaction: empty or deposit in batch data");
            return BatchValidity::Drop;
        }

        BatchValidity::Accept
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{l1_hash, l2_hash, test_state, TEST_L1_BLOCK_TIME};
    use alloy_primitives::{hex, B256};
    use alloy_rlp::{Decodable, Encodable};

    /// The batch that builds directly on the safe head of `test_state(5, 10)`.
    fn next_batch() -> SingleBatch {
        SingleBatch {
            parent_hash: l2_hash(5),
            epoch_num: 2,
            epoch_hash: l1_hash(2),
            timestamp: 12,
            transactions: vec![hex!("02f8").into()],
        }
    }

    #[test]
    fn test_single_batch_rlp_roundtrip() {
        let single_batch = SingleBatch {
            parent_hash: B256::ZERO,
            epoch_num: 0xFF,
            epoch_hash: B256::ZERO,
            timestamp: 0xEE,
            transactions: vec![hex!("00").into()],
        };

        let mut out_buf = Vec::new();
        single_batch.encode(&mut out_buf);
        let decoded = SingleBatch::decode(&mut out_buf.as_slice()).unwrap();
        assert_eq!(decoded, single_batch);
        assert!(!single_batch.has_invalid_transactions());
    }

    #[test]
    fn test_single_batch_invalid_transactions() {
        let mut batch = SingleBatch { transactions: vec![hex!("7E").into()], ..Default::default() };
        assert!(batch.has_invalid_transactions());
        batch.transactions = vec![Bytes::new()];
        assert!(batch.has_invalid_transactions());
    }

    #[test]
    fn test_check_batch_accept() {
        let state = test_state(5, 10);
        assert_eq!(next_batch().check_batch(&state, 10), BatchValidity::Accept);
    }

    #[test]
    fn test_check_batch_timestamps() {
        let state = test_state(5, 10);
        let future = SingleBatch { timestamp: 14, ..next_batch() };
        let past = SingleBatch { timestamp: 10, ..next_batch() };
        assert_eq!(future.check_batch(&state, 10), BatchValidity::Future);
        assert_eq!(past.check_batch(&state, 10), BatchValidity::Drop);
    }

    #[test]
    fn test_check_batch_is_deterministic() {
        let state = test_state(5, 10);
        let batch = next_batch();
        let first = batch.check_batch(&state, 10);
        assert_eq!((0..4).map(|_| batch.check_batch(&state, 10)).collect::<Vec<_>>(), [first; 4]);
    }

    #[test]
    fn test_check_batch_bad_parent() {
        let state = test_state(5, 10);
        let batch = SingleBatch { parent_hash: l2_hash(4), ..next_batch() };
        assert_eq!(batch.check_batch(&state, 10), BatchValidity::Drop);
    }

    #[test]
    fn test_check_batch_included_too_late() {
        let state = test_state(5, 10);
        let window = state.config().seq_window_size;
        assert_eq!(next_batch().check_batch(&state, 2 + window + 1), BatchValidity::Drop);
    }

    #[test]
    fn test_check_batch_max_epoch() {
        let state = test_state(5, 10);
        let batch = SingleBatch { epoch_num: u64::MAX, ..next_batch() };
        assert_eq!(batch.check_batch(&state, 10), BatchValidity::Drop);
    }

    #[test]
    fn test_check_batch_epochs() {
        let state = test_state(5, 10);
        let skipping = SingleBatch { epoch_num: 3, epoch_hash: l1_hash(3), ..next_batch() };
        assert_eq!(skipping.check_batch(&state, 10), BatchValidity::Drop);
        let wrong_hash = SingleBatch { epoch_hash: l1_hash(9), ..next_batch() };
        assert_eq!(wrong_hash.check_batch(&state, 10), BatchValidity::Drop);

        // The next epoch is not known yet.
        let state = test_state(5, 1);
        assert_eq!(next_batch().check_batch(&state, 1), BatchValidity::Undecided);
    }

    #[test]
    fn test_check_batch_sequencer_drift() {
        let mut state = test_state(5, 10);
        let drift = state.config().max_sequencer_drift;
        // Move the safe head far past its epoch's drift window while staying on epoch 1.
        let ts = TEST_L1_BLOCK_TIME + drift;
        state.update_safe_head(
            rollup_primitives::prelude::BlockInfo { timestamp: ts, ..state.safe_head() },
            state.safe_epoch(),
        );
        let base = SingleBatch {
            parent_hash: state.safe_head().hash,
            epoch_num: 1,
            epoch_hash: l1_hash(1),
            timestamp: ts + 2,
            transactions: vec![],
        };
        // The next epoch is already valid at this timestamp, so staying behind is invalid.
        assert_eq!(base.check_batch(&state, 10), BatchValidity::Drop);
        let with_txs = SingleBatch { transactions: vec![hex!("02").into()], ..base };
        assert_eq!(with_txs.check_batch(&state, 10), BatchValidity::Drop);
    }
}
