//! A block within a span batch.

use crate::batch::SingleBatch;
use alloy_primitives::Bytes;

/// One L2 block of a [super::SpanBatch].
///
/// Unlike a [SingleBatch] it carries neither a parent hash nor an epoch hash: a span only commits
/// to the first parent and the last origin through 20 byte prefixes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpanBatchElement {
    /// The epoch number of the L1 block
    pub epoch_num: u64,
    /// The timestamp of the L2 block
    pub timestamp: u64,
    /// The transactions in the L2 block
    pub transactions: Vec<Bytes>,
}

impl From<SingleBatch> for SpanBatchElement {
    fn from(batch: SingleBatch) -> Self {
        Self {
            epoch_num: batch.epoch_num,
            timestamp: batch.timestamp,
            transactions: batch.transactions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{collection::vec, prelude::any, proptest};

    proptest! {
        #[test]
        fn test_element_drops_hashes(
            epoch_num in any::<u64>(),
            timestamp in any::<u64>(),
            transactions in vec(any::<Vec<u8>>(), 0..16)
        ) {
            let transactions: Vec<Bytes> = transactions.into_iter().map(Bytes::from).collect();
            let single_batch = SingleBatch {
                parent_hash: alloy_primitives::B256::repeat_byte(1),
                epoch_num,
                timestamp,
                transactions: transactions.clone(),
                ..Default::default()
            };

            let element = SpanBatchElement::from(single_batch);
            assert_eq!(element, SpanBatchElement { epoch_num, timestamp, transactions });
        }
    }
}
