//! Contains the core derivation pipeline.

use crate::{
    errors::PipelineResult,
    stages::{
        AttributesBuilder, BatchValidator, BatcherTransaction, BatcherTransactionSender,
        BatcherTransactions, ChannelAssembler,
    },
    state::SharedState,
    traits::PurgeableStage,
};
use alloy_primitives::Bytes;
use rollup_primitives::prelude::{PayloadAttributes, RollupConfig};
use std::sync::{mpsc::SendError, Arc};
use tracing::{debug, trace};

/// The stages of the pipeline, last stage outermost.
pub type PipelineStages =
    AttributesBuilder<BatchValidator<ChannelAssembler<BatcherTransactions>>>;

/// The derivation pipeline turns batcher transactions into the [PayloadAttributes] of the L2
/// blocks they encode.
///
/// Producers feed batcher transactions through [BatcherTransactionSender]s obtained from
/// [DerivationPipeline::sender]. The pipeline pulls them in on every call to
/// [DerivationPipeline::next] and validates batches against the [SharedState] it was created with.
/// The owner of that state advances the safe head after each block is built.
#[derive(Debug)]
pub struct DerivationPipeline {
    /// The last stage of the pipeline.
    attributes: PipelineStages,
    /// Feeds the first stage of the pipeline.
    sender: BatcherTransactionSender,
    /// Attributes returned by [DerivationPipeline::peek] and not yet taken.
    peeked: Option<PayloadAttributes>,
    /// The rollup config.
    rollup_config: Arc<RollupConfig>,
    /// The chain state.
    state: SharedState,
}

impl DerivationPipeline {
    /// Creates a new [DerivationPipeline] reading chain state from `state`.
    pub fn new(rollup_config: Arc<RollupConfig>, state: SharedState) -> Self {
        let (sender, batcher_transactions) = BatcherTransactions::channel();
        let channels =
            ChannelAssembler::new(Arc::clone(&rollup_config), batcher_transactions, state.clone());
        let batches = BatchValidator::new(Arc::clone(&rollup_config), channels, state.clone());
        let attributes =
            AttributesBuilder::new(Arc::clone(&rollup_config), batches, state.clone());
        Self { attributes, sender, peeked: None, rollup_config, state }
    }

    /// Returns a handle for queueing batcher transactions. Handles can be moved to other threads.
    pub fn sender(&self) -> BatcherTransactionSender {
        self.sender.clone()
    }

    /// Queues the payloads of batcher transactions included in L1 block `l1_origin`.
    pub fn push_batcher_transactions(
        &self,
        txs: impl IntoIterator<Item = Bytes>,
        l1_origin: u64,
    ) -> Result<(), SendError<BatcherTransaction>> {
        for data in txs {
            self.sender.send(BatcherTransaction::new(data, l1_origin))?;
        }
        Ok(())
    }

    /// Returns the attributes of the next L2 block, or `None` if the queued data does not yield
    /// one yet.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> PipelineResult<Option<PayloadAttributes>> {
        if let Some(attributes) = self.peeked.take() {
            return Ok(Some(attributes));
        }
        let attributes = self.attributes.next_attributes()?;
        if let Some(attributes) = &attributes {
            trace!(target: "pipeline", "Derived attributes at timestamp {}", attributes.timestamp);
        }
        Ok(attributes)
    }

    /// Returns the attributes the next call to [DerivationPipeline::next] will return, without
    /// consuming them.
    pub fn peek(&mut self) -> PipelineResult<Option<&PayloadAttributes>> {
        if self.peeked.is_none() {
            self.peeked = self.attributes.next_attributes()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Discards everything buffered in the pipeline, including queued batcher transactions.
    ///
    /// Called after an L1 reorg, once the state has been purged to the new safe head.
    pub fn purge(&mut self) {
        debug!(target: "pipeline", "Purging pipeline");
        self.peeked = None;
        self.attributes.purge();
    }

    /// Returns the rollup config.
    pub fn rollup_config(&self) -> &RollupConfig {
        &self.rollup_config
    }

    /// Returns the chain state the pipeline reads from.
    pub const fn state(&self) -> &SharedState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        batch::{encode_batches, Batch, SingleBatch, SpanBatch},
        frame::{encode_frames, Frame},
        stages::compression::{compress_brotli, compress_zlib},
        test_utils::{l1_hash, l2_block, l2_epoch, l2_hash, test_state, TEST_CHAIN_ID},
    };

    fn single(k: u64, transactions: Vec<Bytes>) -> SingleBatch {
        SingleBatch {
            parent_hash: l2_hash(k - 1),
            epoch_num: k / 3,
            epoch_hash: l1_hash(k / 3),
            timestamp: k * 2,
            transactions,
        }
    }

    /// Splits compressed channel data into frames of at most `frame_size` bytes, encoding each
    /// frame as its own batcher transaction.
    fn batcher_txs(id: u8, compressed: &[u8], frame_size: usize) -> Vec<Bytes> {
        let chunks: Vec<_> = compressed.chunks(frame_size).collect();
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let frame = Frame {
                    id: [id; 16],
                    number: i as u16,
                    data: Bytes::copy_from_slice(chunk),
                    is_last: i == chunks.len() - 1,
                    l1_inclusion_block: 0,
                };
                encode_frames([&frame])
            })
            .collect()
    }

    fn pipeline(safe_head: u64, l1_head: u64) -> DerivationPipeline {
        let state = test_state(safe_head, l1_head);
        let config = Arc::new(*state.config());
        DerivationPipeline::new(config, SharedState::new(state))
    }

    #[test]
    fn test_derives_single_batches() {
        let mut pipeline = pipeline(5, 10);
        let tx = Bytes::from_static(&[0x02, 0xc0]);
        let batches =
            [Batch::Single(single(6, vec![tx.clone()])), Batch::Single(single(7, vec![]))];
        let compressed = compress_zlib(&encode_batches(&batches).unwrap());
        pipeline.push_batcher_transactions(batcher_txs(1, &compressed, 20), 4).unwrap();

        let first = pipeline.next().unwrap().unwrap();
        assert_eq!(first.timestamp, 12);
        assert_eq!(first.seq_number, 0);
        assert_eq!(first.l1_inclusion_block, 4);
        assert_eq!(first.transactions.last(), Some(&tx));

        // Block 7 waits for the safe head to reach block 6.
        assert_eq!(pipeline.next().unwrap(), None);
        pipeline.state().update(|state| state.update_safe_head(l2_block(6), l2_epoch(6)));

        let second = pipeline.next().unwrap().unwrap();
        assert_eq!(second.timestamp, 14);
        assert_eq!(second.seq_number, 1);
        assert_eq!(pipeline.next().unwrap(), None);
    }

    #[test]
    fn test_derives_span_batch() {
        let mut pipeline = pipeline(5, 10);
        let singles: Vec<_> = (6..10).map(|k| single(k, vec![])).collect();
        let span = SpanBatch::from_singular_batches(singles, 0, 0, TEST_CHAIN_ID).unwrap();
        let compressed = compress_brotli(&encode_batches(&[Batch::Span(span)]).unwrap()).unwrap();
        pipeline.push_batcher_transactions(batcher_txs(2, &compressed, 16), 5).unwrap();

        let mut derived = Vec::new();
        while let Some(attributes) = pipeline.next().unwrap() {
            derived.push((attributes.timestamp, attributes.seq_number));
        }
        assert_eq!(derived, vec![(12, 0), (14, 1), (16, 2), (18, 0)]);
    }

    #[test]
    fn test_peek_then_next() {
        let mut pipeline = pipeline(5, 10);
        let compressed =
            compress_zlib(&encode_batches(&[Batch::Single(single(6, vec![]))]).unwrap());
        pipeline.push_batcher_transactions(batcher_txs(3, &compressed, 1000), 4).unwrap();

        let peeked = pipeline.peek().unwrap().cloned().unwrap();
        assert_eq!(pipeline.peek().unwrap(), Some(&peeked));
        assert_eq!(pipeline.next().unwrap(), Some(peeked));
        assert_eq!(pipeline.next().unwrap(), None);
    }

    #[test]
    fn test_producer_threads() {
        let mut pipeline = pipeline(5, 10);
        let compressed =
            compress_zlib(&encode_batches(&[Batch::Single(single(6, vec![]))]).unwrap());
        let txs = batcher_txs(4, &compressed, 8);
        assert!(txs.len() > 1);

        let handles: Vec<_> = txs
            .into_iter()
            .map(|tx| {
                let sender = pipeline.sender();
                std::thread::spawn(move || sender.send(BatcherTransaction::new(tx, 4)).unwrap())
            })
            .collect();
        handles.into_iter().for_each(|h| h.join().unwrap());

        assert_eq!(pipeline.next().unwrap().unwrap().timestamp, 12);
    }

    #[test]
    fn test_purge() {
        let mut pipeline = pipeline(5, 10);
        let compressed =
            compress_zlib(&encode_batches(&[Batch::Single(single(6, vec![]))]).unwrap());
        let mut txs = batcher_txs(5, &compressed, 8);
        let last = txs.pop().unwrap();
        pipeline.push_batcher_transactions(txs, 4).unwrap();
        assert_eq!(pipeline.next().unwrap(), None);

        pipeline.purge();
        // The channel lost its leading frames.
        pipeline.push_batcher_transactions([last], 4).unwrap();
        assert_eq!(pipeline.next().unwrap(), None);
    }
}
