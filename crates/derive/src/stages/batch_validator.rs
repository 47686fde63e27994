//! This module contains the [BatchValidator] stage.

use super::BatchProvider;
use crate::{
    batch::{decode_batches, Batch, BatchValidity, BatchWithInclusionBlock, SingleBatch},
    channel::Channel,
    errors::{PipelineError, PipelineResult},
    state::{SharedState, State},
    traits::PurgeableStage,
};
use rollup_primitives::prelude::RollupConfig;
use std::{
    collections::{BTreeMap, VecDeque},
    fmt::Debug,
    sync::Arc,
};
use tracing::{debug, info, warn};

/// Provides decompressed channels for the [BatchValidator] stage.
pub trait ChannelProvider {
    /// Returns the next complete channel, or `None` once no more frames are queued.
    fn next_channel(&mut self) -> PipelineResult<Option<Channel>>;
}

/// A singular batch that is ready to be built into a block, with the L1 block that included it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedBatch {
    /// The batch.
    pub batch: SingleBatch,
    /// The L1 block that included the batch.
    pub inclusion_block: u64,
}

/// The [BatchValidator] stage buffers decoded batches by timestamp and releases them one
/// [SingleBatch] at a time, in the order they extend the safe chain.
///
/// Each call re-validates the earliest buffered batch against a fresh [State] snapshot: accepted
/// batches are released, dropped batches discarded, and future or undecided ones kept for a later
/// call. Span batches are expanded into their singular batches once accepted. When the sequencing
/// window of the safe epoch has elapsed with nothing to release, an empty batch is derived instead
/// so the chain keeps advancing.
#[derive(Debug)]
pub struct BatchValidator<P>
where
    P: ChannelProvider + PurgeableStage + Debug,
{
    /// The rollup configuration.
    cfg: Arc<RollupConfig>,
    /// The previous stage of the derivation pipeline.
    prev: P,
    /// The chain state.
    state: SharedState,
    /// Decoded batches keyed by their (starting) timestamp.
    batches: BTreeMap<u64, BatchWithInclusionBlock>,
    /// Singular batches expanded from an accepted span batch.
    pending: VecDeque<DerivedBatch>,
}

impl<P> BatchValidator<P>
where
    P: ChannelProvider + PurgeableStage + Debug,
{
    /// Creates a new [BatchValidator] stage.
    pub const fn new(cfg: Arc<RollupConfig>, prev: P, state: SharedState) -> Self {
        Self { cfg, prev, state, batches: BTreeMap::new(), pending: VecDeque::new() }
    }

    /// Returns the number of batches waiting to be validated.
    pub fn buffered_batches(&self) -> usize {
        self.batches.len()
    }

    /// Decodes a channel and buffers its batches. A batch replaces any buffered batch with the
    /// same timestamp.
    fn ingest(&mut self, channel: Channel) {
        let batches = decode_batches(&channel.data, channel.l1_inclusion_block, &self.cfg);
        debug!(
            target: "batch-validator",
            "Decoded {} batches from channel included in L1 block {}",
            batches.len(),
            channel.l1_inclusion_block
        );
        for batch in batches {
            let timestamp = batch.timestamp();
            if self.batches.insert(timestamp, batch).is_some() {
                warn!(
                    target: "batch-validator",
                    "Replacing buffered batch at timestamp {timestamp}"
                );
            }
        }
    }

    /// Removes and returns the earliest buffered batch if it is accepted, discarding dropped
    /// batches along the way.
    fn next_accepted(&mut self, state: &State) -> PipelineResult<Option<BatchWithInclusionBlock>> {
        loop {
            let Some((&timestamp, batch)) = self.batches.first_key_value() else {
                return Ok(None);
            };
            match batch.check_batch(state) {
                BatchValidity::Accept => {
                    return self
                        .batches
                        .remove(&timestamp)
                        .map(Some)
                        .ok_or(PipelineError::MissingAcceptedBatch(timestamp).crit());
                }
                BatchValidity::Drop => {
                    warn!(
                        target: "batch-validator",
                        "Dropping invalid batch at timestamp {timestamp}"
                    );
                    self.batches.remove(&timestamp);
                }
                BatchValidity::Future | BatchValidity::Undecided => return Ok(None),
            }
        }
    }

    /// Derives an empty batch on top of the safe head once the sequencing window of the safe
    /// epoch has elapsed.
    ///
    /// The batch stays in the safe epoch until the next epoch's L1 timestamp is reached. It only
    /// adopts the next epoch once that epoch's sequencing window has elapsed too.
    fn empty_batch(&self, state: &State) -> Option<DerivedBatch> {
        let epoch = state.safe_epoch();
        let current_l1_block = state.current_epoch_num();
        let window = self.cfg.seq_window_size;
        if current_l1_block <= epoch.number + window {
            return None;
        }
        let next_epoch = state.epoch(epoch.number + 1)?;

        let safe_head = state.safe_head();
        let timestamp = safe_head.timestamp + self.cfg.block_time;
        let origin = if timestamp < next_epoch.timestamp {
            epoch
        } else if current_l1_block > next_epoch.number + window {
            next_epoch
        } else {
            return None;
        };
        info!(
            target: "batch-validator",
            "Sequencing window elapsed, deriving empty batch at timestamp {timestamp} in epoch {}",
            origin.number
        );

        Some(DerivedBatch {
            batch: SingleBatch {
                parent_hash: safe_head.hash,
                epoch_num: origin.number,
                epoch_hash: origin.hash,
                timestamp,
                transactions: Vec::new(),
            },
            inclusion_block: current_l1_block,
        })
    }

    /// Expands an accepted span batch, queueing its singular batches. The span is put back into
    /// the buffer if an epoch it references is not known yet.
    fn expand(&mut self, span: BatchWithInclusionBlock, state: &State) -> PipelineResult<()> {
        let Batch::Span(span_batch) = &span.batch else {
            return Ok(());
        };
        match span_batch.get_singular_batches(state) {
            Ok(batches) => {
                let inclusion_block = span.inclusion_block;
                self.pending.extend(
                    batches.into_iter().map(|batch| DerivedBatch { batch, inclusion_block }),
                );
                Ok(())
            }
            Err(e) => {
                self.batches.insert(span.timestamp(), span);
                Err(e)
            }
        }
    }
}

impl<P> BatchProvider for BatchValidator<P>
where
    P: ChannelProvider + PurgeableStage + Debug,
{
    fn next_batch(&mut self) -> PipelineResult<Option<DerivedBatch>> {
        if let Some(batch) = self.pending.pop_front() {
            return Ok(Some(batch));
        }

        let state = self.state.snapshot();
        loop {
            match self.next_accepted(&state)? {
                Some(BatchWithInclusionBlock { inclusion_block, batch: Batch::Single(batch) }) => {
                    return Ok(Some(DerivedBatch { batch, inclusion_block }));
                }
                Some(span) => {
                    self.expand(span, &state)?;
                    return Ok(self.pending.pop_front());
                }
                None => {}
            }

            match self.prev.next_channel()? {
                Some(channel) => self.ingest(channel),
                None => return Ok(self.empty_batch(&state)),
            }
        }
    }
}

impl<P> PurgeableStage for BatchValidator<P>
where
    P: ChannelProvider + PurgeableStage + Debug,
{
    fn purge(&mut self) {
        self.batches.clear();
        self.pending.clear();
        self.prev.purge();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        batch::{encode_batches, SpanBatch},
        test_utils::{
            l1_hash, l2_hash, test_state, CollectingLayer, TestChannelProvider, TraceStorage,
        },
    };
    use alloy_primitives::{Bytes, B256};
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    fn single(k: u64) -> SingleBatch {
        SingleBatch {
            parent_hash: l2_hash(k - 1),
            epoch_num: k / 3,
            epoch_hash: l1_hash(k / 3),
            timestamp: k * 2,
            transactions: vec![],
        }
    }

    fn channel(batches: &[Batch], l1_inclusion_block: u64) -> Channel {
        Channel {
            id: [0x11; 16],
            data: encode_batches(batches).unwrap().into(),
            l1_inclusion_block,
        }
    }

    fn validator(state: State, channels: Vec<Channel>) -> BatchValidator<TestChannelProvider> {
        let cfg = Arc::new(*state.config());
        let provider = TestChannelProvider::new(channels.into_iter().map(Ok).collect());
        BatchValidator::new(cfg, provider, SharedState::new(state))
    }

    #[test]
    fn test_accepts_next_single_batch() {
        let batches = [Batch::Single(single(6))];
        let mut stage = validator(test_state(5, 10), vec![channel(&batches, 4)]);
        let derived = stage.next_batch().unwrap().unwrap();
        assert_eq!(derived, DerivedBatch { batch: single(6), inclusion_block: 4 });
        assert_eq!(stage.next_batch().unwrap(), None);
    }

    #[test]
    fn test_out_of_order_batches() {
        let batches = [Batch::Single(single(7)), Batch::Single(single(6))];
        let shared = SharedState::new(test_state(5, 10));
        let cfg = Arc::new(*shared.snapshot().config());
        let provider = TestChannelProvider::new(vec![Ok(channel(&batches, 4))]);
        let mut stage = BatchValidator::new(cfg, provider, shared.clone());

        assert_eq!(stage.next_batch().unwrap().unwrap().batch, single(6));
        // Block 7 is a future batch until the safe head advances.
        assert_eq!(stage.next_batch().unwrap(), None);
        assert_eq!(stage.buffered_batches(), 1);

        shared.update(|state| {
            state.update_safe_head(crate::test_utils::l2_block(6), crate::test_utils::l2_epoch(6))
        });
        assert_eq!(stage.next_batch().unwrap().unwrap().batch, single(7));
    }

    #[test]
    fn test_drops_invalid_batches() {
        let storage = TraceStorage::default();
        let layer = CollectingLayer::new(storage.clone());
        let subscriber = tracing_subscriber::Registry::default().with(layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        let stale = single(5);
        let bad_parent = SingleBatch { parent_hash: B256::ZERO, ..single(6) };
        let mut stage = validator(
            test_state(5, 10),
            vec![channel(&[Batch::Single(stale), Batch::Single(bad_parent)], 4)],
        );
        assert_eq!(stage.next_batch().unwrap(), None);
        assert_eq!(stage.buffered_batches(), 0);
        let dropped = storage
            .get_by_level(Level::WARN)
            .into_iter()
            .filter(|msg| msg.contains("Dropping invalid batch"))
            .count();
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_replaces_batch_with_same_timestamp() {
        let first =
            SingleBatch { transactions: vec![Bytes::from_static(&[0x02, 0x01])], ..single(6) };
        let mut stage = validator(
            test_state(5, 10),
            vec![channel(&[Batch::Single(first)], 4), channel(&[Batch::Single(single(6))], 5)],
        );
        for _ in 0..2 {
            let channel = stage.prev.next_channel().unwrap().unwrap();
            stage.ingest(channel);
        }
        assert_eq!(stage.buffered_batches(), 1);
        let derived = stage.next_batch().unwrap().unwrap();
        assert_eq!(derived, DerivedBatch { batch: single(6), inclusion_block: 5 });
    }

    #[test]
    fn test_expands_span_batch() {
        let singles: Vec<_> = (6..10).map(single).collect();
        let span = SpanBatch::from_singular_batches(singles.clone(), 0, 0, 10).unwrap();
        let mut stage = validator(test_state(5, 10), vec![channel(&[Batch::Span(span)], 4)]);

        for expected in &singles {
            let derived = stage.next_batch().unwrap().unwrap();
            assert_eq!(derived.inclusion_block, 4);
            assert_eq!(derived.batch.timestamp, expected.timestamp);
            assert_eq!(derived.batch.epoch_num, expected.epoch_num);
            assert_eq!(derived.batch.epoch_hash, expected.epoch_hash);
        }
        assert_eq!(stage.next_batch().unwrap(), None);
    }

    #[test]
    fn test_empty_batch_after_sequencing_window() {
        let mut stage = validator(test_state(5, 110), vec![]);
        let derived = stage.next_batch().unwrap().unwrap();
        assert_eq!(derived.inclusion_block, 110);
        assert_eq!(
            derived.batch,
            SingleBatch {
                parent_hash: l2_hash(5),
                epoch_num: 2,
                epoch_hash: l1_hash(2),
                timestamp: 12,
                transactions: vec![],
            }
        );
    }

    #[test]
    fn test_empty_batch_stays_in_epoch() {
        // Safe head 3 is the first block of epoch 1; block 4 still belongs to it.
        let mut stage = validator(test_state(3, 110), vec![]);
        let derived = stage.next_batch().unwrap().unwrap();
        assert_eq!(derived.batch.epoch_num, 1);
        assert_eq!(derived.batch.timestamp, 8);
    }

    #[test]
    fn test_empty_batch_waits_for_next_epoch_window() {
        // The window of epoch 1 has elapsed, but block 6 belongs to epoch 2 whose window has not.
        let mut stage = validator(test_state(5, 102), vec![]);
        assert_eq!(stage.next_batch().unwrap(), None);

        let mut stage = validator(test_state(5, 103), vec![]);
        let derived = stage.next_batch().unwrap().unwrap();
        assert_eq!(derived.batch.epoch_num, 2);
        assert_eq!(derived.inclusion_block, 103);
    }

    #[test]
    fn test_no_batch_within_sequencing_window() {
        let mut stage = validator(test_state(5, 10), vec![]);
        assert_eq!(stage.next_batch().unwrap(), None);
    }

    #[test]
    fn test_purge() {
        let batches = [Batch::Single(single(7))];
        let mut stage = validator(test_state(5, 10), vec![channel(&batches, 4)]);
        assert_eq!(stage.next_batch().unwrap(), None);
        assert_eq!(stage.buffered_batches(), 1);
        stage.purge();
        assert_eq!(stage.buffered_batches(), 0);
        assert!(stage.prev.purged);
    }
}
