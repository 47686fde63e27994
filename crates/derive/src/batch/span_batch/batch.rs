//! The Span Batch Type

use super::{
    RawSpanBatch, SpanBatchBits, SpanBatchElement, SpanBatchError, SpanBatchPayload,
    SpanBatchPrefix, SpanBatchTransactions,
};
use crate::{
    batch::{BatchValidity, SingleBatch},
    errors::{PipelineError, PipelineResult},
    state::State,
};
use alloy_primitives::{Bytes, FixedBytes, B256};
use tracing::{info, warn};

/// The span batch contains the input to build a span of L2 blocks in derived form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpanBatch {
    /// First 20 bytes of the first block's parent hash
    pub parent_check: FixedBytes<20>,
    /// First 20 bytes of the last block's L1 origin hash
    pub l1_origin_check: FixedBytes<20>,
    /// Genesis block timestamp
    pub genesis_timestamp: u64,
    /// Chain ID
    pub chain_id: u64,
    /// List of block input in derived form
    pub batches: Vec<SpanBatchElement>,
    /// Caching - origin bits
    pub origin_bits: SpanBatchBits,
    /// Caching - block tx counts
    pub block_tx_counts: Vec<u64>,
    /// Caching - span batch txs
    pub txs: SpanBatchTransactions,
}

impl SpanBatch {
    /// Creates an empty [SpanBatch] to be filled with [Self::append_singular_batch].
    pub fn new(genesis_timestamp: u64, chain_id: u64) -> Self {
        Self { genesis_timestamp, chain_id, ..Default::default() }
    }

    /// Builds a [SpanBatch] from a chain of [SingleBatch]es.
    ///
    /// `first_seq_num` is the sequence number of the first batch within its epoch.
    pub fn from_singular_batches(
        batches: impl IntoIterator<Item = SingleBatch>,
        first_seq_num: u64,
        genesis_timestamp: u64,
        chain_id: u64,
    ) -> Result<Self, SpanBatchError> {
        let mut span = Self::new(genesis_timestamp, chain_id);
        let mut seq_num = first_seq_num;
        for batch in batches {
            if let Some(last) = span.peek(0) {
                seq_num = if last.epoch_num < batch.epoch_num { 0 } else { seq_num + 1 };
            }
            span.append_singular_batch(batch, seq_num)?;
        }
        Ok(span)
    }

    /// Returns the timestamp for the first batch in the span.
    pub fn starting_timestamp(&self) -> u64 {
        self.batches.first().map(|b| b.timestamp).unwrap_or_default()
    }

    /// Returns the timestamp for the last batch in the span.
    pub fn final_timestamp(&self) -> u64 {
        self.batches.last().map(|b| b.timestamp).unwrap_or_default()
    }

    /// Returns the epoch number for the first batch in the span.
    pub fn starting_epoch_num(&self) -> u64 {
        self.batches.first().map(|b| b.epoch_num).unwrap_or_default()
    }

    /// Checks if the first 20 bytes of the given hash match the L1 origin check.
    pub fn check_origin_hash(&self, hash: B256) -> bool {
        self.l1_origin_check.as_slice() == &hash[..20]
    }

    /// Checks if the first 20 bytes of the given hash match the parent check.
    pub fn check_parent_hash(&self, hash: B256) -> bool {
        self.parent_check.as_slice() == &hash[..20]
    }

    /// Converts the span batch to a raw span batch.
    pub fn to_raw_span_batch(&self) -> Result<RawSpanBatch, SpanBatchError> {
        let (Some(span_start), Some(span_end)) = (self.batches.first(), self.batches.last()) else {
            return Err(SpanBatchError::EmptySpanBatch);
        };

        Ok(RawSpanBatch {
            prefix: SpanBatchPrefix {
                rel_timestamp: span_start.timestamp.saturating_sub(self.genesis_timestamp),
                l1_origin_num: span_end.epoch_num,
                parent_check: self.parent_check,
                l1_origin_check: self.l1_origin_check,
            },
            payload: SpanBatchPayload {
                block_count: self.batches.len() as u64,
                origin_bits: self.origin_bits.clone(),
                block_tx_counts: self.block_tx_counts.clone(),
                txs: self.txs.clone(),
            },
        })
    }

    /// Append a [SingleBatch] to the [SpanBatch]. Updates the L1 origin check if need be.
    pub fn append_singular_batch(
        &mut self,
        singular_batch: SingleBatch,
        seq_num: u64,
    ) -> Result<(), SpanBatchError> {
        let SingleBatch { parent_hash, epoch_hash, .. } = singular_batch;
        let element = SpanBatchElement::from(singular_batch);

        let epoch_bit = match self.peek(0) {
            // The first block sets the parent check and changes origin only at an epoch start.
            None => {
                self.parent_check = FixedBytes::from_slice(&parent_hash[..20]);
                seq_num == 0
            }
            Some(last) => last.epoch_num < element.epoch_num,
        };
        self.l1_origin_check = FixedBytes::from_slice(&epoch_hash[..20]);

        self.origin_bits.set_bit(self.batches.len(), epoch_bit);
        self.block_tx_counts.push(element.transactions.len() as u64);
        self.txs.add_txs(&element.transactions, self.chain_id)?;
        self.batches.push(element);
        Ok(())
    }

    /// Peek at the `n`th-to-last element in the batch.
    fn peek(&self, n: usize) -> Option<&SpanBatchElement> {
        self.batches.len().checked_sub(n + 1).and_then(|i| self.batches.get(i))
    }

    /// Validates the span against the given chain state.
    ///
    /// Any violated rule drops the whole span. Lookups that need L1 data not yet known leave it
    /// [BatchValidity::Undecided].
    pub fn check_batch(&self, state: &State, inclusion_block: u64) -> BatchValidity {
        let (Some(first), Some(last)) = (self.batches.first(), self.batches.last()) else {
            warn!(target: "batch-validator", "empty span batch");
            return BatchValidity::Drop;
        };
        let cfg = state.config();
        let safe_head = state.safe_head();
        let safe_epoch = state.safe_epoch();
        let next_timestamp = safe_head.timestamp + cfg.block_time;
        let start_epoch_num = first.epoch_num;
        let end_epoch_num = last.epoch_num;

        if last.timestamp < next_timestamp {
            warn!(
                target: "batch-validator",
                "past batch: next timestamp {}, span end timestamp {}",
                next_timestamp,
                last.timestamp
            );
            return BatchValidity::Drop;
        }
        if first.timestamp > next_timestamp {
            return BatchValidity::Future;
        }

        let batch_origin = if start_epoch_num == safe_epoch.number + 1 {
            state.epoch(start_epoch_num)
        } else {
            Some(safe_epoch)
        };
        let Some(batch_origin) = batch_origin else {
            info!(target: "batch-validator", "missing L1 block {start_epoch_num} for span origin");
            return BatchValidity::Undecided;
        };
        if !cfg.is_delta_active(batch_origin.timestamp) {
            warn!(
                target: "batch-validator",
                "span batch origin {} is before delta activation",
                batch_origin.timestamp
            );
            return BatchValidity::Drop;
        }

        let prev = first.timestamp.checked_sub(cfg.block_time).and_then(|ts| state.l2_info(ts));
        let Some((prev_block, prev_epoch)) = prev else {
            warn!(target: "batch-validator", "previous L2 block of span not found");
            return BatchValidity::Drop;
        };
        if !self.check_parent_hash(prev_block.hash) {
            warn!(
                target: "batch-validator",
                "parent check failed: batch parent {}, previous L2 block {}",
                self.parent_check,
                prev_block.hash
            );
            return BatchValidity::Drop;
        }

        if start_epoch_num.saturating_add(cfg.seq_window_size) < inclusion_block {
            warn!(
                target: "batch-validator",
                "batch was included too late: start epoch {} + window {} < inclusion block {}",
                start_epoch_num,
                cfg.seq_window_size,
                inclusion_block
            );
            return BatchValidity::Drop;
        }

        if start_epoch_num > prev_epoch.number + 1 {
            warn!(
                target: "batch-validator",
                "span skips epochs: start epoch {}, previous epoch {}",
                start_epoch_num,
                prev_epoch.number
            );
            return BatchValidity::Drop;
        }

        let Some(end_origin) = state.epoch(end_epoch_num) else {
            info!(target: "batch-validator", "missing L1 block {end_epoch_num} for span end");
            return BatchValidity::Undecided;
        };
        if !self.check_origin_hash(end_origin.hash) {
            warn!(
                target: "batch-validator",
                "origin check failed: batch origin {}, L1 origin {}",
                self.l1_origin_check,
                end_origin.hash
            );
            return BatchValidity::Drop;
        }

        if start_epoch_num < prev_epoch.number {
            warn!(target: "batch-validator", "span start epoch {start_epoch_num} moves backwards");
            return BatchValidity::Drop;
        }

        for (i, element) in self.batches.iter().enumerate() {
            if element.timestamp <= safe_head.timestamp {
                continue;
            }
            let Some(origin) = state.epoch(element.epoch_num) else {
                info!(
                    target: "batch-validator",
                    "missing L1 block {} for span block",
                    element.epoch_num
                );
                return BatchValidity::Undecided;
            };
            if element.timestamp < origin.timestamp {
                warn!(
                    target: "batch-validator",
                    "block timestamp {} is before its L1 origin {}",
                    element.timestamp,
                    origin.timestamp
                );
                return BatchValidity::Drop;
            }

            let max_drift = origin.timestamp + cfg.max_sequencer_drift(origin.timestamp);
            if element.timestamp > max_drift {
                if !element.transactions.is_empty() {
                    warn!(
                        target: "batch-validator",
                        "batch exceeded sequencer time drift with transactions, max {}",
                        max_drift
                    );
                    return BatchValidity::Drop;
                }
                let origin_advanced = match i.checked_sub(1).and_then(|p| self.batches.get(p)) {
                    None => start_epoch_num == prev_epoch.number + 1,
                    Some(prev) => element.epoch_num > prev.epoch_num,
                };
                if !origin_advanced {
                    match state.epoch(element.epoch_num + 1) {
                        Some(next) if element.timestamp >= next.timestamp => {
                            warn!(
                                target: "batch-validator",
                                "batch exceeded sequencer time drift without adopting the next origin"
                            );
                            return BatchValidity::Drop;
                        }
                        Some(_) => {}
                        None => {
                            info!(
                                target: "batch-validator",
                                "missing L1 block {} to check sequencer drift",
                                element.epoch_num + 1
                            );
                            return BatchValidity::Undecided;
                        }
                    }
                }
            }

            if has_invalid_transactions(&element.transactions) {
                warn!(target: "batch-validator", "invalid transaction in span block {}", i);
                return BatchValidity::Drop;
            }
        }

        for element in self.batches.iter().take_while(|e| e.timestamp < next_timestamp) {
            let Some((_, epoch)) = state.l2_info(element.timestamp) else {
                warn!(
                    target: "batch-validator",
                    "overlapped L2 block {} not found",
                    element.timestamp
                );
                return BatchValidity::Drop;
            };
            if element.epoch_num != epoch.number {
                warn!(
                    target: "batch-validator",
                    "overlapped block epoch mismatch: batch {}, chain {}",
                    element.epoch_num,
                    epoch.number
                );
                return BatchValidity::Drop;
            }
        }

        BatchValidity::Accept
    }

    /// Converts the blocks after the safe head to [SingleBatch]es, filling in their epoch hashes.
    ///
    /// The resulting batches carry no parent hash.
    pub fn get_singular_batches(&self, state: &State) -> PipelineResult<Vec<SingleBatch>> {
        let safe_timestamp = state.safe_head().timestamp;
        let mut single_batches = Vec::with_capacity(self.batches.len());
        for element in &self.batches {
            if element.timestamp <= safe_timestamp {
                if !element.transactions.is_empty() {
                    warn!(
                        target: "batch-validator",
                        "past span batch element: timestamp {} <= safe head timestamp {}",
                        element.timestamp,
                        safe_timestamp
                    );
                }
                continue;
            }
            let epoch = state
                .epoch(element.epoch_num)
                .ok_or(PipelineError::MissingEpoch(element.epoch_num).temp())?;
            single_batches.push(SingleBatch {
                parent_hash: B256::ZERO,
                epoch_num: element.epoch_num,
                epoch_hash: epoch.hash,
                timestamp: element.timestamp,
                transactions: element.transactions.clone(),
            });
        }
        Ok(single_batches)
    }
}

/// Returns true if any transaction is empty or a deposit.
pub(crate) fn has_invalid_transactions(txs: &[Bytes]) -> bool {
    txs.iter().any(|tx| tx.first().map_or(true, |ty| *ty == 0x7E))
}
