//! This module contains the batch types for the OP Stack derivation pipeline: [SpanBatch] &
//! [SingleBatch].

use crate::{errors::BatchDecodingError, state::State};
use alloy_primitives::Bytes;
use alloy_rlp::{Buf, Decodable, Encodable};
use rollup_primitives::prelude::RollupConfig;
use tracing::warn;

mod batch_type;
pub use batch_type::BatchType;

mod validity;
pub use validity::BatchValidity;

mod span_batch;
pub use span_batch::{
    RawSpanBatch, SignedTransaction, SpanBatch, SpanBatchBits, SpanBatchEip1559TransactionData,
    SpanBatchEip2930TransactionData, SpanBatchElement, SpanBatchError,
    SpanBatchLegacyTransactionData, SpanBatchPayload, SpanBatchPrefix, SpanBatchSignature,
    SpanBatchTransactionData, SpanBatchTransactions, SpanDecodingError, TxType,
};

mod single_batch;
pub use single_batch::SingleBatch;

/// A batch with its inclusion block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchWithInclusionBlock {
    /// The number of the L1 block that included the batch
    pub inclusion_block: u64,
    /// The batch
    pub batch: Batch,
}

impl BatchWithInclusionBlock {
    /// Creates a new [BatchWithInclusionBlock].
    pub const fn new(inclusion_block: u64, batch: Batch) -> Self {
        Self { inclusion_block, batch }
    }

    /// Returns the timestamp the batch is buffered under.
    pub fn timestamp(&self) -> u64 {
        self.batch.timestamp()
    }

    /// Validates the batch can be applied on top of the safe head of `state`.
    pub fn check_batch(&self, state: &State) -> BatchValidity {
        match &self.batch {
            Batch::Single(single_batch) => single_batch.check_batch(state, self.inclusion_block),
            Batch::Span(span_batch) => span_batch.check_batch(state, self.inclusion_block),
        }
    }
}

/// A Batch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Batch {
    /// A single batch
    Single(SingleBatch),
    /// Span Batches
    Span(SpanBatch),
}

impl Batch {
    /// Returns the timestamp for the batch.
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Single(sb) => sb.timestamp,
            Self::Span(sb) => sb.starting_timestamp(),
        }
    }

    /// Returns the batch type.
    pub const fn batch_type(&self) -> BatchType {
        match self {
            Self::Single(_) => BatchType::Single,
            Self::Span(_) => BatchType::Span,
        }
    }

    /// Attempts to decode a batch from a reader.
    pub fn decode(r: &mut &[u8], cfg: &RollupConfig) -> Result<Self, BatchDecodingError> {
        if r.is_empty() {
            return Err(BatchDecodingError::EmptyBuffer);
        }

        let batch_type = BatchType::try_from(r[0])?;
        r.advance(1);

        match batch_type {
            BatchType::Single => Ok(Self::Single(SingleBatch::decode(r)?)),
            BatchType::Span => {
                let raw_span_batch = RawSpanBatch::decode(r)?;
                let span_batch =
                    raw_span_batch.derive(cfg.block_time, cfg.genesis.l2_time, cfg.l2_chain_id)?;
                Ok(Self::Span(span_batch))
            }
        }
    }

    /// Encodes the batch, type byte first.
    pub fn encode(&self, w: &mut Vec<u8>) -> Result<(), SpanBatchError> {
        w.push(self.batch_type().into());
        match self {
            Self::Single(sb) => sb.encode(w),
            Self::Span(sb) => sb.to_raw_span_batch()?.encode(w)?,
        }
        Ok(())
    }
}

/// Decodes the batches carried by a decompressed channel.
///
/// The channel is a sequence of RLP byte strings, one per batch, with no enclosing list. Batches
/// that fail to decode are logged and skipped. A malformed string ends the channel, keeping the
/// batches read before it.
pub fn decode_batches(
    mut data: &[u8],
    inclusion_block: u64,
    cfg: &RollupConfig,
) -> Vec<BatchWithInclusionBlock> {
    let mut batches = Vec::new();
    while !data.is_empty() {
        let blob = match Bytes::decode(&mut data) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(target: "batch-validator", "Failed to read batch from channel: {e}");
                break;
            }
        };
        match Batch::decode(&mut blob.as_ref(), cfg) {
            Ok(batch) => batches.push(BatchWithInclusionBlock::new(inclusion_block, batch)),
            Err(e) => warn!(target: "batch-validator", "Failed to decode batch: {e}"),
        }
    }
    batches
}

/// Encodes batches as the concatenated RLP strings a channel carries.
pub fn encode_batches<'a>(
    batches: impl IntoIterator<Item = &'a Batch>,
) -> Result<Vec<u8>, SpanBatchError> {
    let mut out = Vec::new();
    for batch in batches {
        let mut buf = Vec::new();
        batch.encode(&mut buf)?;
        buf.as_slice().encode(&mut out);
    }
    Ok(out)
}
