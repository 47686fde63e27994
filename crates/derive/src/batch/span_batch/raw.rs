//! Raw Span Batch

use super::{
    SpanBatch, SpanBatchElement, SpanBatchError, SpanBatchPayload, SpanBatchPrefix,
};
use crate::batch::BatchType;

/// A span batch as it appears on the wire, before its blocks are expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSpanBatch {
    /// The span batch prefix
    pub prefix: SpanBatchPrefix,
    /// The span batch payload
    pub payload: SpanBatchPayload,
}

impl RawSpanBatch {
    /// Returns the batch type
    pub const fn get_batch_type(&self) -> BatchType {
        BatchType::Span
    }

    /// Encodes the [RawSpanBatch] into a writer.
    pub fn encode(&self, w: &mut Vec<u8>) -> Result<(), SpanBatchError> {
        self.prefix.encode_prefix(w);
        self.payload.encode_payload(w)
    }

    /// Decodes the [RawSpanBatch] from a reader.
    pub fn decode(r: &mut &[u8]) -> Result<Self, SpanBatchError> {
        let prefix = SpanBatchPrefix::decode_prefix(r)?;
        let payload = SpanBatchPayload::decode_payload(r)?;
        Ok(Self { prefix, payload })
    }

    /// Expands the [RawSpanBatch] into a [SpanBatch] holding one [SpanBatchElement] per block.
    ///
    /// The L1 origin of each block is recovered by walking the origin bits backwards from the
    /// last block, whose origin number is carried in the prefix.
    pub fn derive(
        &self,
        block_time: u64,
        genesis_time: u64,
        chain_id: u64,
    ) -> Result<SpanBatch, SpanBatchError> {
        let block_count = self.payload.block_count as usize;
        if block_count == 0 {
            return Err(SpanBatchError::EmptySpanBatch);
        }

        let mut block_origin_nums = Vec::with_capacity(block_count);
        let mut l1_origin_number = self.prefix.l1_origin_num;
        for i in (0..block_count).rev() {
            block_origin_nums.push(l1_origin_number);
            if self.payload.origin_bits.get_bit(i) && i > 0 {
                l1_origin_number =
                    l1_origin_number.checked_sub(1).ok_or(SpanBatchError::L1OriginUnderflow)?;
            }
        }
        block_origin_nums.reverse();

        let start_time = genesis_time
            .checked_add(self.prefix.rel_timestamp)
            .ok_or(SpanBatchError::TimestampOverflow)?;
        let full_txs = self.payload.txs.full_txs(chain_id)?;
        let mut txs = full_txs.into_iter();
        let mut batches = Vec::with_capacity(block_count);
        for (i, epoch_num) in block_origin_nums.into_iter().enumerate() {
            let tx_count = self.payload.block_tx_counts.get(i).copied().unwrap_or_default();
            let timestamp = block_time
                .checked_mul(i as u64)
                .and_then(|offset| start_time.checked_add(offset))
                .ok_or(SpanBatchError::TimestampOverflow)?;
            batches.push(SpanBatchElement {
                epoch_num,
                timestamp,
                transactions: txs.by_ref().take(tx_count as usize).collect(),
            });
        }

        Ok(SpanBatch {
            parent_check: self.prefix.parent_check,
            l1_origin_check: self.prefix.l1_origin_check,
            genesis_timestamp: genesis_time,
            chain_id,
            batches,
            origin_bits: self.payload.origin_bits.clone(),
            block_tx_counts: self.payload.block_tx_counts.clone(),
            txs: self.payload.txs.clone(),
        })
    }
}
