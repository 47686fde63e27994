//! Raw Span Batch Payload

use super::{SpanBatchBits, SpanBatchError, SpanBatchTransactions, SpanDecodingError};
use crate::params::MAX_SPAN_BATCH_BYTES;

/// Span Batch Payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanBatchPayload {
    /// Number of L2 block in the span
    pub block_count: u64,
    /// Standard span-batch bitlist of blockCount bits. Each bit indicates if the L1 origin is
    /// changed at the L2 block.
    pub origin_bits: SpanBatchBits,
    /// List of transaction counts for each L2 block
    pub block_tx_counts: Vec<u64>,
    /// Transactions encoded in SpanBatch specs
    pub txs: SpanBatchTransactions,
}

impl SpanBatchPayload {
    /// Decodes a [SpanBatchPayload] from a reader.
    pub fn decode_payload(r: &mut &[u8]) -> Result<Self, SpanBatchError> {
        let mut payload = Self::default();
        payload.decode_block_count(r)?;
        payload.origin_bits = SpanBatchBits::decode(r, payload.block_count as usize)?;
        payload.decode_block_tx_counts(r)?;
        payload.decode_txs(r)?;
        Ok(payload)
    }

    /// Encodes a [SpanBatchPayload] into a writer.
    pub fn encode_payload(&self, w: &mut Vec<u8>) -> Result<(), SpanBatchError> {
        let mut buf = unsigned_varint::encode::u64_buffer();
        w.extend_from_slice(unsigned_varint::encode::u64(self.block_count, &mut buf));
        self.origin_bits.encode(w, self.block_count as usize)?;
        for block_tx_count in &self.block_tx_counts {
            w.extend_from_slice(unsigned_varint::encode::u64(*block_tx_count, &mut buf));
        }
        self.txs.encode(w)
    }

    /// Decode a block count from a reader.
    fn decode_block_count(&mut self, r: &mut &[u8]) -> Result<(), SpanBatchError> {
        let (block_count, remaining) =
            unsigned_varint::decode::u64(r).map_err(|_| SpanDecodingError::BlockCount)?;
        // Every block takes at least a single byte.
        if block_count > MAX_SPAN_BATCH_BYTES {
            return Err(SpanBatchError::TooBigSpanBatchSize);
        }
        if block_count == 0 {
            return Err(SpanBatchError::EmptySpanBatch);
        }
        self.block_count = block_count;
        *r = remaining;
        Ok(())
    }

    /// Decode block transaction counts from a reader.
    fn decode_block_tx_counts(&mut self, r: &mut &[u8]) -> Result<(), SpanBatchError> {
        let mut block_tx_counts = Vec::with_capacity((self.block_count as usize).min(r.len()));
        for _ in 0..self.block_count {
            let (block_tx_count, remaining) =
                unsigned_varint::decode::u64(r).map_err(|_| SpanDecodingError::BlockTxCounts)?;
            // Every transaction takes at least a single byte.
            if block_tx_count > MAX_SPAN_BATCH_BYTES {
                return Err(SpanBatchError::TooBigSpanBatchSize);
            }
            block_tx_counts.push(block_tx_count);
            *r = remaining;
        }
        self.block_tx_counts = block_tx_counts;
        Ok(())
    }

    /// Decode transactions from a reader.
    fn decode_txs(&mut self, r: &mut &[u8]) -> Result<(), SpanBatchError> {
        let total_block_tx_count =
            self.block_tx_counts.iter().try_fold(0u64, |acc, block_tx_count| {
                acc.checked_add(*block_tx_count).ok_or(SpanBatchError::TooBigSpanBatchSize)
            })?;
        if total_block_tx_count > MAX_SPAN_BATCH_BYTES {
            return Err(SpanBatchError::TooBigSpanBatchSize);
        }
        self.txs.total_block_tx_count = total_block_tx_count;
        self.txs.decode(r)
    }
}
