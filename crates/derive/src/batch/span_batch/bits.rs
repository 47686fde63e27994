//! Module for working with span batch bits.

use super::SpanBatchError;
use crate::{batch::span_batch::SpanDecodingError, ensure, params::MAX_SPAN_BATCH_BYTES};
use alloy_rlp::Buf;

/// A standard span-batch bitlist.
///
/// The bitlist is a big-endian integer, left-padded with zeroes to a multiple of 8 bits. Bit `i`
/// is bit `i` of that integer, so it lives in the `i / 8`-th byte counted from the end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpanBatchBits(Vec<u8>);

impl AsRef<[u8]> for SpanBatchBits {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<SpanBatchBits> for Vec<u8> {
    fn from(bits: SpanBatchBits) -> Self {
        bits.0
    }
}

/// Returns the number of bytes needed to hold `bit_length` bits.
const fn buffer_len(bit_length: usize) -> usize {
    // Not `(L + 7) / 8`, which can overflow.
    bit_length / 8 + if bit_length % 8 != 0 { 1 } else { 0 }
}

impl SpanBatchBits {
    /// Wraps a big-endian byte buffer.
    pub const fn new(bits: Vec<u8>) -> Self {
        Self(bits)
    }

    /// Decodes a standard span-batch bitlist of `bit_length` bits from a reader.
    pub fn decode(r: &mut &[u8], bit_length: usize) -> Result<Self, SpanBatchError> {
        let buffer_len = buffer_len(bit_length);
        ensure!(buffer_len as u64 <= MAX_SPAN_BATCH_BYTES, SpanBatchError::TooBigSpanBatchSize);
        ensure!(r.len() >= buffer_len, SpanDecodingError::Bitlist.into());

        let bits = Self(r[..buffer_len].to_vec());
        r.advance(buffer_len);

        if bits.bit_len() > bit_length {
            return Err(SpanBatchError::BitfieldTooLong);
        }
        Ok(bits)
    }

    /// Encodes the bitlist as exactly `bit_length` bits, left-padded to a byte boundary.
    pub fn encode(&self, w: &mut Vec<u8>, bit_length: usize) -> Result<(), SpanBatchError> {
        ensure!(self.bit_len() <= bit_length, SpanBatchError::BitfieldTooLong);

        let buffer_len = buffer_len(bit_length);
        ensure!(buffer_len as u64 <= MAX_SPAN_BATCH_BYTES, SpanBatchError::TooBigSpanBatchSize);

        let significant = self.significant_bytes();
        w.resize(w.len() + buffer_len - significant.len(), 0);
        w.extend_from_slice(significant);
        Ok(())
    }

    /// Returns bit `index`. Bits past the end of the buffer read as unset.
    pub fn get_bit(&self, index: usize) -> bool {
        let byte_index = index / 8;
        if byte_index >= self.0.len() {
            return false;
        }
        let byte = self.0[self.0.len() - 1 - byte_index];
        byte & (1 << (index % 8)) != 0
    }

    /// Sets bit `index`, growing the buffer at the front as needed.
    pub fn set_bit(&mut self, index: usize, value: bool) {
        let byte_index = index / 8;
        if byte_index >= self.0.len() {
            let grow = byte_index + 1 - self.0.len();
            self.0.splice(0..0, std::iter::repeat(0).take(grow));
        }

        let len = self.0.len();
        let byte = &mut self.0[len - 1 - byte_index];
        if value {
            *byte |= 1 << (index % 8);
        } else {
            *byte &= !(1 << (index % 8));
        }
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.0.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Calculates the bit length of the integer held by the bitlist.
    pub fn bit_len(&self) -> usize {
        match self.significant_bytes().split_first() {
            Some((top, rest)) => rest.len() * 8 + (8 - top.leading_zeros() as usize),
            None => 0,
        }
    }

    fn significant_bytes(&self) -> &[u8] {
        let start = self.0.iter().position(|b| *b != 0).unwrap_or(self.0.len());
        &self.0[start..]
    }
}
