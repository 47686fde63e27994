//! Raw Span Batch Prefix

use super::{SpanBatchError, SpanDecodingError};
use alloy_primitives::FixedBytes;
use alloy_rlp::Buf;

/// Span Batch Prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanBatchPrefix {
    /// Relative timestamp of the first block
    pub rel_timestamp: u64,
    /// L1 origin number
    pub l1_origin_num: u64,
    /// First 20 bytes of the first block's parent hash
    pub parent_check: FixedBytes<20>,
    /// First 20 bytes of the last block's L1 origin hash
    pub l1_origin_check: FixedBytes<20>,
}

impl SpanBatchPrefix {
    /// Decodes a [SpanBatchPrefix] from a reader.
    pub fn decode_prefix(r: &mut &[u8]) -> Result<Self, SpanBatchError> {
        let (rel_timestamp, rest) = unsigned_varint::decode::u64(r)
            .map_err(|_| SpanDecodingError::RelativeTimestamp)?;
        *r = rest;
        let (l1_origin_num, rest) =
            unsigned_varint::decode::u64(r).map_err(|_| SpanDecodingError::L1OriginNumber)?;
        *r = rest;
        let parent_check = read_check(r, SpanDecodingError::ParentCheck)?;
        let l1_origin_check = read_check(r, SpanDecodingError::L1OriginCheck)?;
        Ok(Self { rel_timestamp, l1_origin_num, parent_check, l1_origin_check })
    }

    /// Encodes the [SpanBatchPrefix] into a writer.
    pub fn encode_prefix(&self, w: &mut Vec<u8>) {
        let mut buf = unsigned_varint::encode::u64_buffer();
        w.extend_from_slice(unsigned_varint::encode::u64(self.rel_timestamp, &mut buf));
        w.extend_from_slice(unsigned_varint::encode::u64(self.l1_origin_num, &mut buf));
        w.extend_from_slice(self.parent_check.as_slice());
        w.extend_from_slice(self.l1_origin_check.as_slice());
    }
}

fn read_check(r: &mut &[u8], err: SpanDecodingError) -> Result<FixedBytes<20>, SpanBatchError> {
    if r.len() < 20 {
        return Err(err.into());
    }
    let check = FixedBytes::<20>::from_slice(&r[..20]);
    r.advance(20);
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_batch_prefix_encoding_roundtrip() {
        let expected = SpanBatchPrefix {
            rel_timestamp: 0xFF,
            l1_origin_num: 0xEE,
            parent_check: FixedBytes::repeat_byte(0xDD),
            l1_origin_check: FixedBytes::repeat_byte(0xCC),
        };

        let mut buf = Vec::new();
        expected.encode_prefix(&mut buf);
        assert_eq!(buf.len(), 2 + 2 + 40);
        assert_eq!(SpanBatchPrefix::decode_prefix(&mut buf.as_slice()).unwrap(), expected);
    }

    #[test]
    fn test_truncated_prefix() {
        let mut buf = Vec::new();
        SpanBatchPrefix::default().encode_prefix(&mut buf);
        buf.truncate(30);
        let err = SpanBatchPrefix::decode_prefix(&mut buf.as_slice()).unwrap_err();
        assert_eq!(err, SpanBatchError::Decoding(SpanDecodingError::L1OriginCheck));
    }
}
