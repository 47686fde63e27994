//! This module contains the [Frame] type and the [FrameDecoder] used to split batcher
//! transactions into frames.

use crate::{
    ensure,
    errors::FrameError,
    params::{ChannelId, BASE_FRAME_LEN, CHANNEL_ID_LENGTH, DERIVATION_VERSION_0, FRAME_OVERHEAD},
};
use alloy_primitives::Bytes;

/// A channel frame is a segment of a channel's data.
///
/// *Encoding*
/// frame = `channel_id ++ frame_number ++ frame_data_length ++ frame_data ++ is_last`
/// * channel_id        = bytes16
/// * frame_number      = uint16
/// * frame_data_length = uint32
/// * frame_data        = bytes
/// * is_last           = bool
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// The identifier of the channel this frame belongs to.
    pub id: ChannelId,
    /// The number of the frame within its channel.
    pub number: u16,
    /// The data within the frame.
    pub data: Bytes,
    /// Whether or not the frame is the last in the sequence.
    pub is_last: bool,
    /// The number of the L1 block that included the batcher transaction carrying this frame.
    pub l1_inclusion_block: u64,
}

impl Frame {
    /// Encode the frame into a byte vector.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(BASE_FRAME_LEN + self.data.len());
        encoded.extend_from_slice(&self.id);
        encoded.extend_from_slice(&self.number.to_be_bytes());
        encoded.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        encoded.extend_from_slice(&self.data);
        encoded.push(self.is_last as u8);
        encoded
    }

    /// Decode a single frame from the front of `encoded`.
    ///
    /// Returns the number of bytes consumed alongside the frame.
    pub fn decode(encoded: &[u8], l1_inclusion_block: u64) -> Result<(usize, Self), FrameError> {
        if encoded.len() < BASE_FRAME_LEN {
            return Err(FrameError::TooShort(encoded.len()));
        }

        let mut id = ChannelId::default();
        id.copy_from_slice(&encoded[..CHANNEL_ID_LENGTH]);
        let number = u16::from_be_bytes([encoded[16], encoded[17]]);
        let data_len =
            u32::from_be_bytes([encoded[18], encoded[19], encoded[20], encoded[21]]) as usize;

        let data_end = 22usize.saturating_add(data_len);
        if data_end >= encoded.len() {
            return Err(FrameError::DataLengthOverrun(data_len, encoded.len() - 22));
        }

        let is_last = match encoded[data_end] {
            0 => false,
            1 => true,
            flag => return Err(FrameError::InvalidIsLast(flag)),
        };
        let data = Bytes::copy_from_slice(&encoded[22..data_end]);

        Ok((data_end + 1, Self { id, number, data, is_last, l1_inclusion_block }))
    }

    /// Parses every frame out of a batcher transaction payload.
    ///
    /// Frames are stored in L1 transactions with the following format:
    /// * `data = DerivationVersion0 ++ Frame(s)` Where there is one or more frames concatenated
    ///   together.
    ///
    /// Fails on the first malformed frame. Use [FrameDecoder] directly to keep the frames that
    /// precede it.
    pub fn parse_frames(encoded: &[u8], l1_inclusion_block: u64) -> Result<Vec<Self>, FrameError> {
        FrameDecoder::new(encoded, l1_inclusion_block)?.collect()
    }

    /// Calculates the size of the frame + overhead for storing the frame. The sum of the frame size
    /// of each frame in a channel determines the channel's size. The sum of the channel sizes
    /// is used for pruning & compared against the max channel size.
    pub fn size(&self) -> usize {
        self.data.len() + FRAME_OVERHEAD
    }
}

/// Encodes a batcher transaction payload carrying the given frames.
pub fn encode_frames<'a>(frames: impl IntoIterator<Item = &'a Frame>) -> Bytes {
    let mut encoded = vec![DERIVATION_VERSION_0];
    for frame in frames {
        encoded.extend_from_slice(&frame.encode());
    }
    encoded.into()
}

/// An iterator over the frames of one batcher transaction payload.
///
/// Yields frames until the payload is exhausted. After yielding an error it yields nothing more,
/// since the remaining bytes can no longer be framed.
#[derive(Debug)]
pub struct FrameDecoder<'a> {
    data: &'a [u8],
    offset: usize,
    l1_inclusion_block: u64,
    failed: bool,
}

impl<'a> FrameDecoder<'a> {
    /// Checks the version byte and returns a decoder positioned at the first frame.
    pub fn new(encoded: &'a [u8], l1_inclusion_block: u64) -> Result<Self, FrameError> {
        let (version, data) = encoded.split_first().ok_or(FrameError::Empty)?;
        ensure!(*version == DERIVATION_VERSION_0, FrameError::UnsupportedVersion(*version));
        ensure!(!data.is_empty(), FrameError::Empty);
        Ok(Self { data, offset: 0, l1_inclusion_block, failed: false })
    }

    /// Returns the next unread offset into the frame data, excluding the version byte.
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for FrameDecoder<'_> {
    type Item = Result<Frame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }
        match Frame::decode(&self.data[self.offset..], self.l1_inclusion_block) {
            Ok((consumed, frame)) => {
                self.offset += consumed;
                Some(Ok(frame))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(number: u16, data: &[u8], is_last: bool) -> Frame {
        Frame {
            id: [0xFF; 16],
            number,
            data: Bytes::copy_from_slice(data),
            is_last,
            l1_inclusion_block: 7,
        }
    }

    #[test]
    fn test_encode_frame_roundtrip() {
        let frame = frame(0xEE, &[0xDD; 50], true);
        let encoded = frame.encode();
        let (consumed, decoded) = Frame::decode(&encoded, 7).unwrap();
        assert_eq!(consumed, encoded.len());
        assert_eq!(frame, decoded);
    }

    #[test]
    fn test_decode_many() {
        let frame = frame(0xEE, &[0xDD; 50], true);
        let bytes = encode_frames(std::iter::repeat(&frame).take(5));

        let frames = Frame::parse_frames(&bytes, 7).unwrap();
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| *f == frame));
    }

    #[test]
    fn test_decode_too_short() {
        let err = Frame::decode(&[0u8; BASE_FRAME_LEN - 1], 0).unwrap_err();
        assert_eq!(err, FrameError::TooShort(BASE_FRAME_LEN - 1));
    }

    #[test]
    fn test_decode_length_overrun() {
        let mut encoded = frame(0, &[1, 2, 3], false).encode();
        encoded[21] = 4;
        let err = Frame::decode(&encoded, 0).unwrap_err();
        assert_eq!(err, FrameError::DataLengthOverrun(4, 4));
    }

    #[test]
    fn test_decode_bad_is_last() {
        let mut encoded = frame(0, &[1], false).encode();
        *encoded.last_mut().unwrap() = 2;
        assert_eq!(Frame::decode(&encoded, 0).unwrap_err(), FrameError::InvalidIsLast(2));
    }

    #[test]
    fn test_parse_frames_rejects_version_and_empty() {
        assert_eq!(Frame::parse_frames(&[], 0).unwrap_err(), FrameError::Empty);
        assert_eq!(Frame::parse_frames(&[0], 0).unwrap_err(), FrameError::Empty);
        assert_eq!(Frame::parse_frames(&[1, 2], 0).unwrap_err(), FrameError::UnsupportedVersion(1));
    }

    #[test]
    fn test_decoder_keeps_frames_before_malformed() {
        let first = frame(0, &[0xAA; 4], false);
        let mut bytes = encode_frames([&first]).to_vec();
        bytes.extend_from_slice(&[0u8; 10]);

        let mut decoder = FrameDecoder::new(&bytes, 7).unwrap();
        assert_eq!(decoder.next(), Some(Ok(first.clone())));
        assert_eq!(decoder.offset(), first.encode().len());
        assert_eq!(decoder.next(), Some(Err(FrameError::TooShort(10))));
        assert_eq!(decoder.next(), None);
    }

    #[test]
    fn test_frame_size() {
        assert_eq!(frame(0, &[0; 10], false).size(), 10 + FRAME_OVERHEAD);
    }

    proptest! {
        #[test]
        fn test_frame_bytes_roundtrip(
            id in any::<[u8; 16]>(),
            number in any::<u16>(),
            data in proptest::collection::vec(any::<u8>(), 0..512),
            is_last in any::<bool>(),
        ) {
            let mut bytes = id.to_vec();
            bytes.extend_from_slice(&number.to_be_bytes());
            bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
            bytes.extend_from_slice(&data);
            bytes.push(is_last as u8);

            let (consumed, frame) = Frame::decode(&bytes, 0).unwrap();
            prop_assert_eq!(consumed, bytes.len());
            prop_assert_eq!(frame.encode(), bytes);
        }

        #[test]
        fn test_truncated_frame_is_malformed(
            data in proptest::collection::vec(any::<u8>(), 0..64),
            cut in 1usize..64,
        ) {
            let encoded = frame(1, &data, true).encode();
            let cut = cut.min(encoded.len());
            prop_assert!(Frame::decode(&encoded[..encoded.len() - cut], 0).is_err());
        }
    }
}
