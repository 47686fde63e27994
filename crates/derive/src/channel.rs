//! This module contains the [Channel] produced by channel assembly and the [PendingChannel] it is
//! assembled in.

use crate::{frame::Frame, params::ChannelId};
use alloy_primitives::Bytes;

/// A fully assembled and decompressed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// The channel id.
    pub id: ChannelId,
    /// The decompressed channel data.
    pub data: Bytes,
    /// The highest L1 block that included one of the channel's frames.
    pub l1_inclusion_block: u64,
}

/// A channel whose frames are still arriving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChannel {
    /// The channel id.
    pub id: ChannelId,
    /// The frames received so far, in arrival order.
    frames: Vec<Frame>,
    /// The number of frames, known once the last frame arrives.
    size: Option<u16>,
    /// The highest L1 block that included one of the frames.
    highest_l1_block: u64,
    /// The lowest L1 block that included one of the frames.
    lowest_l1_block: u64,
}

impl PendingChannel {
    /// Opens a channel with its first received frame.
    pub fn new(frame: Frame) -> Self {
        let size = frame.is_last.then(|| frame.number.saturating_add(1));
        Self {
            id: frame.id,
            highest_l1_block: frame.l1_inclusion_block,
            lowest_l1_block: frame.l1_inclusion_block,
            size,
            frames: vec![frame],
        }
    }

    /// Adds a frame to the channel. A frame number that was already received is ignored.
    ///
    /// Returns whether the frame was added.
    pub fn push_frame(&mut self, frame: Frame) -> bool {
        if self.frames.iter().any(|f| f.number == frame.number) {
            return false;
        }
        if frame.is_last {
            self.size = Some(frame.number.saturating_add(1));
        }
        self.highest_l1_block = self.highest_l1_block.max(frame.l1_inclusion_block);
        self.lowest_l1_block = self.lowest_l1_block.min(frame.l1_inclusion_block);
        self.frames.push(frame);
        true
    }

    /// Returns true once every frame up to the last one has arrived.
    pub fn is_ready(&self) -> bool {
        self.size.is_some_and(|size| {
            self.frames.len() == size as usize && self.frames.iter().all(|f| f.number < size)
        })
    }

    /// Returns true if the frames span more than `channel_timeout` L1 blocks.
    pub const fn is_timed_out(&self, channel_timeout: u64) -> bool {
        self.highest_l1_block - self.lowest_l1_block > channel_timeout
    }

    /// Returns the buffered size of the channel, counting the overhead of every frame.
    pub fn size(&self) -> usize {
        self.frames.iter().map(Frame::size).sum()
    }

    /// Returns the highest L1 block that included one of the frames.
    pub const fn l1_inclusion_block(&self) -> u64 {
        self.highest_l1_block
    }

    /// Returns the number of frames received so far.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Concatenates the frame data in frame number order.
    pub fn assemble(mut self) -> Bytes {
        self.frames.sort_by_key(|f| f.number);
        self.frames.iter().flat_map(|f| f.data.iter().copied()).collect::<Vec<u8>>().into()
    }
}
