//! This module contains the [ChannelAssembler] stage.

use super::{compression::decompress, ChannelProvider};
use crate::{
    channel::{Channel, PendingChannel},
    errors::{PipelineError, PipelineResult},
    frame::Frame,
    params::ChannelId,
    state::SharedState,
    traits::PurgeableStage,
};
use rollup_primitives::prelude::RollupConfig;
use std::{collections::VecDeque, fmt::Debug, sync::Arc};
use tracing::{debug, error, trace, warn};

/// Provides frames for the [ChannelAssembler] stage.
pub trait FrameProvider {
    /// Returns the frames of the next batcher transaction, or `None` if no transaction is
    /// queued. A transaction with no valid frames yields an empty list.
    fn next_frames(&mut self) -> PipelineResult<Option<Vec<Frame>>>;
}

/// The [ChannelAssembler] stage groups [Frame]s by channel id and emits each [Channel] once all of
/// its frames have arrived, decompressed.
///
/// Channels are kept in the order they were opened. A channel whose frames span more L1 blocks
/// than the channel timeout is discarded, and the oldest channels are evicted while the buffered
/// frames exceed the channel size budget.
#[derive(Debug)]
pub struct ChannelAssembler<P>
where
    P: FrameProvider + PurgeableStage + Debug,
{
    /// The rollup configuration.
    cfg: Arc<RollupConfig>,
    /// The previous stage of the derivation pipeline.
    prev: P,
    /// The chain state, consulted for the active L1 timestamp.
    state: SharedState,
    /// Channels still waiting for frames, oldest first.
    pending: VecDeque<PendingChannel>,
    /// Frames pulled from the previous stage but not yet assembled.
    frame_bank: VecDeque<Frame>,
}

impl<P> ChannelAssembler<P>
where
    P: FrameProvider + PurgeableStage + Debug,
{
    /// Creates a new [ChannelAssembler] stage with the given configuration and previous stage.
    pub const fn new(cfg: Arc<RollupConfig>, prev: P, state: SharedState) -> Self {
        Self { cfg, prev, state, pending: VecDeque::new(), frame_bank: VecDeque::new() }
    }

    /// Returns the number of channels waiting for frames.
    pub fn pending_channels(&self) -> usize {
        self.pending.len()
    }

    /// Returns the bytes buffered across all pending channels.
    pub fn buffered_size(&self) -> usize {
        self.pending.iter().map(PendingChannel::size).sum()
    }

    /// Adds a frame to its channel, then discards the channel if it timed out and prunes the
    /// pending set down to the channel size budget.
    pub fn push_frame(&mut self, frame: Frame) -> PipelineResult<()> {
        let l1_timestamp = self.state.snapshot().current_l1_timestamp();
        let id = frame.id;

        let index = match self.pending.iter().position(|c| c.id == id) {
            Some(index) => {
                if !self.pending[index].push_frame(frame) {
                    trace!(target: "channel-assembler", "Ignoring duplicate frame");
                }
                index
            }
            None => {
                trace!(target: "channel-assembler", "Opening channel {}", display_id(&id));
                self.pending.push_back(PendingChannel::new(frame));
                self.pending.len() - 1
            }
        };

        let channel = &self.pending[index];
        if channel.is_timed_out(self.cfg.channel_timeout(l1_timestamp)) {
            warn!(
                target: "channel-assembler",
                "Channel {} timed out with {} frames",
                display_id(&id),
                channel.frame_count()
            );
            self.pending.remove(index);
        }

        self.prune(self.cfg.max_channel_size(l1_timestamp))
    }

    /// Removes the channel with the given id if all of its frames have arrived, returning it
    /// decompressed. A channel that fails to decompress is logged and discarded.
    pub fn fetch_ready(&mut self, id: ChannelId) -> Option<Channel> {
        let index = self.pending.iter().position(|c| c.id == id && c.is_ready())?;
        let channel = self.pending.remove(index)?;
        let l1_timestamp = self.state.snapshot().current_l1_timestamp();
        self.decompress(channel, l1_timestamp)
    }

    /// Evicts the oldest channels until the buffered frames fit within `max_size` bytes.
    fn prune(&mut self, max_size: u64) -> PipelineResult<()> {
        let mut total_size = self.buffered_size() as u64;
        while total_size > max_size {
            let Some(channel) = self.pending.pop_front() else {
                error!(target: "channel-assembler", "No channel left to prune");
                return Err(PipelineError::PruneEmptyChannelSet.crit());
            };
            debug!(
                target: "channel-assembler",
                "Pruning channel {} of {} bytes",
                display_id(&channel.id),
                channel.size()
            );
            total_size -= channel.size() as u64;
        }
        Ok(())
    }

    fn decompress(&self, channel: PendingChannel, l1_timestamp: u64) -> Option<Channel> {
        let id = channel.id;
        let l1_inclusion_block = channel.l1_inclusion_block();
        let max_size = self.cfg.max_rlp_bytes_per_channel(l1_timestamp);

        match decompress(&channel.assemble(), max_size) {
            Ok(data) => {
                debug!(
                    target: "channel-assembler",
                    "Assembled channel {} of {} bytes",
                    display_id(&id),
                    data.len()
                );
                Some(Channel { id, data: data.into(), l1_inclusion_block })
            }
            Err(e) => {
                warn!(
                    target: "channel-assembler",
                    "Discarding channel {}: {e}",
                    display_id(&id)
                );
                None
            }
        }
    }
}

impl<P> ChannelProvider for ChannelAssembler<P>
where
    P: FrameProvider + PurgeableStage + Debug,
{
    fn next_channel(&mut self) -> PipelineResult<Option<Channel>> {
        loop {
            while let Some(frame) = self.frame_bank.pop_front() {
                let id = frame.id;
                self.push_frame(frame)?;
                if let Some(channel) = self.fetch_ready(id) {
                    return Ok(Some(channel));
                }
            }
            match self.prev.next_frames()? {
                Some(frames) => self.frame_bank.extend(frames),
                None => return Ok(None),
            }
        }
    }
}

impl<P> PurgeableStage for ChannelAssembler<P>
where
    P: FrameProvider + PurgeableStage + Debug,
{
    fn purge(&mut self) {
        self.pending.clear();
        self.frame_bank.clear();
        self.prev.purge();
    }
}

fn display_id(id: &ChannelId) -> alloy_primitives::FixedBytes<16> {
    (*id).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        stages::compression::compress_zlib,
        test_utils::{
            test_config, test_state, test_state_with_config, CollectingLayer, TestFrameProvider,
            TraceStorage,
        },
    };
    use alloy_primitives::Bytes;
    use proptest::prelude::*;
    use rollup_primitives::prelude::RollupConfig;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    fn frame(id: u8, number: u16, data: &[u8], is_last: bool, l1: u64) -> Frame {
        Frame {
            id: [id; 16],
            number,
            data: Bytes::copy_from_slice(data),
            is_last,
            l1_inclusion_block: l1,
        }
    }

    fn assembler(frames: Vec<Vec<Frame>>) -> ChannelAssembler<TestFrameProvider> {
        assembler_with_config(test_config(), frames)
    }

    fn assembler_with_config(
        cfg: RollupConfig,
        frames: Vec<Vec<Frame>>,
    ) -> ChannelAssembler<TestFrameProvider> {
        let state = SharedState::new(test_state_with_config(cfg, 0, 10));
        let cfg = Arc::new(state.snapshot().config().clone());
        let provider = TestFrameProvider::new(frames.into_iter().map(Ok).collect());
        ChannelAssembler::new(cfg, provider, state)
    }

    /// A frame whose data is a slice of a shared zeroed buffer.
    fn large_frame(data: &Bytes, id: u8, number: u16, len: usize, is_last: bool) -> Frame {
        Frame { id: [id; 16], number, data: data.slice(..len), is_last, l1_inclusion_block: 1 }
    }

    #[test]
    fn test_assemble_two_frames_either_order() {
        let payload = b"some batches".repeat(4);
        let compressed = compress_zlib(&payload);
        let (head, tail) = compressed.split_at(compressed.len() / 2);

        for reversed in [false, true] {
            let mut frames = vec![frame(1, 0, head, false, 3), frame(1, 1, tail, true, 4)];
            if reversed {
                frames.reverse();
            }
            let mut stage = assembler(vec![frames]);
            let channel = stage.next_channel().unwrap().unwrap();
            assert_eq!(channel.id, [1; 16]);
            assert_eq!(channel.data, Bytes::from(payload.clone()));
            assert_eq!(channel.l1_inclusion_block, 4);
            assert_eq!(stage.pending_channels(), 0);
            assert_eq!(stage.next_channel().unwrap(), None);
        }
    }

    #[test]
    fn test_frames_across_transactions() {
        let compressed = compress_zlib(b"abc");
        let (head, tail) = compressed.split_at(2);
        let mut stage = assembler(vec![
            vec![frame(2, 0, head, false, 1)],
            vec![],
            vec![frame(2, 1, tail, true, 2)],
        ]);
        let channel = stage.next_channel().unwrap().unwrap();
        assert_eq!(channel.data, Bytes::from_static(b"abc"));
    }

    #[test]
    fn test_interleaved_channels() {
        let a = compress_zlib(b"channel a");
        let b = compress_zlib(b"channel b");
        let mut stage = assembler(vec![vec![
            frame(0xa, 0, &a[..3], false, 1),
            frame(0xb, 0, &b, true, 1),
            frame(0xa, 1, &a[3..], true, 1),
        ]]);
        assert_eq!(stage.next_channel().unwrap().unwrap().id, [0xb; 16]);
        assert_eq!(stage.next_channel().unwrap().unwrap().id, [0xa; 16]);
        assert_eq!(stage.next_channel().unwrap(), None);
    }

    #[test]
    fn test_duplicate_frames_idempotent() {
        let compressed = compress_zlib(b"dup");
        let (head, tail) = compressed.split_at(1);
        let mut stage = assembler(vec![]);
        stage.push_frame(frame(3, 0, head, false, 1)).unwrap();
        assert_eq!(stage.fetch_ready([3; 16]), None);
        let size = stage.buffered_size();
        stage.push_frame(frame(3, 0, head, false, 1)).unwrap();
        assert_eq!(stage.buffered_size(), size);
        stage.push_frame(frame(3, 1, tail, true, 1)).unwrap();
        let channel = stage.fetch_ready([3; 16]).unwrap();
        assert_eq!(channel.data, Bytes::from_static(b"dup"));
        assert_eq!(stage.pending_channels(), 0);
    }

    #[test]
    fn test_channel_timeout() {
        let storage = TraceStorage::default();
        let layer = CollectingLayer::new(storage.clone());
        let subscriber = tracing_subscriber::Registry::default().with(layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        let compressed = compress_zlib(b"late");
        let mut stage = assembler(vec![]);
        stage.push_frame(frame(4, 0, &compressed[..2], false, 1)).unwrap();
        // The test chain times channels out after 30 L1 blocks.
        stage.push_frame(frame(4, 1, &compressed[2..], true, 32)).unwrap();
        assert_eq!(stage.pending_channels(), 0);
        assert_eq!(stage.fetch_ready([4; 16]), None);

        let warns = storage.get_by_level(Level::WARN);
        assert_eq!(warns.len(), 1);
        assert!(warns[0].contains("timed out"));
    }

    #[test]
    fn test_bad_compression_discards_channel() {
        let mut stage = assembler(vec![vec![frame(5, 0, &[0x02, 0x00], true, 1)]]);
        assert_eq!(stage.next_channel().unwrap(), None);
        assert_eq!(stage.pending_channels(), 0);
    }

    #[test]
    fn test_prune_oldest_first() {
        let mut stage = assembler(vec![]);
        for id in 1..=3 {
            stage.push_frame(frame(id, 0, &[0u8; 100], false, 1)).unwrap();
        }
        let per_channel = 100 + crate::params::FRAME_OVERHEAD as u64;
        stage.prune(2 * per_channel).unwrap();
        assert_eq!(stage.pending_channels(), 2);
        assert!(stage.buffered_size() as u64 <= 2 * per_channel);
        assert!(stage.pending.iter().all(|c| c.id != [1; 16]));

        stage.prune(0).unwrap();
        assert_eq!(stage.pending_channels(), 0);
    }

    #[test]
    fn test_channel_size_budget_follows_fjord() {
        let data = Bytes::from(vec![0u8; 40_000_000]);
        // The test chain's L1 head is block 10, at timestamp 60.
        let pre_fjord = RollupConfig { fjord_time: Some(61), ..test_config() };
        let post_fjord = RollupConfig { fjord_time: Some(60), ..test_config() };

        for (cfg, kept) in [(pre_fjord, 2), (post_fjord, 3)] {
            let mut stage = assembler_with_config(cfg, vec![]);
            for id in 1..=3 {
                stage.push_frame(large_frame(&data, id, 0, data.len(), false)).unwrap();
            }
            assert_eq!(stage.pending_channels(), kept);
            assert_eq!(stage.pending.back().map(|c| c.id), Some([3; 16]));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_push_frame_stays_within_budget(
            frames in proptest::collection::vec(
                (0u8..4, 0u16..4, 0usize..60_000_000, any::<bool>()),
                1..24,
            ),
        ) {
            let data = Bytes::from(vec![0u8; 60_000_000]);
            let mut stage = assembler(vec![]);
            let budget = stage.cfg.max_channel_size(stage.state.snapshot().current_l1_timestamp());
            for (id, number, len, is_last) in frames {
                stage.push_frame(large_frame(&data, id, number, len, is_last)).unwrap();
                prop_assert!(stage.buffered_size() as u64 <= budget);
            }
        }
    }

    #[test]
    fn test_purge() {
        let mut stage = assembler(vec![vec![frame(6, 0, &[1], false, 1)], vec![]]);
        assert_eq!(stage.next_channel().unwrap(), None);
        assert_eq!(stage.pending_channels(), 1);
        stage.purge();
        assert_eq!(stage.pending_channels(), 0);
        assert!(stage.prev.purged);
    }
}
