//! Mock upstream stages, each replaying a fixed list of results in order.

use crate::{
    channel::Channel,
    errors::PipelineResult,
    frame::Frame,
    stages::{BatchProvider, ChannelProvider, DerivedBatch, FrameProvider},
    traits::PurgeableStage,
};

macro_rules! test_provider {
    ($(#[$doc:meta])* $name:ident, $item:ty, $trait:ident :: $method:ident) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            /// The results left to return, last one first.
            pub items: Vec<PipelineResult<$item>>,
            /// Whether the stage was purged.
            pub purged: bool,
        }

        impl $name {
            #[doc = concat!("Creates a new [", stringify!($name), "] returning `items` in order.")]
            pub fn new(mut items: Vec<PipelineResult<$item>>) -> Self {
                items.reverse();
                Self { items, purged: false }
            }
        }

        impl $trait for $name {
            fn $method(&mut self) -> PipelineResult<Option<$item>> {
                self.items.pop().transpose()
            }
        }

        impl PurgeableStage for $name {
            fn purge(&mut self) {
                self.items.clear();
                self.purged = true;
            }
        }
    };
}

test_provider!(
    /// A mock [FrameProvider] returning the frames of one batcher transaction per call.
    TestFrameProvider,
    Vec<Frame>,
    FrameProvider::next_frames
);

test_provider!(
    /// A mock [ChannelProvider].
    TestChannelProvider,
    Channel,
    ChannelProvider::next_channel
);

test_provider!(
    /// A mock [BatchProvider].
    TestBatchProvider,
    DerivedBatch,
    BatchProvider::next_batch
);
