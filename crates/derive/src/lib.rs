#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(any(test, feature = "test-utils")), warn(unused_crate_dependencies))]

/// Re-export commonly used types and traits.
pub mod prelude {
    pub use crate::{
        batch::{Batch, BatchValidity, SingleBatch, SpanBatch},
        channel::Channel,
        errors::{PipelineError, PipelineErrorKind, PipelineResult},
        frame::{Frame, FrameDecoder},
        pipeline::DerivationPipeline,
        stages::{BatcherTransaction, BatcherTransactionSender, DerivedBatch},
        state::{L1Info, SharedState, State},
        traits::PurgeableStage,
    };
}

pub mod batch;
pub mod channel;
pub mod errors;
pub mod frame;
pub mod params;
pub mod pipeline;
pub mod stages;
pub mod state;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
