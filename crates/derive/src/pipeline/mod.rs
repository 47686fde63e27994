//! Module containing the derivation pipeline.

/// Re-export the stage traits.
pub use crate::traits::PurgeableStage;

/// Re-export the types needed to drive a pipeline.
pub use crate::{
    errors::{PipelineError, PipelineErrorKind, PipelineResult},
    stages::{BatcherTransaction, BatcherTransactionSender},
    state::{L1Info, SharedState, State},
};

mod core;
pub use core::{DerivationPipeline, PipelineStages};
