//! Error types for the derivation pipeline.

mod pipeline;
pub use pipeline::{PipelineError, PipelineErrorKind, PipelineResult};

mod stages;
pub use stages::{BatchDecodingError, CompressionError, FrameError};

pub use crate::batch::{SpanBatchError, SpanDecodingError};
