//! This module contains derivation errors thrown within the pipeline.

use alloy_primitives::B256;
use rollup_primitives::block_info::L1BlockInfoError;

/// [crate::ensure] is a short-hand for bubbling up errors in the case of a condition not being met.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

/// A result type for the derivation pipeline stages.
pub type PipelineResult<T> = Result<T, PipelineErrorKind>;

/// A top level filter for [PipelineError] that sorts by severity.
///
/// Malformed frames, channels and batches never surface here: they are logged and skipped where
/// they are found. Only conditions that need the caller's attention do.
#[derive(derive_more::Display, Debug, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// The pipeline cannot make progress until more L1 or L2 state is known. Retrying after the
    /// state advances resumes where it left off.
    #[display("Temporary error: {_0}")]
    Temporary(PipelineError),
    /// An internal invariant was violated.
    #[display("Critical error: {_0}")]
    Critical(PipelineError),
}

impl std::error::Error for PipelineErrorKind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Temporary(err) | Self::Critical(err) => Some(err),
        }
    }
}

impl PipelineErrorKind {
    /// Returns true if the error is [PipelineErrorKind::Critical].
    pub const fn is_critical(&self) -> bool {
        matches!(self, Self::Critical(_))
    }
}

/// An error encountered during the processing.
#[derive(derive_more::Display, Debug, PartialEq, Eq)]
pub enum PipelineError {
    /// The L1 info for an epoch is not in the state yet.
    #[display("Missing L1 info for epoch {_0}")]
    MissingL1Info(B256),
    /// The L2 block preceding a batch is not in the state yet.
    #[display("Missing L2 parent block at timestamp {_0}")]
    MissingL2Parent(u64),
    /// The L1 block for an epoch number is not in the state yet.
    #[display("Missing epoch {_0}")]
    MissingEpoch(u64),
    /// The pending channels exceed their size budget with none left to evict.
    #[display("Pending channels exceed the size budget but none are left to prune")]
    PruneEmptyChannelSet,
    /// An accepted batch was not found in the batch buffer.
    #[display("Accepted batch at timestamp {_0} disappeared from the buffer")]
    MissingAcceptedBatch(u64),
    /// The L1 info transaction could not be built.
    #[display("L1 info transaction error: {_0}")]
    L1BlockInfo(L1BlockInfoError),
}

impl From<L1BlockInfoError> for PipelineError {
    fn from(err: L1BlockInfoError) -> Self {
        Self::L1BlockInfo(err)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::L1BlockInfo(err) => Some(err),
            _ => None,
        }
    }
}

impl PipelineError {
    /// Wrap [PipelineError] as a [PipelineErrorKind::Critical].
    pub const fn crit(self) -> PipelineErrorKind {
        PipelineErrorKind::Critical(self)
    }

    /// Wrap [PipelineError] as a [PipelineErrorKind::Temporary].
    pub const fn temp(self) -> PipelineErrorKind {
        PipelineErrorKind::Temporary(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_pipeline_error_kind_source() {
        let err = PipelineErrorKind::Temporary(PipelineError::MissingL2Parent(0));
        assert!(err.source().is_some());
        assert!(!err.is_critical());
        let err = PipelineErrorKind::Critical(PipelineError::PruneEmptyChannelSet);
        assert!(err.source().is_some());
        assert!(err.is_critical());
    }

    #[test]
    fn test_pipeline_error_source() {
        let err: PipelineError = L1BlockInfoError::UnknownScalarVersion(2).into();
        assert!(err.source().is_some());
        let err = PipelineError::MissingAcceptedBatch(10);
        assert!(err.source().is_none());
    }

    #[test]
    fn test_pipeline_error_kinds() {
        assert_eq!(
            PipelineError::MissingL2Parent(4).temp(),
            PipelineErrorKind::Temporary(PipelineError::MissingL2Parent(4))
        );
        assert_eq!(
            PipelineError::PruneEmptyChannelSet.crit(),
            PipelineErrorKind::Critical(PipelineError::PruneEmptyChannelSet)
        );
        assert_eq!(
            PipelineError::MissingL2Parent(4).temp().to_string(),
            "Temporary error: Missing L2 parent block at timestamp 4"
        );
    }
}
