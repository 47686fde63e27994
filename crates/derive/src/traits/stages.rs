//! This module contains common traits for stages within the derivation pipeline.

/// Describes a stage that can drop everything it buffered.
///
/// Purging a stage purges every stage before it, so purging the last stage resets the whole
/// pipeline. The pipeline is purged when the L1 chain it follows reorgs.
pub trait PurgeableStage {
    /// Drops the buffered state of this stage and every stage before it.
    fn purge(&mut self);
}
