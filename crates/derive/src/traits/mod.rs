//! This module contains all of the traits describing functionality of portions of the derivation
//! pipeline.

mod stages;
pub use stages::PurgeableStage;
