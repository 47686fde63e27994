//! Contains the [BatchValidity] and its encodings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The status of a buffered batch against the current chain state.
///
/// A status is recomputed on every check and never cached: an [BatchValidity::Undecided] or
/// [BatchValidity::Future] batch may become acceptable once more L1 data is known.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchValidity {
    /// The batch is invalid now and in the future, unless we reorg
    Drop,
    /// The batch is valid and should be processed
    Accept,
    /// We are lacking L1 information until we can proceed batch filtering
    Undecided,
    /// The batch may be valid, but cannot be processed yet and should be checked again later
    Future,
}

impl BatchValidity {
    /// Returns if the batch is accepted.
    pub const fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }

    /// Returns if the batch is dropped.
    pub const fn is_drop(&self) -> bool {
        matches!(self, Self::Drop)
    }

    /// Returns if the batch is future.
    pub const fn is_future(&self) -> bool {
        matches!(self, Self::Future)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_serde_batch_validity() {
        let json = serde_json::to_string(&BatchValidity::Undecided).unwrap();
        assert_eq!(json, r#""Undecided""#);
        let validity: BatchValidity = serde_json::from_str(r#""Future""#).unwrap();
        assert!(validity.is_future());
    }
}
