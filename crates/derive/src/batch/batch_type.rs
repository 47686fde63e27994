//! Contains the [BatchType] and its encodings.

use crate::errors::BatchDecodingError;

/// The single batch type identifier.
pub(crate) const SINGLE_BATCH_TYPE: u8 = 0x00;

/// The span batch type identifier.
pub(crate) const SPAN_BATCH_TYPE: u8 = 0x01;

/// The Batch Type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BatchType {
    /// Single Batch.
    Single = SINGLE_BATCH_TYPE,
    /// Span Batch.
    Span = SPAN_BATCH_TYPE,
}

impl TryFrom<u8> for BatchType {
    type Error = BatchDecodingError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            SINGLE_BATCH_TYPE => Ok(Self::Single),
            SPAN_BATCH_TYPE => Ok(Self::Span),
            _ => Err(BatchDecodingError::InvalidBatchType(val)),
        }
    }
}

impl From<BatchType> for u8 {
    fn from(batch_type: BatchType) -> Self {
        batch_type as Self
    }
}
