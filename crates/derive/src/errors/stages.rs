//! Error types for derivation pipeline stages.
//!
//! Each of these is local to the item that produced it: the stage logs it, drops the item and
//! carries on with the next one.

use crate::batch::SpanBatchError;
use thiserror::Error;

/// A malformed batcher transaction or frame.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// The batcher transaction carries no data.
    #[error("Empty batcher transaction")]
    Empty,
    /// The batcher transaction has an unsupported derivation version.
    #[error("Unsupported derivation version: {0}")]
    UnsupportedVersion(u8),
    /// Fewer bytes remain than a frame without data requires.
    #[error("Frame too short: {0} bytes remaining")]
    TooShort(usize),
    /// The declared frame data length overruns the buffer.
    #[error("Frame data length {0} overruns the {1} remaining bytes")]
    DataLengthOverrun(usize, usize),
    /// The is-last flag is neither 0 nor 1.
    #[error("Invalid is_last flag: {0}")]
    InvalidIsLast(u8),
}

/// A failure to decompress a channel.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompressionError {
    /// The channel is empty.
    #[error("Empty channel data")]
    Empty,
    /// The first byte names no known compression scheme.
    #[error("Unknown compression type: {0:#04x}")]
    UnknownType(u8),
    /// The zlib stream is corrupt or exceeds the size limit.
    #[error("zlib decompression failed: {0}")]
    Zlib(String),
    /// The Brotli stream is corrupt.
    #[error("Brotli decompression failed: {0}")]
    Brotli(String),
    /// The decompressed channel exceeds the size limit.
    #[error("Decompressed channel exceeds {0} bytes")]
    TooLarge(u64),
}

/// A failure to decode one batch out of a channel.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchDecodingError {
    /// The batch blob is empty.
    #[error("Empty batch data")]
    EmptyBuffer,
    /// The batch type byte is unknown.
    #[error("Invalid batch type: {0}")]
    InvalidBatchType(u8),
    /// The RLP is malformed.
    #[error("RLP error: {0}")]
    Rlp(alloy_rlp::Error),
    /// The span batch is malformed or exceeds its size limits.
    #[error(transparent)]
    SpanBatch(#[from] SpanBatchError),
}

impl From<alloy_rlp::Error> for BatchDecodingError {
    fn from(err: alloy_rlp::Error) -> Self {
        Self::Rlp(err)
    }
}
