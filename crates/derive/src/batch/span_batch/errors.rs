//! Span Batch Errors

use thiserror::Error;

/// Span Batch Errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanBatchError {
    /// A section of the span batch exceeds the size ceiling.
    #[error("The span batch is too big")]
    TooBigSpanBatchSize,
    /// The bit field has bits set beyond its length.
    #[error("The bit field is too long")]
    BitfieldTooLong,
    /// The span batch has no blocks.
    #[error("Empty Span Batch")]
    EmptySpanBatch,
    /// The origin bits decrement the L1 origin number below zero.
    #[error("L1 origin number underflow")]
    L1OriginUnderflow,
    /// A block timestamp does not fit in a u64.
    #[error("Span batch timestamp overflow")]
    TimestampOverflow,
    /// A protected transaction is signed for another chain.
    #[error("Transaction chain id {0} does not match the chain id {1}")]
    ChainIdMismatch(u64, u64),
    /// A span batch section could not be decoded.
    #[error("Decoding error: {0}")]
    Decoding(#[from] SpanDecodingError),
}

/// Decoding Error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanDecodingError {
    /// Failed to decode relative timestamp
    #[error("Failed to decode relative timestamp")]
    RelativeTimestamp,
    /// Failed to decode L1 origin number
    #[error("Failed to decode L1 origin number")]
    L1OriginNumber,
    /// Failed to decode parent check
    #[error("Failed to decode parent check")]
    ParentCheck,
    /// Failed to decode L1 origin check
    #[error("Failed to decode L1 origin check")]
    L1OriginCheck,
    /// Failed to decode block count
    #[error("Failed to decode block count")]
    BlockCount,
    /// Failed to decode block tx counts
    #[error("Failed to decode block tx counts")]
    BlockTxCounts,
    /// A bitlist is shorter than its declared length
    #[error("Failed to decode bitlist")]
    Bitlist,
    /// Failed to decode transaction signatures
    #[error("Failed to decode transaction signatures")]
    TxSigs,
    /// Failed to decode transaction `to` addresses
    #[error("Failed to decode transaction to addresses")]
    TxTos,
    /// Failed to decode transaction nonces
    #[error("Failed to decode transaction nonces")]
    TxNonces,
    /// Failed to decode transaction gas limits
    #[error("Failed to decode transaction gas limits")]
    TxGases,
    /// Invalid transaction type
    #[error("Invalid transaction type: {0:#04x}")]
    InvalidTransactionType(u8),
    /// Invalid transaction data
    #[error("Invalid transaction data")]
    InvalidTransactionData,
    /// Invalid transaction signature
    #[error("Invalid transaction signature")]
    InvalidTransactionSignature,
}
