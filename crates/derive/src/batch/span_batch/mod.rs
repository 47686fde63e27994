//! Contains all Span Batch types and logic.
//!
//! ## Batch format
//!
//! ```text
//! [SPAN_BATCH_TYPE] = 1
//! span_batch = [SPAN_BATCH_TYPE] ++ prefix ++ payload
//! prefix = rel_timestamp ++ l1_origin_num ++ parent_check ++ l1_origin_check
//! payload = block_count ++ origin_bits ++ block_tx_counts ++ txs
//! txs = contract_creation_bits ++ y_parity_bits ++ tx_sigs ++ tx_tos ++ tx_datas ++ tx_nonces ++ tx_gases ++ protected_bits
//! ```
//!
//! Bitlists are big-endian integers padded to a byte boundary: bit `i` lives in byte
//! `len - 1 - i / 8`.

mod batch;
pub use batch::SpanBatch;
pub(crate) use batch::has_invalid_transactions;

mod bits;
pub use bits::SpanBatchBits;

mod element;
pub use element::SpanBatchElement;

mod errors;
pub use errors::{SpanBatchError, SpanDecodingError};

mod payload;
pub use payload::SpanBatchPayload;

mod prefix;
pub use prefix::SpanBatchPrefix;

mod raw;
pub use raw::RawSpanBatch;

mod signature;
pub use signature::SpanBatchSignature;

mod signed;
pub use signed::SignedTransaction;

mod transactions;
pub use transactions::SpanBatchTransactions;

mod tx_data;
pub use tx_data::{
    SpanBatchEip1559TransactionData, SpanBatchEip2930TransactionData,
    SpanBatchLegacyTransactionData, SpanBatchTransactionData, TxType,
};
