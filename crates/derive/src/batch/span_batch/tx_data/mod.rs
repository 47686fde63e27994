//! Contains the transaction data types carried by a span batch.

mod legacy;
pub use legacy::SpanBatchLegacyTransactionData;

mod eip2930;
pub use eip2930::SpanBatchEip2930TransactionData;

mod eip1559;
pub use eip1559::SpanBatchEip1559TransactionData;

mod wrapper;
pub use wrapper::{SpanBatchTransactionData, TxType};
