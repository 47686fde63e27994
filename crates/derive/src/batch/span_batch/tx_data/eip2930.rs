//! This module contains the eip2930 transaction data type for a span batch.

use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Bytes, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// The transaction data for an EIP-2930 transaction within a span batch.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct SpanBatchEip2930TransactionData {
    /// The ETH value of the transaction.
    pub value: U256,
    /// The gas price of the transaction.
    pub gas_price: U256,
    /// Transaction calldata.
    pub data: Bytes,
    /// Access list, used to pre-warm storage slots through static declaration.
    pub access_list: AccessList,
}
