//! This module contains the legacy transaction data type for a span batch.

use alloy_primitives::{Bytes, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// The transaction data for a legacy transaction within a span batch.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct SpanBatchLegacyTransactionData {
    /// The ETH value of the transaction.
    pub value: U256,
    /// The gas price of the transaction.
    pub gas_price: U256,
    /// Transaction calldata.
    pub data: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::span_batch::SpanBatchTransactionData;

    #[test]
    fn encode_legacy_tx_data_roundtrip() {
        let legacy_tx = SpanBatchLegacyTransactionData {
            value: U256::from(0xFF),
            gas_price: U256::from(0xEE),
            data: Bytes::from(vec![0x01, 0x02, 0x03]),
        };

        let mut encoded_buf = Vec::new();
        SpanBatchTransactionData::Legacy(legacy_tx.clone()).encode(&mut encoded_buf);
        assert!(encoded_buf[0] >= 0xC0);

        let decoded = SpanBatchTransactionData::decode(&mut encoded_buf.as_slice()).unwrap();
        assert_eq!(decoded, SpanBatchTransactionData::Legacy(legacy_tx));
    }
}
