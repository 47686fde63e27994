//! This module contains the top level span batch transaction data type.

use super::{
    SpanBatchEip1559TransactionData, SpanBatchEip2930TransactionData,
    SpanBatchLegacyTransactionData,
};
use crate::batch::span_batch::{SpanBatchError, SpanDecodingError};
use alloy_rlp::{Buf, Decodable, Encodable, EMPTY_LIST_CODE};

/// The EIP-2718 types a span batch can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TxType {
    /// Untyped legacy transaction.
    Legacy = 0,
    /// EIP-2930 access list transaction.
    Eip2930 = 1,
    /// EIP-1559 dynamic fee transaction.
    Eip1559 = 2,
}

impl TryFrom<u8> for TxType {
    type Error = SpanBatchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Legacy),
            1 => Ok(Self::Eip2930),
            2 => Ok(Self::Eip1559),
            ty => Err(SpanDecodingError::InvalidTransactionType(ty).into()),
        }
    }
}

/// The typed transaction data for a transaction within a span batch.
///
/// Legacy data is a bare RLP list. Typed data is the type byte followed by an RLP list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanBatchTransactionData {
    /// Legacy transaction data.
    Legacy(SpanBatchLegacyTransactionData),
    /// EIP-2930 transaction data.
    Eip2930(SpanBatchEip2930TransactionData),
    /// EIP-1559 transaction data.
    Eip1559(SpanBatchEip1559TransactionData),
}

impl SpanBatchTransactionData {
    /// Returns the transaction type of the [SpanBatchTransactionData].
    pub const fn tx_type(&self) -> TxType {
        match self {
            Self::Legacy(_) => TxType::Legacy,
            Self::Eip2930(_) => TxType::Eip2930,
            Self::Eip1559(_) => TxType::Eip1559,
        }
    }

    /// Encodes the transaction data into a writer.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Legacy(data) => data.encode(out),
            Self::Eip2930(data) => {
                out.push(TxType::Eip2930 as u8);
                data.encode(out);
            }
            Self::Eip1559(data) => {
                out.push(TxType::Eip1559 as u8);
                data.encode(out);
            }
        }
    }

    /// Decodes one transaction data entry from the front of a reader.
    pub fn decode(r: &mut &[u8]) -> Result<Self, SpanBatchError> {
        let first = *r.first().ok_or(SpanDecodingError::InvalidTransactionData)?;
        if first >= EMPTY_LIST_CODE {
            return SpanBatchLegacyTransactionData::decode(r)
                .map(Self::Legacy)
                .map_err(|_| SpanDecodingError::InvalidTransactionData.into());
        }

        let tx_type = TxType::try_from(first)?;
        r.advance(1);
        let data = match tx_type {
            TxType::Eip2930 => SpanBatchEip2930TransactionData::decode(r).map(Self::Eip2930),
            TxType::Eip1559 => SpanBatchEip1559TransactionData::decode(r).map(Self::Eip1559),
            TxType::Legacy => return Err(SpanDecodingError::InvalidTransactionType(first).into()),
        };
        data.map_err(|_| SpanDecodingError::InvalidTransactionData.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_rejected() {
        let err = SpanBatchTransactionData::decode(&mut [0x03u8, 0xC0].as_slice()).unwrap_err();
        assert_eq!(err, SpanBatchError::Decoding(SpanDecodingError::InvalidTransactionType(3)));

        let err = SpanBatchTransactionData::decode(&mut [0x00u8, 0xC0].as_slice()).unwrap_err();
        assert_eq!(err, SpanBatchError::Decoding(SpanDecodingError::InvalidTransactionType(0)));
    }

    #[test]
    fn test_empty_rejected() {
        let err = SpanBatchTransactionData::decode(&mut [].as_slice()).unwrap_err();
        assert_eq!(err, SpanBatchError::Decoding(SpanDecodingError::InvalidTransactionData));
    }

    #[test]
    fn test_tx_type_from_u8() {
        assert_eq!(TxType::try_from(2).unwrap(), TxType::Eip1559);
        assert!(TxType::try_from(0x7E).is_err());
    }
}
