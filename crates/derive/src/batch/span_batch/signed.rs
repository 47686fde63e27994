//! This module contains [SignedTransaction], the EIP-2718 envelope codec for the transaction
//! types a span batch can carry.

use super::{
    signature::{REPLAY_PROTECTED_V_BASE, REPLAY_UNPROTECTED_V_BASE},
    SpanBatchEip1559TransactionData, SpanBatchEip2930TransactionData, SpanBatchError,
    SpanBatchLegacyTransactionData, SpanBatchSignature, SpanBatchTransactionData,
    SpanDecodingError, TxType,
};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::{Buf, Decodable, Encodable, Header, EMPTY_LIST_CODE, EMPTY_STRING_CODE};

/// A signed transaction split into the fields a span batch stores separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The chain id. `None` only for unprotected legacy transactions.
    pub chain_id: Option<u64>,
    /// The sender nonce.
    pub nonce: u64,
    /// The gas limit.
    pub gas_limit: u64,
    /// The recipient, `None` for contract creations.
    pub to: Option<Address>,
    /// The signature.
    pub signature: SpanBatchSignature,
    /// The type specific fields.
    pub data: SpanBatchTransactionData,
}

impl SignedTransaction {
    /// Returns the transaction type.
    pub const fn tx_type(&self) -> TxType {
        self.data.tx_type()
    }

    /// Returns true if the signature commits to a chain id.
    pub const fn is_protected(&self) -> bool {
        self.chain_id.is_some()
    }

    /// Encodes the transaction in its EIP-2718 form.
    pub fn encode_2718(&self) -> Bytes {
        let mut fields = Vec::new();
        match &self.data {
            SpanBatchTransactionData::Legacy(tx) => {
                self.nonce.encode(&mut fields);
                tx.gas_price.encode(&mut fields);
                self.gas_limit.encode(&mut fields);
                encode_to(self.to, &mut fields);
                tx.value.encode(&mut fields);
                tx.data.encode(&mut fields);
                self.signature.legacy_v(self.chain_id).encode(&mut fields);
            }
            SpanBatchTransactionData::Eip2930(tx) => {
                self.chain_id.unwrap_or_default().encode(&mut fields);
                self.nonce.encode(&mut fields);
                tx.gas_price.encode(&mut fields);
                self.gas_limit.encode(&mut fields);
                encode_to(self.to, &mut fields);
                tx.value.encode(&mut fields);
                tx.data.encode(&mut fields);
                tx.access_list.encode(&mut fields);
                self.signature.y_parity.encode(&mut fields);
            }
            SpanBatchTransactionData::Eip1559(tx) => {
                self.chain_id.unwrap_or_default().encode(&mut fields);
                self.nonce.encode(&mut fields);
                tx.max_priority_fee_per_gas.encode(&mut fields);
                tx.max_fee_per_gas.encode(&mut fields);
                self.gas_limit.encode(&mut fields);
                encode_to(self.to, &mut fields);
                tx.value.encode(&mut fields);
                tx.data.encode(&mut fields);
                tx.access_list.encode(&mut fields);
                self.signature.y_parity.encode(&mut fields);
            }
        }
        self.signature.r.encode(&mut fields);
        self.signature.s.encode(&mut fields);

        let mut out = Vec::with_capacity(fields.len() + 10);
        if self.tx_type() != TxType::Legacy {
            out.push(self.tx_type() as u8);
        }
        Header { list: true, payload_length: fields.len() }.encode(&mut out);
        out.extend_from_slice(&fields);
        out.into()
    }

    /// Decodes a transaction from its EIP-2718 form.
    pub fn decode_2718(buf: &mut &[u8]) -> Result<Self, SpanBatchError> {
        let first = *buf.first().ok_or(SpanDecodingError::InvalidTransactionData)?;
        if first >= EMPTY_LIST_CODE {
            return Self::decode_legacy(buf);
        }
        let tx_type = TxType::try_from(first)?;
        buf.advance(1);
        Self::decode_typed(buf, tx_type)
    }

    fn decode_legacy(buf: &mut &[u8]) -> Result<Self, SpanBatchError> {
        let mut fields = list_payload(buf)?;
        let fields = &mut fields;
        let nonce = rlp(u64::decode(fields))?;
        let gas_price = rlp(U256::decode(fields))?;
        let gas_limit = rlp(u64::decode(fields))?;
        let to = decode_to(fields)?;
        let value = rlp(U256::decode(fields))?;
        let data = rlp(Bytes::decode(fields))?;
        let v = rlp(u64::decode(fields))?;
        let r = rlp(U256::decode(fields))?;
        let s = rlp(U256::decode(fields))?;
        ensure_consumed(fields)?;

        let (chain_id, y_parity) = match v {
            27 | 28 => (None, v - REPLAY_UNPROTECTED_V_BASE == 1),
            v if v >= REPLAY_PROTECTED_V_BASE => {
                let v = v - REPLAY_PROTECTED_V_BASE;
                (Some(v / 2), v & 1 == 1)
            }
            _ => return Err(SpanDecodingError::InvalidTransactionSignature.into()),
        };

        Ok(Self {
            chain_id,
            nonce,
            gas_limit,
            to,
            signature: SpanBatchSignature { y_parity, r, s },
            data: SpanBatchTransactionData::Legacy(SpanBatchLegacyTransactionData {
                value,
                gas_price,
                data,
            }),
        })
    }

    fn decode_typed(buf: &mut &[u8], tx_type: TxType) -> Result<Self, SpanBatchError> {
        let mut fields = list_payload(buf)?;
        let fields = &mut fields;
        let chain_id = rlp(u64::decode(fields))?;
        let nonce = rlp(u64::decode(fields))?;
        let (fees, gas_limit) = match tx_type {
            TxType::Eip2930 => {
                let gas_price = rlp(U256::decode(fields))?;
                ((gas_price, U256::ZERO), rlp(u64::decode(fields))?)
            }
            _ => {
                let max_priority_fee_per_gas = rlp(U256::decode(fields))?;
                let max_fee_per_gas = rlp(U256::decode(fields))?;
                ((max_priority_fee_per_gas, max_fee_per_gas), rlp(u64::decode(fields))?)
            }
        };
        let to = decode_to(fields)?;
        let value = rlp(U256::decode(fields))?;
        let data = rlp(Bytes::decode(fields))?;
        let access_list = rlp(AccessList::decode(fields))?;
        let y_parity = match rlp(u8::decode(fields))? {
            0 => false,
            1 => true,
            _ => return Err(SpanDecodingError::InvalidTransactionSignature.into()),
        };
        let r = rlp(U256::decode(fields))?;
        let s = rlp(U256::decode(fields))?;
        ensure_consumed(fields)?;

        let data = match tx_type {
            TxType::Eip2930 => SpanBatchTransactionData::Eip2930(SpanBatchEip2930TransactionData {
                value,
                gas_price: fees.0,
                data,
                access_list,
            }),
            TxType::Eip1559 => SpanBatchTransactionData::Eip1559(SpanBatchEip1559TransactionData {
                value,
                max_priority_fee_per_gas: fees.0,
                max_fee_per_gas: fees.1,
                data,
                access_list,
            }),
            TxType::Legacy => {
                return Err(SpanDecodingError::InvalidTransactionType(tx_type as u8).into())
            }
        };

        Ok(Self {
            chain_id: Some(chain_id),
            nonce,
            gas_limit,
            to,
            signature: SpanBatchSignature { y_parity, r, s },
            data,
        })
    }
}

fn rlp<T>(result: alloy_rlp::Result<T>) -> Result<T, SpanBatchError> {
    result.map_err(|_| SpanDecodingError::InvalidTransactionData.into())
}

/// Splits the payload of an RLP list off the front of `buf`.
fn list_payload<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], SpanBatchError> {
    let header = rlp(Header::decode(buf))?;
    if !header.list || header.payload_length > buf.len() {
        return Err(SpanDecodingError::InvalidTransactionData.into());
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    Ok(payload)
}

fn ensure_consumed(fields: &[u8]) -> Result<(), SpanBatchError> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(SpanDecodingError::InvalidTransactionData.into())
    }
}

fn encode_to(to: Option<Address>, out: &mut Vec<u8>) {
    match to {
        Some(to) => to.encode(out),
        None => out.push(EMPTY_STRING_CODE),
    }
}

fn decode_to(buf: &mut &[u8]) -> Result<Option<Address>, SpanBatchError> {
    if buf.first() == Some(&EMPTY_STRING_CODE) {
        buf.advance(1);
        return Ok(None);
    }
    rlp(Address::decode(buf)).map(Some)
}
