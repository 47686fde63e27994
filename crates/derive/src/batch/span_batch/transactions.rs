//! This module contains the [SpanBatchTransactions] type and logic for encoding and decoding
//! transactions in a span batch.

use super::{
    SignedTransaction, SpanBatchBits, SpanBatchError, SpanBatchSignature,
    SpanBatchTransactionData, SpanDecodingError, TxType,
};
use crate::params::MAX_SPAN_BATCH_BYTES;
use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::Buf;

/// This struct contains the decoded information for transactions in a span batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SpanBatchTransactions {
    /// The total number of transactions in a span batch. Must be set before decoding.
    pub total_block_tx_count: u64,
    /// The contract creation bits, standard span-batch bitlist.
    pub contract_creation_bits: SpanBatchBits,
    /// The y parity bits, standard span-batch bitlist.
    pub y_parity_bits: SpanBatchBits,
    /// The transaction signatures. The y parity is filled in from `y_parity_bits`.
    pub tx_sigs: Vec<SpanBatchSignature>,
    /// The transaction nonces
    pub tx_nonces: Vec<u64>,
    /// The transaction gas limits.
    pub tx_gases: Vec<u64>,
    /// The `to` addresses of the transactions that are not contract creations.
    pub tx_tos: Vec<Address>,
    /// The type specific transaction data.
    pub tx_datas: Vec<SpanBatchTransactionData>,
    /// The protected bits, standard span-batch bitlist over the legacy transactions only.
    pub protected_bits: SpanBatchBits,
    /// Total legacy transaction count in the span batch.
    pub legacy_tx_count: u64,
}

impl SpanBatchTransactions {
    /// Encodes the [SpanBatchTransactions] into a writer.
    pub fn encode(&self, w: &mut Vec<u8>) -> Result<(), SpanBatchError> {
        self.contract_creation_bits.encode(w, self.total_block_tx_count as usize)?;
        self.y_parity_bits.encode(w, self.total_block_tx_count as usize)?;
        self.encode_tx_sigs_rs(w);
        self.encode_tx_tos(w);
        self.encode_tx_datas(w);
        encode_varints(w, &self.tx_nonces);
        encode_varints(w, &self.tx_gases);
        self.protected_bits.encode(w, self.legacy_tx_count as usize)?;
        Ok(())
    }

    /// Decodes the [SpanBatchTransactions] from a reader.
    pub fn decode(&mut self, r: &mut &[u8]) -> Result<(), SpanBatchError> {
        if self.total_block_tx_count > MAX_SPAN_BATCH_BYTES {
            return Err(SpanBatchError::TooBigSpanBatchSize);
        }
        let count = self.total_block_tx_count as usize;

        self.contract_creation_bits = SpanBatchBits::decode(r, count)?;
        self.y_parity_bits = SpanBatchBits::decode(r, count)?;
        self.decode_tx_sigs_rs(r)?;
        self.decode_tx_tos(r)?;
        self.decode_tx_datas(r)?;
        self.tx_nonces = decode_varints(r, count, SpanDecodingError::TxNonces)?;
        self.tx_gases = decode_varints(r, count, SpanDecodingError::TxGases)?;
        self.protected_bits = SpanBatchBits::decode(r, self.legacy_tx_count as usize)?;
        Ok(())
    }

    /// Encode the transaction signatures into a writer (excluding `v` field).
    fn encode_tx_sigs_rs(&self, w: &mut Vec<u8>) {
        for sig in &self.tx_sigs {
            w.extend_from_slice(&sig.r.to_be_bytes::<32>());
            w.extend_from_slice(&sig.s.to_be_bytes::<32>());
        }
    }

    /// Encode the `to` addresses of the transactions into a writer.
    fn encode_tx_tos(&self, w: &mut Vec<u8>) {
        for to in &self.tx_tos {
            w.extend_from_slice(to.as_slice());
        }
    }

    /// Encode the transaction data into a writer.
    fn encode_tx_datas(&self, w: &mut Vec<u8>) {
        for data in &self.tx_datas {
            data.encode(w);
        }
    }

    /// Decode the transaction signatures from a reader (excluding `v` field).
    fn decode_tx_sigs_rs(&mut self, r: &mut &[u8]) -> Result<(), SpanBatchError> {
        let count = self.total_block_tx_count as usize;
        if r.len() / 64 < count {
            return Err(SpanDecodingError::TxSigs.into());
        }

        self.tx_sigs = (0..count)
            .map(|i| {
                let sig = SpanBatchSignature {
                    y_parity: self.y_parity_bits.get_bit(i),
                    r: U256::from_be_slice(&r[..32]),
                    s: U256::from_be_slice(&r[32..64]),
                };
                r.advance(64);
                sig
            })
            .collect();
        Ok(())
    }

    /// Decode the `to` addresses of the transactions from a reader.
    fn decode_tx_tos(&mut self, r: &mut &[u8]) -> Result<(), SpanBatchError> {
        let count = self.total_block_tx_count as usize - self.contract_creation_bits.count_ones();
        if r.len() / 20 < count {
            return Err(SpanDecodingError::TxTos.into());
        }

        self.tx_tos = (0..count)
            .map(|_| {
                let to = Address::from_slice(&r[..20]);
                r.advance(20);
                to
            })
            .collect();
        Ok(())
    }

    /// Decode the transaction data from a reader.
    fn decode_tx_datas(&mut self, r: &mut &[u8]) -> Result<(), SpanBatchError> {
        let mut tx_datas = Vec::new();
        self.legacy_tx_count = 0;

        // The RLP stream carries the length of every entry.
        for _ in 0..self.total_block_tx_count {
            let tx_data = SpanBatchTransactionData::decode(r)?;
            if tx_data.tx_type() == TxType::Legacy {
                self.legacy_tx_count += 1;
            }
            tx_datas.push(tx_data);
        }

        self.tx_datas = tx_datas;
        Ok(())
    }

    /// Retrieve all of the raw transactions from the [SpanBatchTransactions].
    pub fn full_txs(&self, chain_id: u64) -> Result<Vec<Bytes>, SpanBatchError> {
        let invalid = || SpanBatchError::from(SpanDecodingError::InvalidTransactionData);

        let mut txs = Vec::with_capacity(self.tx_datas.len());
        let mut to_idx = 0;
        let mut protected_idx = 0;
        for (idx, data) in self.tx_datas.iter().enumerate() {
            let to = if self.contract_creation_bits.get_bit(idx) {
                None
            } else {
                let to = self.tx_tos.get(to_idx).ok_or_else(invalid)?;
                to_idx += 1;
                Some(*to)
            };
            let chain_id = match data.tx_type() {
                TxType::Legacy => {
                    let protected = self.protected_bits.get_bit(protected_idx);
                    protected_idx += 1;
                    protected.then_some(chain_id)
                }
                TxType::Eip2930 | TxType::Eip1559 => Some(chain_id),
            };

            let tx = SignedTransaction {
                chain_id,
                nonce: *self.tx_nonces.get(idx).ok_or_else(invalid)?,
                gas_limit: *self.tx_gases.get(idx).ok_or_else(invalid)?,
                to,
                signature: *self.tx_sigs.get(idx).ok_or_else(invalid)?,
                data: data.clone(),
            };
            txs.push(tx.encode_2718());
        }
        Ok(txs)
    }

    /// Add raw transactions into the [SpanBatchTransactions].
    pub fn add_txs(&mut self, txs: &[Bytes], chain_id: u64) -> Result<(), SpanBatchError> {
        let offset = self.total_block_tx_count as usize;

        for (i, raw) in txs.iter().enumerate() {
            let tx = SignedTransaction::decode_2718(&mut raw.as_ref())?;
            if let Some(tx_chain_id) = tx.chain_id {
                if tx_chain_id != chain_id {
                    return Err(SpanBatchError::ChainIdMismatch(tx_chain_id, chain_id));
                }
            }

            if tx.tx_type() == TxType::Legacy {
                self.protected_bits.set_bit(self.legacy_tx_count as usize, tx.is_protected());
                self.legacy_tx_count += 1;
            }

            match tx.to {
                Some(to) => self.tx_tos.push(to),
                None => self.contract_creation_bits.set_bit(offset + i, true),
            }
            self.y_parity_bits.set_bit(offset + i, tx.signature.y_parity);
            self.tx_sigs.push(tx.signature);
            self.tx_nonces.push(tx.nonce);
            self.tx_gases.push(tx.gas_limit);
            self.tx_datas.push(tx.data);
        }
        self.total_block_tx_count += txs.len() as u64;
        Ok(())
    }
}

fn encode_varints(w: &mut Vec<u8>, values: &[u64]) {
    let mut buf = unsigned_varint::encode::u64_buffer();
    for value in values {
        w.extend_from_slice(unsigned_varint::encode::u64(*value, &mut buf));
    }
}

fn decode_varints(
    r: &mut &[u8],
    count: usize,
    err: SpanDecodingError,
) -> Result<Vec<u64>, SpanBatchError> {
    let mut values = Vec::with_capacity(count.min(r.len()));
    for _ in 0..count {
        let (value, remaining) = unsigned_varint::decode::u64(r).map_err(|_| err.clone())?;
        values.push(value);
        *r = remaining;
    }
    Ok(values)
}
