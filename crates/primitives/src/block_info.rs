//! This module contains the [L1BlockInfoTx] type, and various encoding / decoding methods for it.

use crate::{
    block::{BlockId, L1BlockInfo},
    deposits::{L1InfoDepositSource, TxDeposit},
    rollup_config::RollupConfig,
    system_config::{SystemAccounts, SystemConfig},
};
use alloy_primitives::{Address, Bytes, B256, U256};

/// The system transaction gas limit post-Regolith
const REGOLITH_SYSTEM_TX_GAS: u64 = 1_000_000;
/// The system transaction gas limit pre-Regolith
const BEDROCK_SYSTEM_TX_GAS: u64 = 150_000_000;
/// The length of an L1 info transaction in Bedrock.
const L1_INFO_TX_LEN_BEDROCK: usize = 4 + 32 * 8;
/// The length of an L1 info transaction in Ecotone.
const L1_INFO_TX_LEN_ECOTONE: usize = 4 + 32 * 5;
/// The 4 byte selector of the
/// "setL1BlockValues(uint64,uint64,uint256,bytes32,uint64,bytes32,uint256,uint256)" function
const L1_INFO_TX_SELECTOR_BEDROCK: [u8; 4] = [0x01, 0x5d, 0x8e, 0xb9];
/// The 4 byte selector of "setL1BlockValuesEcotone()"
const L1_INFO_TX_SELECTOR_ECOTONE: [u8; 4] = [0x44, 0x0a, 0x5e, 0x20];

/// An error building or decoding an L1 info transaction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum L1BlockInfoError {
    /// The calldata is too short to hold a selector.
    #[error("L1 info calldata is missing the function selector")]
    MissingSelector,
    /// The selector matches neither layout.
    #[error("Invalid L1 info transaction selector: {0:02x?}")]
    InvalidSelector([u8; 4]),
    /// Bedrock calldata of the wrong length.
    #[error("Invalid calldata length for Bedrock L1 info transaction: {0}")]
    InvalidBedrockLength(usize),
    /// Ecotone calldata of the wrong length.
    #[error("Invalid calldata length for Ecotone L1 info transaction: {0}")]
    InvalidEcotoneLength(usize),
    /// The system config carries a fee scalar of an unknown version.
    #[error("Unknown L1 fee scalar version: {0}")]
    UnknownScalarVersion(u8),
}

/// The [L1BlockInfoTx] enum contains variants for the different versions of the L1 block info
/// transaction on OP Stack chains.
///
/// This transaction always sits at the top of the block, and alters the `L1 Block` contract's
/// knowledge of the L1 chain.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum L1BlockInfoTx {
    /// A Bedrock L1 info transaction
    Bedrock(L1BlockInfoBedrock),
    /// An Ecotone L1 info transaction
    Ecotone(L1BlockInfoEcotone),
}

/// Represents the fields within a Bedrock L1 block info transaction.
///
/// Bedrock Binary Format
// +---------+--------------------------+
// | Bytes   | Field                    |
// +---------+--------------------------+
// | 4       | Function signature       |
// | 32      | Number                   |
// | 32      | Time                     |
// | 32      | BaseFee                  |
// | 32      | BlockHash                |
// | 32      | SequenceNumber           |
// | 32      | BatcherHash              |
// | 32      | L1FeeOverhead            |
// | 32      | L1FeeScalar              |
// +---------+--------------------------+
#[derive(Debug, Clone, Hash, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct L1BlockInfoBedrock {
    /// The current L1 origin block number
    pub number: u64,
    /// The current L1 origin block's timestamp
    pub time: u64,
    /// The current L1 origin block's basefee
    pub base_fee: U256,
    /// The current L1 origin block's hash
    pub block_hash: B256,
    /// The current sequence number
    pub sequence_number: u64,
    /// The batcher address, left-padded to 32 bytes
    pub batcher_hash: B256,
    /// The fee overhead for L1 data
    pub l1_fee_overhead: U256,
    /// The fee scalar for L1 data
    pub l1_fee_scalar: U256,
}

/// Represents the fields within an Ecotone L1 block info transaction.
///
/// Ecotone Binary Format
/// +---------+--------------------------+
/// | Bytes   | Field                    |
/// +---------+--------------------------+
/// | 4       | Function signature       |
/// | 4       | BaseFeeScalar            |
/// | 4       | BlobBaseFeeScalar        |
/// | 8       | SequenceNumber           |
/// | 8       | Timestamp                |
/// | 8       | L1BlockNumber            |
/// | 32      | BaseFee                  |
/// | 32      | BlobBaseFee              |
/// | 32      | BlockHash                |
/// | 32      | BatcherHash              |
/// +---------+--------------------------+
#[derive(Debug, Clone, Hash, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct L1BlockInfoEcotone {
    /// The current L1 origin block number
    pub number: u64,
    /// The current L1 origin block's timestamp
    pub time: u64,
    /// The current L1 origin block's basefee
    pub base_fee: U256,
    /// The current L1 origin block's hash
    pub block_hash: B256,
    /// The current sequence number
    pub sequence_number: u64,
    /// The batcher address, left-padded to 32 bytes
    pub batcher_hash: B256,
    /// The current blob base fee on L1
    pub blob_base_fee: U256,
    /// The fee scalar for L1 blobspace data
    pub blob_base_fee_scalar: u32,
    /// The fee scalar for L1 data
    pub base_fee_scalar: u32,
}

impl L1BlockInfoTx {
    /// Creates a new [L1BlockInfoTx] for the L2 block at `l2_block_time`.
    ///
    /// The first Ecotone block still carries a Bedrock style transaction: the `L1 Block` contract
    /// is only upgraded by the upgrade transactions placed after it.
    pub fn try_new(
        rollup_config: &RollupConfig,
        system_config: &SystemConfig,
        sequence_number: u64,
        l1_block: &L1BlockInfo,
        l2_block_time: u64,
    ) -> Result<Self, L1BlockInfoError> {
        if rollup_config.is_ecotone_and_not_first(l2_block_time) {
            let (blob_base_fee_scalar, base_fee_scalar) = system_config
                .ecotone_scalars()
                .ok_or(L1BlockInfoError::UnknownScalarVersion(
                    system_config.l1_fee_scalar.to_be_bytes::<32>()[0],
                ))?;
            Ok(Self::Ecotone(L1BlockInfoEcotone {
                number: l1_block.number,
                time: l1_block.timestamp,
                base_fee: l1_block.base_fee,
                block_hash: l1_block.hash,
                sequence_number,
                batcher_hash: system_config.batcher_hash(),
                blob_base_fee: U256::from(l1_block.blob_base_fee()),
                blob_base_fee_scalar,
                base_fee_scalar,
            }))
        } else {
            Ok(Self::Bedrock(L1BlockInfoBedrock {
                number: l1_block.number,
                time: l1_block.timestamp,
                base_fee: l1_block.base_fee,
                block_hash: l1_block.hash,
                sequence_number,
                batcher_hash: system_config.batcher_hash(),
                l1_fee_overhead: system_config.l1_fee_overhead,
                l1_fee_scalar: system_config.l1_fee_scalar,
            }))
        }
    }

    /// Wraps the info transaction into the deposit transaction placed at the top of the block.
    pub fn to_deposit_tx(&self, rollup_config: &RollupConfig, l2_block_time: u64) -> TxDeposit {
        let accounts = SystemAccounts::default();
        let source = L1InfoDepositSource::new(self.id().hash, self.sequence_number());
        let regolith = rollup_config.is_regolith_active(l2_block_time);
        TxDeposit {
            source_hash: source.source_hash(),
            from: accounts.attributes_depositor,
            to: Some(accounts.attributes_predeploy),
            mint: 0,
            value: U256::ZERO,
            // With Regolith, system transactions were deprecated and special transactions like
            // the L1 info deposit are allocated a constant amount of gas.
            gas_limit: if regolith { REGOLITH_SYSTEM_TX_GAS } else { BEDROCK_SYSTEM_TX_GAS },
            is_system_transaction: !regolith,
            input: self.encode_calldata(),
        }
    }

    /// Decodes the [L1BlockInfoTx] object from ethereum transaction calldata.
    pub fn decode_calldata(r: &[u8]) -> Result<Self, L1BlockInfoError> {
        if r.len() < 4 {
            return Err(L1BlockInfoError::MissingSelector);
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&r[..4]);
        match selector {
            L1_INFO_TX_SELECTOR_BEDROCK => {
                Ok(Self::Bedrock(L1BlockInfoBedrock::decode_calldata(r)?))
            }
            L1_INFO_TX_SELECTOR_ECOTONE => {
                Ok(Self::Ecotone(L1BlockInfoEcotone::decode_calldata(r)?))
            }
            _ => Err(L1BlockInfoError::InvalidSelector(selector)),
        }
    }

    /// Encodes the [L1BlockInfoTx] object into Ethereum transaction calldata.
    pub fn encode_calldata(&self) -> Bytes {
        match self {
            Self::Bedrock(bedrock_tx) => bedrock_tx.encode_calldata(),
            Self::Ecotone(ecotone_tx) => ecotone_tx.encode_calldata(),
        }
    }

    /// Returns the L1 [BlockId] for the info transaction.
    pub const fn id(&self) -> BlockId {
        match self {
            Self::Ecotone(L1BlockInfoEcotone { number, block_hash, .. }) |
            Self::Bedrock(L1BlockInfoBedrock { number, block_hash, .. }) => {
                BlockId { number: *number, hash: *block_hash }
            }
        }
    }

    /// Returns the sequence number for the info transaction
    pub const fn sequence_number(&self) -> u64 {
        match self {
            Self::Bedrock(L1BlockInfoBedrock { sequence_number, .. }) |
            Self::Ecotone(L1BlockInfoEcotone { sequence_number, .. }) => *sequence_number,
        }
    }

    /// Returns the batcher address for the info transaction
    pub fn batcher_address(&self) -> Address {
        match self {
            Self::Bedrock(L1BlockInfoBedrock { batcher_hash, .. }) |
            Self::Ecotone(L1BlockInfoEcotone { batcher_hash, .. }) => {
                Address::from_word(*batcher_hash)
            }
        }
    }
}

fn read_u64(r: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&r[at..at + 8]);
    u64::from_be_bytes(buf)
}

fn read_u32(r: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&r[at..at + 4]);
    u32::from_be_bytes(buf)
}

impl L1BlockInfoBedrock {
    /// Encodes the [L1BlockInfoBedrock] object into Ethereum transaction calldata.
    pub fn encode_calldata(&self) -> Bytes {
        let mut buf = Vec::with_capacity(L1_INFO_TX_LEN_BEDROCK);
        buf.extend_from_slice(L1_INFO_TX_SELECTOR_BEDROCK.as_ref());
        buf.extend_from_slice(U256::from(self.number).to_be_bytes::<32>().as_slice());
        buf.extend_from_slice(U256::from(self.time).to_be_bytes::<32>().as_slice());
        buf.extend_from_slice(self.base_fee.to_be_bytes::<32>().as_slice());
        buf.extend_from_slice(self.block_hash.as_slice());
        buf.extend_from_slice(U256::from(self.sequence_number).to_be_bytes::<32>().as_slice());
        buf.extend_from_slice(self.batcher_hash.as_slice());
        buf.extend_from_slice(self.l1_fee_overhead.to_be_bytes::<32>().as_slice());
        buf.extend_from_slice(self.l1_fee_scalar.to_be_bytes::<32>().as_slice());
        buf.into()
    }

    /// Decodes the [L1BlockInfoBedrock] object from ethereum transaction calldata.
    pub fn decode_calldata(r: &[u8]) -> Result<Self, L1BlockInfoError> {
        if r.len() != L1_INFO_TX_LEN_BEDROCK {
            return Err(L1BlockInfoError::InvalidBedrockLength(r.len()));
        }

        Ok(Self {
            number: read_u64(r, 28),
            time: read_u64(r, 60),
            base_fee: U256::from_be_slice(&r[68..100]),
            block_hash: B256::from_slice(&r[100..132]),
            sequence_number: read_u64(r, 156),
            batcher_hash: B256::from_slice(&r[164..196]),
            l1_fee_overhead: U256::from_be_slice(&r[196..228]),
            l1_fee_scalar: U256::from_be_slice(&r[228..260]),
        })
    }
}

impl L1BlockInfoEcotone {
    /// Encodes the [L1BlockInfoEcotone] object into Ethereum transaction calldata.
    pub fn encode_calldata(&self) -> Bytes {
        let mut buf = Vec::with_capacity(L1_INFO_TX_LEN_ECOTONE);
        buf.extend_from_slice(L1_INFO_TX_SELECTOR_ECOTONE.as_ref());
        buf.extend_from_slice(self.base_fee_scalar.to_be_bytes().as_ref());
        buf.extend_from_slice(self.blob_base_fee_scalar.to_be_bytes().as_ref());
        buf.extend_from_slice(self.sequence_number.to_be_bytes().as_ref());
        buf.extend_from_slice(self.time.to_be_bytes().as_ref());
        buf.extend_from_slice(self.number.to_be_bytes().as_ref());
        buf.extend_from_slice(self.base_fee.to_be_bytes::<32>().as_ref());
        buf.extend_from_slice(self.blob_base_fee.to_be_bytes::<32>().as_ref());
        buf.extend_from_slice(self.block_hash.as_ref());
        buf.extend_from_slice(self.batcher_hash.as_ref());
        buf.into()
    }

    /// Decodes the [L1BlockInfoEcotone] object from ethereum transaction calldata.
    pub fn decode_calldata(r: &[u8]) -> Result<Self, L1BlockInfoError> {
        if r.len() != L1_INFO_TX_LEN_ECOTONE {
            return Err(L1BlockInfoError::InvalidEcotoneLength(r.len()));
        }

        Ok(Self {
            base_fee_scalar: read_u32(r, 4),
            blob_base_fee_scalar: read_u32(r, 8),
            sequence_number: read_u64(r, 12),
            time: read_u64(r, 20),
            number: read_u64(r, 28),
            base_fee: U256::from_be_slice(&r[36..68]),
            blob_base_fee: U256::from_be_slice(&r[68..100]),
            block_hash: B256::from_slice(&r[100..132]),
            batcher_hash: B256::from_slice(&r[132..164]),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::{address, b256, hex};

    const RAW_BEDROCK_INFO_TX: [u8; L1_INFO_TX_LEN_BEDROCK] = hex!("015d8eb9000000000000000000000000000000000000000000000000000000000117c4eb0000000000000000000000000000000000000000000000000000000065280377000000000000000000000000000000000000000000000000000000026d05d953392012032675be9f94aae5ab442de73c5f4fb1bf30fa7dd0d2442239899a40fc00000000000000000000000000000000000000000000000000000000000000040000000000000000000000006887246668a3b87f54deb3b94ba47a6f63f3298500000000000000000000000000000000000000000000000000000000000000bc00000000000000000000000000000000000000000000000000000000000a6fe0");
    const RAW_ECOTONE_INFO_TX: [u8; L1_INFO_TX_LEN_ECOTONE] = hex!("440a5e2000000558000c5fc5000000000000000500000000661c277300000000012bec20000000000000000000000000000000000000000000000000000000026e9f109900000000000000000000000000000000000000000000000000000000000000011c4c84c50740386c7dc081efddd644405f04cde73e30a2e381737acce9f5add30000000000000000000000006887246668a3b87f54deb3b94ba47a6f63f32985");

    const BATCHER: Address = address!("6887246668a3b87f54deb3b94ba47a6f63f32985");

    #[test]
    fn test_invalid_lengths_and_selectors() {
        assert_eq!(
            L1BlockInfoBedrock::decode_calldata(&[0xde, 0xad]),
            Err(L1BlockInfoError::InvalidBedrockLength(2))
        );
        assert_eq!(
            L1BlockInfoEcotone::decode_calldata(&[0xde, 0xad]),
            Err(L1BlockInfoError::InvalidEcotoneLength(2))
        );
        assert_eq!(L1BlockInfoTx::decode_calldata(&[0xde]), Err(L1BlockInfoError::MissingSelector));
        assert_eq!(
            L1BlockInfoTx::decode_calldata(&[0xde, 0xad, 0xbe, 0xef]),
            Err(L1BlockInfoError::InvalidSelector([0xde, 0xad, 0xbe, 0xef]))
        );
    }

    #[test]
    fn test_bedrock_l1_block_info_tx_roundtrip() {
        let expected = L1BlockInfoBedrock {
            number: 18334955,
            time: 1697121143,
            base_fee: U256::from(10419034451u64),
            block_hash: b256!("392012032675be9f94aae5ab442de73c5f4fb1bf30fa7dd0d2442239899a40fc"),
            sequence_number: 4,
            batcher_hash: BATCHER.into_word(),
            l1_fee_overhead: U256::from(0xbc),
            l1_fee_scalar: U256::from(0xa6fe0),
        };

        let decoded = L1BlockInfoTx::decode_calldata(RAW_BEDROCK_INFO_TX.as_ref()).unwrap();
        assert_eq!(decoded, L1BlockInfoTx::Bedrock(expected));
        assert_eq!(decoded.batcher_address(), BATCHER);
        assert_eq!(decoded.sequence_number(), 4);
        assert_eq!(decoded.encode_calldata().as_ref(), RAW_BEDROCK_INFO_TX);
    }

    #[test]
    fn test_ecotone_l1_block_info_tx_roundtrip() {
        let expected = L1BlockInfoEcotone {
            number: 19655712,
            time: 1713121139,
            base_fee: U256::from(10445852825u64),
            block_hash: b256!("1c4c84c50740386c7dc081efddd644405f04cde73e30a2e381737acce9f5add3"),
            sequence_number: 5,
            batcher_hash: BATCHER.into_word(),
            blob_base_fee: U256::from(1),
            blob_base_fee_scalar: 810949,
            base_fee_scalar: 1368,
        };

        let decoded = L1BlockInfoTx::decode_calldata(RAW_ECOTONE_INFO_TX.as_ref()).unwrap();
        assert_eq!(decoded, L1BlockInfoTx::Ecotone(expected));
        assert_eq!(decoded.encode_calldata().as_ref(), RAW_ECOTONE_INFO_TX);
    }

    fn l1_block() -> L1BlockInfo {
        L1BlockInfo {
            number: 18334955,
            hash: b256!("392012032675be9f94aae5ab442de73c5f4fb1bf30fa7dd0d2442239899a40fc"),
            timestamp: 1697121143,
            base_fee: U256::from(10419034451u64),
            ..Default::default()
        }
    }

    fn system_config() -> SystemConfig {
        SystemConfig {
            batcher_addr: BATCHER,
            gas_limit: 30_000_000,
            l1_fee_overhead: U256::from(0xbc),
            l1_fee_scalar: U256::from(0xa6fe0),
        }
    }

    #[test]
    fn test_try_new_bedrock_matches_raw_calldata() {
        let config = RollupConfig { block_time: 2, ..Default::default() };
        let info = L1BlockInfoTx::try_new(&config, &system_config(), 4, &l1_block(), 100).unwrap();
        assert_eq!(info.encode_calldata().as_ref(), RAW_BEDROCK_INFO_TX);
    }

    #[test]
    fn test_try_new_first_ecotone_block_is_bedrock() {
        let config = RollupConfig { block_time: 2, ecotone_time: Some(100), ..Default::default() };
        let first = L1BlockInfoTx::try_new(&config, &system_config(), 0, &l1_block(), 100).unwrap();
        assert!(matches!(first, L1BlockInfoTx::Bedrock(_)));
        let next = L1BlockInfoTx::try_new(&config, &system_config(), 1, &l1_block(), 102).unwrap();
        let L1BlockInfoTx::Ecotone(ecotone) = next else { panic!("expected an ecotone info tx") };
        assert_eq!(ecotone.base_fee_scalar, 0xa6fe0);
        assert_eq!(ecotone.blob_base_fee_scalar, 0);
        assert_eq!(ecotone.blob_base_fee, U256::from(1));
    }

    #[test]
    fn test_deposit_tx_gas_follows_regolith() {
        let info = L1BlockInfoTx::Bedrock(L1BlockInfoBedrock::default());
        let bedrock = RollupConfig::default();
        let tx = info.to_deposit_tx(&bedrock, 10);
        assert_eq!(tx.gas_limit, 150_000_000);
        assert!(tx.is_system_transaction);

        let regolith = RollupConfig { regolith_time: Some(0), ..Default::default() };
        let tx = info.to_deposit_tx(&regolith, 10);
        assert_eq!(tx.gas_limit, 1_000_000);
        assert!(!tx.is_system_transaction);
        assert_eq!(tx.from, address!("deaddeaddeaddeaddeaddeaddeaddeaddead0001"));
        assert_eq!(tx.to, Some(address!("4200000000000000000000000000000000000015")));
        assert_eq!(tx.source_hash, L1InfoDepositSource::new(B256::ZERO, 0).source_hash());
    }
}
