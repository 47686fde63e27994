//! Contains deposit transaction types and helper methods.

use alloy_primitives::{b256, keccak256, Address, Bytes, Log, B256, U256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header, EMPTY_STRING_CODE};

/// The EIP-2718 type byte of a deposit transaction.
pub const DEPOSIT_TX_TYPE: u8 = 0x7E;

/// Deposit log event abi signature.
pub const DEPOSIT_EVENT_ABI: &str = "TransactionDeposited(address,address,uint256,bytes)";

/// Deposit event abi hash.
///
/// This is the keccak256 hash of the deposit event ABI signature.
/// `keccak256("TransactionDeposited(address,address,uint256,bytes)")`
pub const DEPOSIT_EVENT_ABI_HASH: B256 =
    b256!("b3813568d9991fc951961fcb4c784893574240a28925604d09fc577c55bb7c32");

/// The initial version of the deposit event log.
pub const DEPOSIT_EVENT_VERSION_0: B256 = B256::ZERO;

/// The minimum length of version 0 opaque data: mint, value, gas and the creation flag.
const OPAQUE_DATA_MIN_LEN: usize = 32 + 32 + 8 + 1;

/// A deposit decoding error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DepositError {
    /// Unexpected number of deposit event log topics.
    #[error("Unexpected number of deposit event log topics: {0}")]
    UnexpectedTopicsLen(usize),
    /// Invalid deposit event selector.
    #[error("Invalid deposit event selector: {1}, expected {0}")]
    InvalidSelector(B256, B256),
    /// Incomplete opaqueData slice header (incomplete length).
    #[error("Incomplete opaqueData slice header (incomplete length): {0}")]
    IncompleteOpaqueData(usize),
    /// The log data is not aligned to 32 bytes.
    #[error("Unaligned log data, expected multiple of 32 bytes, got: {0}")]
    UnalignedData(usize),
    /// Invalid opaque data content offset.
    #[error("Invalid opaque data content offset: {0}")]
    InvalidOpaqueDataOffset(Bytes),
    /// Opaque data length exceeds the deposit log event data length.
    #[error("Specified opaque data length {0} exceeds the deposit log event data length {1}")]
    OpaqueDataOverflow(usize, usize),
    /// Opaque data with padding exceeds the specified data length.
    #[error("Opaque data with padding exceeds the specified data length: {1} > {0}")]
    PaddedOpaqueDataOverflow(usize, usize),
    /// An invalid deposit version.
    #[error("Invalid deposit version: {0}")]
    InvalidVersion(B256),
    /// Unexpected opaque data length
    #[error("Unexpected opaque data length: {0}")]
    UnexpectedOpaqueDataLen(usize),
    /// The log has no block hash or number attached.
    #[error("Deposit log is not included in a block")]
    NotIncluded,
    /// The deposit transaction bytes could not be decoded.
    #[error("Failed to decode deposit transaction: {0}")]
    Rlp(alloy_rlp::Error),
}

/// Source domain identifiers for deposit transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DepositSourceDomain {
    /// A user deposit source.
    User = 0,
    /// A L1 info deposit source.
    L1Info = 1,
    /// An upgrade deposit source.
    Upgrade = 2,
}

impl DepositSourceDomain {
    /// Hashes the given 32 byte identifier under this domain.
    fn hash(self, id: B256) -> B256 {
        let mut domain_input = [0u8; 32 * 2];
        domain_input[32 - 8..32].copy_from_slice(&(self as u64).to_be_bytes());
        domain_input[32..].copy_from_slice(id.as_slice());
        keccak256(domain_input)
    }
}

/// Hashes an L1 block hash together with a big-endian index padded to 32 bytes.
fn block_hash_with_index(l1_block_hash: B256, index: u64) -> B256 {
    let mut input = [0u8; 32 * 2];
    input[..32].copy_from_slice(l1_block_hash.as_slice());
    input[32 * 2 - 8..].copy_from_slice(&index.to_be_bytes());
    keccak256(input)
}

/// A user deposit transaction source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserDepositSource {
    /// The L1 block hash.
    pub l1_block_hash: B256,
    /// The log index.
    pub log_index: u64,
}

impl UserDepositSource {
    /// Creates a new [UserDepositSource].
    pub const fn new(l1_block_hash: B256, log_index: u64) -> Self {
        Self { l1_block_hash, log_index }
    }

    /// Returns the source hash.
    pub fn source_hash(&self) -> B256 {
        DepositSourceDomain::User.hash(block_hash_with_index(self.l1_block_hash, self.log_index))
    }
}

/// A L1 info deposit transaction source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct L1InfoDepositSource {
    /// The L1 block hash.
    pub l1_block_hash: B256,
    /// The sequence number.
    pub seq_number: u64,
}

impl L1InfoDepositSource {
    /// Creates a new [L1InfoDepositSource].
    pub const fn new(l1_block_hash: B256, seq_number: u64) -> Self {
        Self { l1_block_hash, seq_number }
    }

    /// Returns the source hash.
    pub fn source_hash(&self) -> B256 {
        DepositSourceDomain::L1Info.hash(block_hash_with_index(self.l1_block_hash, self.seq_number))
    }
}

/// An upgrade deposit transaction source.
///
/// System-upgrade transactions have their own domain for source-hashes, so they never conflict
/// with user-deposits or deposited L1 information. The intent identifies the upgrade-tx uniquely,
/// in a human-readable way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpgradeDepositSource {
    /// The intent.
    pub intent: String,
}

impl UpgradeDepositSource {
    /// Creates a new [UpgradeDepositSource].
    pub fn new(intent: impl Into<String>) -> Self {
        Self { intent: intent.into() }
    }

    /// Returns the source hash.
    pub fn source_hash(&self) -> B256 {
        DepositSourceDomain::Upgrade.hash(keccak256(self.intent.as_bytes()))
    }
}

/// A deposit transaction, executed on L2 without a signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxDeposit {
    /// Uniquely identifies the origin of the deposit.
    pub source_hash: B256,
    /// The sender.
    pub from: Address,
    /// The recipient, or [None] for a contract creation.
    pub to: Option<Address>,
    /// ETH minted on L2.
    pub mint: u128,
    /// ETH transferred to the recipient.
    pub value: U256,
    /// The gas limit.
    pub gas_limit: u64,
    /// Whether the transaction is exempt from the L2 gas limit.
    pub is_system_transaction: bool,
    /// The calldata.
    pub input: Bytes,
}

impl TxDeposit {
    fn fields_len(&self) -> usize {
        self.source_hash.length() +
            self.from.length() +
            self.to.map_or(1, |to| to.length()) +
            self.mint.length() +
            self.value.length() +
            self.gas_limit.length() +
            self.is_system_transaction.length() +
            self.input.length()
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.source_hash.encode(out);
        self.from.encode(out);
        match self.to {
            Some(to) => to.encode(out),
            None => out.put_u8(EMPTY_STRING_CODE),
        }
        self.mint.encode(out);
        self.value.encode(out);
        self.gas_limit.encode(out);
        self.is_system_transaction.encode(out);
        self.input.encode(out);
    }

    /// Returns the EIP-2718 encoding: the deposit type byte followed by the RLP field list.
    pub fn encoded_2718(&self) -> Bytes {
        let header = Header { list: true, payload_length: self.fields_len() };
        let mut out = Vec::with_capacity(1 + header.length() + header.payload_length);
        out.put_u8(DEPOSIT_TX_TYPE);
        header.encode(&mut out);
        self.encode_fields(&mut out);
        out.into()
    }

    /// Decodes an EIP-2718 encoded deposit transaction.
    pub fn decode_2718(buf: &mut &[u8]) -> Result<Self, DepositError> {
        match buf.first() {
            Some(&DEPOSIT_TX_TYPE) => *buf = &buf[1..],
            _ => return Err(DepositError::Rlp(alloy_rlp::Error::Custom("not a deposit"))),
        }
        Self::decode_fields(buf).map_err(DepositError::Rlp)
    }

    fn decode_fields(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        let source_hash = B256::decode(buf)?;
        let from = Address::decode(buf)?;
        let to = match buf.first() {
            Some(&EMPTY_STRING_CODE) => {
                *buf = &buf[1..];
                None
            }
            _ => Some(Address::decode(buf)?),
        };
        Ok(Self {
            source_hash,
            from,
            to,
            mint: u128::decode(buf)?,
            value: U256::decode(buf)?,
            gas_limit: u64::decode(buf)?,
            is_system_transaction: bool::decode(buf)?,
            input: Bytes::decode(buf)?,
        })
    }
}

/// A `TransactionDeposited` event emitted by the L1 deposit contract, together with the position
/// of its log on L1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserDeposited {
    /// The L1 sender.
    pub from: Address,
    /// The L2 recipient.
    pub to: Address,
    /// ETH minted on L2.
    pub mint: u128,
    /// ETH transferred to the recipient.
    pub value: U256,
    /// The L2 gas limit.
    pub gas: u64,
    /// Whether the deposit creates a contract.
    pub is_creation: bool,
    /// The calldata.
    pub data: Bytes,
    /// The L1 block number containing the log.
    pub l1_block_num: u64,
    /// The L1 block hash containing the log.
    pub l1_block_hash: B256,
    /// The index of the log within its L1 block.
    pub log_index: u64,
}

impl UserDeposited {
    /// Decodes a deposit event emitted by the deposit contract.
    ///
    /// The emitted log must be in format:
    /// ```solidity
    /// event TransactionDeposited(
    ///    address indexed from,
    ///    address indexed to,
    ///    uint256 indexed version,
    ///    bytes opaqueData
    /// );
    /// ```
    pub fn from_log(
        log: &Log,
        l1_block_num: u64,
        l1_block_hash: B256,
        log_index: u64,
    ) -> Result<Self, DepositError> {
        let topics = log.data.topics();
        if topics.len() != 4 {
            return Err(DepositError::UnexpectedTopicsLen(topics.len()));
        }
        if topics[0] != DEPOSIT_EVENT_ABI_HASH {
            return Err(DepositError::InvalidSelector(DEPOSIT_EVENT_ABI_HASH, topics[0]));
        }
        let data = &log.data.data;
        if data.len() < 64 {
            return Err(DepositError::IncompleteOpaqueData(data.len()));
        }
        if data.len() % 32 != 0 {
            return Err(DepositError::UnalignedData(data.len()));
        }

        let from = Address::from_word(topics[1]);
        let to = Address::from_word(topics[2]);
        let version = topics[3];

        // The ABI encoding of `bytes opaqueData` is a 32 byte offset (always 32), a 32 byte
        // length, then the tightly packed content padded to a 32 byte boundary.
        if U256::from_be_slice(&data[..32]) != U256::from(32) {
            return Err(DepositError::InvalidOpaqueDataOffset(Bytes::copy_from_slice(
                &data[24..32],
            )));
        }
        let available = data.len() - 64;
        let opaque_len = U256::from_be_slice(&data[32..64]);
        if opaque_len > U256::from(available) {
            return Err(DepositError::OpaqueDataOverflow(opaque_len.saturating_to(), available));
        }
        let opaque_len: usize = opaque_len.saturating_to();
        if opaque_len + 32 <= available {
            return Err(DepositError::PaddedOpaqueDataOverflow(available, opaque_len));
        }

        if version != DEPOSIT_EVENT_VERSION_0 {
            return Err(DepositError::InvalidVersion(version));
        }

        let opaque = &data[64..64 + opaque_len];
        if opaque.len() < OPAQUE_DATA_MIN_LEN {
            return Err(DepositError::UnexpectedOpaqueDataLen(opaque.len()));
        }

        let mut mint = [0u8; 16];
        mint.copy_from_slice(&opaque[16..32]);
        let mut gas = [0u8; 8];
        gas.copy_from_slice(&opaque[64..72]);

        Ok(Self {
            from,
            to,
            mint: u128::from_be_bytes(mint),
            value: U256::from_be_slice(&opaque[32..64]),
            gas: u64::from_be_bytes(gas),
            is_creation: opaque[72] != 0,
            data: Bytes::copy_from_slice(&opaque[OPAQUE_DATA_MIN_LEN..]),
            l1_block_num,
            l1_block_hash,
            log_index,
        })
    }

    /// Returns the source hash of the deposit transaction derived from this event.
    pub fn source_hash(&self) -> B256 {
        UserDepositSource::new(self.l1_block_hash, self.log_index).source_hash()
    }
}

impl From<&UserDeposited> for TxDeposit {
    fn from(deposit: &UserDeposited) -> Self {
        Self {
            source_hash: deposit.source_hash(),
            from: deposit.from,
            to: (!deposit.is_creation).then_some(deposit.to),
            mint: deposit.mint,
            value: deposit.value,
            gas_limit: deposit.gas,
            is_system_transaction: false,
            input: deposit.data.clone(),
        }
    }
}
