//! Access API value objects and model error definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::sdk::cadence::{CadenceError, CadenceValue};
use crate::sdk::crypto::{CryptoError, HashAlgorithm, PublicKey, SignatureAlgorithm};
use crate::sdk::encoding::{decode_hex, rlp_bytes, rlp_list, rlp_u64};
use crate::sdk::error::parse_error_code;

/// Errors raised while building or inspecting model values.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("value is {actual} bytes, expected at most {expected}")]
    TooLong { expected: usize, actual: usize },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The transaction result carried an unexpected status code.
    #[error("transaction failed with code {status_code}: {message}")]
    TransactionFailed {
        status_code: u32,
        error_code: Option<u32>,
        message: String,
    },

    #[error("expected {expected} events of type {event_type} but there were {actual}")]
    UnexpectedEventCount {
        event_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("{0} has no access API code")]
    NoAccessCode(HashAlgorithm),

    #[error(transparent)]
    Cadence(#[from] CadenceError),
}

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LENGTH: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Build from a slice no longer than the fixed size, left-padding with zeros.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
                if bytes.len() > $len {
                    return Err(ModelError::TooLong {
                        expected: $len,
                        actual: bytes.len(),
                    });
                }
                let mut out = [0u8; $len];
                out[$len - bytes.len()..].copy_from_slice(bytes);
                Ok(Self(out))
            }

            pub fn from_hex(text: &str) -> Result<Self, ModelError> {
                let bytes = decode_hex(text).map_err(|e| ModelError::InvalidHex(format!("'{}': {}", text, e)))?;
                Self::from_slice(&bytes)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// 8-byte account address.
    FlowAddress,
    8
);

fixed_bytes!(
    /// 32-byte identifier of a block, transaction, collection or result.
    FlowId,
    32
);

const UFIX64_DECIMALS: usize = 8;
const UFIX64_SCALE: u64 = 100_000_000;

/// Unsigned fixed-point number with eight decimal places, stored as raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UFix64(u64);

impl UFix64 {
    pub const ZERO: UFix64 = UFix64(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn from_whole(whole: u64) -> Option<Self> {
        whole.checked_mul(UFIX64_SCALE).map(Self)
    }

    pub fn integer_part(self) -> u64 {
        self.0 / UFIX64_SCALE
    }

    pub fn fractional_part(self) -> u64 {
        self.0 % UFIX64_SCALE
    }

    /// Parse text that must carry exactly eight fractional digits.
    pub fn parse_exact(text: &str) -> Result<Self, ModelError> {
        let digits = text.split_once('.').map(|(_, frac)| frac.len());
        if digits != Some(UFIX64_DECIMALS) {
            return Err(ModelError::InvalidAmount(format!(
                "'{}' must have exactly {} decimal places",
                text, UFIX64_DECIMALS
            )));
        }
        text.parse()
    }

    /// The raw scaled value as a big-endian u64, as Cadence's `toBigEndianBytes` gives it.
    pub fn to_big_endian_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn checked_add(self, other: UFix64) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: UFix64) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for UFix64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08}", self.integer_part(), self.fractional_part())
    }
}

impl FromStr for UFix64 {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidAmount(format!("'{}' is not a UFix64", s));
        let text = s.trim();
        let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
        if whole.is_empty()
            || frac.len() > UFIX64_DECIMALS
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let frac: u64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = UFIX64_DECIMALS);
            padded.parse().map_err(|_| invalid())?
        };

        whole
            .checked_mul(UFIX64_SCALE)
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for UFix64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UFix64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Unknown,
    Pending,
    Finalized,
    Executed,
    Sealed,
    Expired,
}

impl TransactionStatus {
    pub fn code(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Pending => 1,
            Self::Finalized => 2,
            Self::Executed => 3,
            Self::Sealed => 4,
            Self::Expired => 5,
        }
    }

    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Pending,
            2 => Self::Finalized,
            3 => Self::Executed,
            4 => Self::Sealed,
            5 => Self::Expired,
            _ => Self::Unknown,
        }
    }

    /// Parse the status name used by the HTTP access API.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "finalized" => Self::Finalized,
            "executed" => Self::Executed,
            "sealed" => Self::Sealed,
            "expired" => Self::Expired,
            _ => Self::Unknown,
        }
    }

    /// No further status change will happen.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sealed | Self::Expired)
    }
}

/// Network a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChainId {
    #[default]
    Unknown,
    Mainnet,
    Testnet,
    Canarynet,
    Emulator,
}

impl ChainId {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Mainnet => "flow-mainnet",
            Self::Testnet => "flow-testnet",
            Self::Canarynet => "flow-canarynet",
            Self::Emulator => "flow-emulator",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "flow-mainnet" => Self::Mainnet,
            "flow-testnet" => Self::Testnet,
            "flow-canarynet" => Self::Canarynet,
            "flow-emulator" => Self::Emulator,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::from_name(&text))
    }
}

/// A key registered on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKey {
    pub index: u32,
    #[serde(with = "crate::sdk::encoding::hex_bytes")]
    pub public_key: Vec<u8>,
    pub sign_algo: SignatureAlgorithm,
    pub hash_algo: HashAlgorithm,
    pub weight: u32,
    pub sequence_number: u64,
    pub revoked: bool,
}

impl AccountKey {
    /// Full-weight weight value.
    pub const FULL_WEIGHT: u32 = 1000;

    /// A key description ready to be added to an account.
    pub fn new(public_key: &PublicKey, hash_algo: HashAlgorithm, weight: u32) -> Self {
        Self {
            index: 0,
            public_key: public_key.to_bytes(),
            sign_algo: public_key.algorithm(),
            hash_algo,
            weight,
            sequence_number: 0,
            revoked: false,
        }
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key)
    }

    pub fn decode_public_key(&self) -> Result<PublicKey, CryptoError> {
        PublicKey::from_bytes(&self.public_key, self.sign_algo)
    }

    /// RLP encoding `[public_key, sign_algo, hash_algo, weight]` accepted by `AuthAccount.addPublicKey`.
    pub fn encoded(&self) -> Result<Vec<u8>, ModelError> {
        let hash_code = self
            .hash_algo
            .code()
            .ok_or(ModelError::NoAccessCode(self.hash_algo))?;
        Ok(rlp_list(&[
            rlp_bytes(&self.public_key),
            rlp_u64(u64::from(self.sign_algo.code())),
            rlp_u64(u64::from(hash_code)),
            rlp_u64(u64::from(self.weight)),
        ]))
    }
}

/// Account state at some block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: FlowAddress,
    pub balance: UFix64,
    pub keys: Vec<AccountKey>,
    /// Contract name to source code.
    pub contracts: BTreeMap<String, String>,
}

impl Account {
    /// Index of the first non-revoked key matching `public_key_hex`.
    ///
    /// Either side may be a suffix of the other, so tagged (`04..`) and bare
    /// `X || Y` forms both match.
    pub fn key_index(&self, public_key_hex: &str) -> Option<u32> {
        let needle = public_key_hex
            .trim()
            .trim_start_matches("0x")
            .to_ascii_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.keys
            .iter()
            .filter(|k| !k.revoked)
            .find(|k| {
                let hex = k.public_key_hex();
                hex.ends_with(&needle) || needle.ends_with(&hex)
            })
            .map(|k| k.index)
    }

    pub fn key(&self, index: u32) -> Option<&AccountKey> {
        self.keys.iter().find(|k| k.index == index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub id: FlowId,
    pub parent_id: FlowId,
    pub height: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionGuarantee {
    pub collection_id: FlowId,
    pub signer_ids: Vec<FlowId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSeal {
    pub block_id: FlowId,
    pub result_id: FlowId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: FlowId,
    pub parent_id: FlowId,
    pub height: u64,
    pub timestamp: DateTime<Utc>,
    pub collection_guarantees: Vec<CollectionGuarantee>,
    pub block_seals: Vec<BlockSeal>,
}

impl Block {
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            id: self.id,
            parent_id: self.parent_id,
            height: self.height,
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: FlowId,
    pub transaction_ids: Vec<FlowId>,
}

/// An event emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub transaction_id: FlowId,
    pub transaction_index: u32,
    pub event_index: u32,
    /// JSON-Cadence payload.
    #[serde(with = "crate::sdk::encoding::hex_bytes")]
    pub payload: Vec<u8>,
}

impl Event {
    /// Decoded payload.
    pub fn value(&self) -> Result<CadenceValue, CadenceError> {
        CadenceValue::decode(&self.payload)
    }

    /// A named field of the event payload.
    pub fn field(&self, name: &str) -> Result<CadenceValue, CadenceError> {
        Ok(self.value()?.field(name)?.clone())
    }
}

/// The events of one block, as returned by event queries and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResult {
    pub block_id: FlowId,
    pub block_height: u64,
    pub block_timestamp: DateTime<Utc>,
    pub events: Vec<Event>,
}

/// One message of an event subscription.
pub type BlockEvents = EventResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub transaction_id: FlowId,
    pub status: TransactionStatus,
    pub status_code: u32,
    pub error_message: String,
    pub events: Vec<Event>,
    pub block_id: FlowId,
    pub block_height: u64,
    pub collection_id: Option<FlowId>,
    pub computation_usage: u64,
}

impl TransactionResult {
    /// Fail unless the status code is one of `valid_codes`.
    pub fn error_for_status(&self, valid_codes: &[u32]) -> Result<&Self, ModelError> {
        if valid_codes.contains(&self.status_code) {
            return Ok(self);
        }
        Err(ModelError::TransactionFailed {
            status_code: self.status_code,
            error_code: parse_error_code(&self.error_message),
            message: self.error_message.clone(),
        })
    }

    /// Events whose type ends with (or, when `exact`, equals) `event_type`.
    pub fn events_of_type(
        &self,
        event_type: &str,
        exact: bool,
        expected_count: Option<usize>,
    ) -> Result<Vec<&Event>, ModelError> {
        let matched: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| {
                if exact {
                    e.event_type == event_type
                } else {
                    e.event_type.ends_with(event_type)
                }
            })
            .collect();

        match expected_count {
            Some(expected) if expected != matched.len() => Err(ModelError::UnexpectedEventCount {
                event_type: event_type.to_string(),
                expected,
                actual: matched.len(),
            }),
            _ => Ok(matched),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: u64,
    pub collection_index: u32,
    pub block_id: FlowId,
    #[serde(with = "crate::sdk::encoding::hex_bytes")]
    pub start_state: Vec<u8>,
    #[serde(with = "crate::sdk::encoding::hex_bytes")]
    pub end_state: Vec<u8>,
    #[serde(with = "crate::sdk::encoding::hex_bytes")]
    pub event_collection: Vec<u8>,
    pub number_of_transactions: u64,
    pub total_computation_used: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(with = "crate::sdk::encoding::hex_bytes")]
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub id: FlowId,
    pub block_id: FlowId,
    pub previous_result_id: FlowId,
    pub chunks: Vec<Chunk>,
    pub service_events: Vec<ServiceEvent>,
}

/// Opaque serialized protocol state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSnapshot {
    #[serde(with = "crate::sdk::encoding::hex_bytes")]
    pub bytes: Vec<u8>,
}

impl ProtocolSnapshot {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionDataTransactionResult {
    pub transaction_id: FlowId,
    pub failed: bool,
    pub computation_used: u64,
}

/// Execution output of one chunk: its transactions, events and results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkExecutionData {
    pub transaction_ids: Vec<FlowId>,
    pub events: Vec<Event>,
    pub transaction_results: Vec<ExecutionDataTransactionResult>,
}

/// One streamed message of an execution data subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockExecutionData {
    pub block_id: FlowId,
    pub chunk_execution_data: Vec<ChunkExecutionData>,
}

impl BlockExecutionData {
    /// Results of every transaction in the block, chunk by chunk.
    pub fn transaction_results(&self) -> impl Iterator<Item = &ExecutionDataTransactionResult> {
        self.chunk_execution_data.iter().flat_map(|c| c.transaction_results.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibleRange {
    pub start_height: u64,
    pub end_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeVersionInfo {
    pub semver: String,
    pub commit: String,
    pub spork_id: FlowId,
    pub protocol_version: u64,
    pub spork_root_block_height: u64,
    pub node_root_block_height: u64,
    pub compatible_range: Option<CompatibleRange>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::crypto::generate_key_pair;

    #[test]
    fn test_address_padding_and_display() {
        let address: FlowAddress = "f8d6e0586b0a20c7".parse().unwrap();
        assert_eq!(address.to_string(), "0xf8d6e0586b0a20c7");

        let short = FlowAddress::from_hex("0x01").unwrap();
        assert_eq!(short.to_string(), "0x0000000000000001");

        let err = FlowAddress::from_hex("0x010203040506070809").unwrap_err();
        assert!(matches!(err, ModelError::TooLong { expected: 8, actual: 9 }));
    }

    #[test]
    fn test_id_serde_as_string() {
        let id = FlowId::from_slice(&[0xab]).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}ab\"", "00".repeat(31)));
        let back: FlowId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ufix64_parse_and_display() {
        let amount: UFix64 = "10.5".parse().unwrap();
        assert_eq!(amount.raw(), 1_050_000_000);
        assert_eq!(amount.to_string(), "10.50000000");
        assert_eq!("7".parse::<UFix64>().unwrap().to_string(), "7.00000000");

        assert!("1.123456789".parse::<UFix64>().is_err());
        assert!("-1.0".parse::<UFix64>().is_err());
        assert!(".5".parse::<UFix64>().is_err());
        assert!("184467440738.0".parse::<UFix64>().is_err());
    }

    #[test]
    fn test_ufix64_parse_exact() {
        assert_eq!(UFix64::parse_exact("0.00100000").unwrap().raw(), 100_000);
        assert!(UFix64::parse_exact("0.001").is_err());
        assert!(UFix64::parse_exact("1").is_err());
    }

    #[test]
    fn test_ufix64_big_endian_bytes() {
        let amount: UFix64 = "1.00000002".parse().unwrap();
        assert_eq!(amount.to_big_endian_bytes(), 100_000_002u64.to_be_bytes());

        let hundred: UFix64 = "100.00".parse().unwrap();
        assert_eq!(hex::encode(hundred.to_big_endian_bytes()), "00000002540be400");
    }

    #[test]
    fn test_status_and_chain_codes() {
        assert_eq!(TransactionStatus::from_code(4), TransactionStatus::Sealed);
        assert_eq!(TransactionStatus::from_code(42), TransactionStatus::Unknown);
        assert_eq!(TransactionStatus::from_name("Executed").code(), 3);
        assert!(TransactionStatus::Expired.is_terminal());

        assert_eq!(ChainId::from_name("flow-emulator"), ChainId::Emulator);
        assert_eq!(ChainId::from_name("something-else"), ChainId::Unknown);
        assert_eq!(ChainId::Testnet.to_string(), "flow-testnet");
    }

    #[test]
    fn test_account_key_index_matches_suffix() {
        let pair = generate_key_pair(SignatureAlgorithm::EcdsaP256);
        let mut revoked = AccountKey::new(&pair.public_key, HashAlgorithm::Sha3_256, 1000);
        revoked.revoked = true;
        let mut active = revoked.clone();
        active.index = 1;
        active.revoked = false;

        let account = Account {
            address: FlowAddress::from_hex("01").unwrap(),
            balance: UFix64::ZERO,
            keys: vec![revoked, active],
            contracts: BTreeMap::new(),
        };

        let bare = pair.public_key.to_hex();
        assert_eq!(account.key_index(&bare), Some(1));
        assert_eq!(account.key_index(&format!("04{}", bare)), Some(1));
        assert_eq!(account.key_index("deadbeef"), None);
        assert_eq!(account.key_index(""), None);
    }

    #[test]
    fn test_account_key_encoding_layout() {
        let pair = generate_key_pair(SignatureAlgorithm::EcdsaP256);
        let key = AccountKey::new(&pair.public_key, HashAlgorithm::Sha3_256, 1000);
        let encoded = key.encoded().unwrap();

        // list header (0xf8, len), 64-byte string header (0xb8, 0x40), key, 2, 3, 1000
        assert_eq!(encoded[0], 0xf8);
        assert_eq!(&encoded[2..4], &[0xb8, 0x40]);
        assert_eq!(&encoded[4..68], key.public_key.as_slice());
        assert_eq!(&encoded[68..], &[0x02, 0x03, 0x82, 0x03, 0xe8]);

        let unsupported = AccountKey::new(&pair.public_key, HashAlgorithm::Keccak256, 1000);
        assert!(matches!(unsupported.encoded(), Err(ModelError::NoAccessCode(_))));
    }

    fn result_with(status_code: u32, events: &[&str]) -> TransactionResult {
        TransactionResult {
            transaction_id: FlowId::default(),
            status: TransactionStatus::Sealed,
            status_code,
            error_message: if status_code == 0 {
                String::new()
            } else {
                "[Error Code: 1101] cadence runtime error".to_string()
            },
            events: events
                .iter()
                .enumerate()
                .map(|(i, t)| Event {
                    event_type: t.to_string(),
                    transaction_id: FlowId::default(),
                    transaction_index: 0,
                    event_index: i as u32,
                    payload: Vec::new(),
                })
                .collect(),
            block_id: FlowId::default(),
            block_height: 1,
            collection_id: None,
            computation_usage: 0,
        }
    }

    #[test]
    fn test_error_for_status() {
        assert!(result_with(0, &[]).error_for_status(&[0]).is_ok());

        let failed = result_with(1, &[]);
        match failed.error_for_status(&[0]) {
            Err(ModelError::TransactionFailed { status_code, error_code, .. }) => {
                assert_eq!(status_code, 1);
                assert_eq!(error_code, Some(1101));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(failed.error_for_status(&[0, 1]).is_ok());
    }

    #[test]
    fn test_events_of_type() {
        let result = result_with(0, &["flow.AccountCreated", "A.01.FlowToken.TokensDeposited", "flow.AccountKeyAdded"]);
        assert_eq!(result.events_of_type("AccountCreated", false, Some(1)).unwrap().len(), 1);
        assert!(result.events_of_type("AccountCreated", true, None).unwrap().is_empty());
        assert!(matches!(
            result.events_of_type("flow.AccountKeyAdded", true, Some(2)),
            Err(ModelError::UnexpectedEventCount { expected: 2, actual: 1, .. })
        ));
    }
}
