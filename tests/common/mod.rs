//! Shared utilities for the integration tests.
//!
//! [`MockAccessApi`] is an in-memory access node: it checks transaction
//! signatures and sequence numbers, runs the bundled Cadence scripts and
//! seals every accepted transaction in a block of its own.
//! [`start_routed_backend`] serves canned HTTP responses for the REST binding.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

use flow_examples::config::PollingConfig;
use flow_examples::connector::AccessApiConnector;
use flow_examples::scripts::load_script_content;
use flow_examples::sdk::cadence::{Composite, CompositeField};
use flow_examples::sdk::crypto::{sha3_256, TRANSACTION_DOMAIN_TAG};
use flow_examples::sdk::types::CollectionGuarantee;
use flow_examples::sdk::{
    AccessApi, AccessError, AccessResult, Account, AccountKey, Block, BlockExecutionData,
    BlockHeader, CadenceValue, ChainId, ChunkExecutionData, Collection, Event, EventFilter,
    EventResult, EventSubscription, ExecutionDataSubscription, ExecutionDataTransactionResult,
    ExecutionResult, FlowAddress, FlowId, HashAlgorithm, NodeVersionInfo, PrivateKey,
    ProtocolSnapshot, PublicKey, ScriptResponse,
    SignatureAlgorithm, Transaction, TransactionResult, TransactionSignature, TransactionStatus,
    UFix64,
};

/// Height of the last block the mock starts with.
pub const GENESIS_HEIGHT: u64 = 10;

pub const SERVICE_ADDRESS: &str = "f8d6e0586b0a20c7";

pub fn service_address() -> FlowAddress {
    SERVICE_ADDRESS.parse().expect("valid address")
}

pub fn block_id(height: u64) -> FlowId {
    FlowId::new(sha3_256(format!("block-{height}").as_bytes()))
}

/// Connector over `api` that polls every few milliseconds.
pub fn connector(api: Arc<MockAccessApi>, private_key: PrivateKey) -> AccessApiConnector {
    let polling = PollingConfig {
        interval_ms: 5,
        ..Default::default()
    };
    AccessApiConnector::with_polling(api, private_key, &polling)
}

pub fn event(event_type: &str, fields: Vec<(&str, CadenceValue)>) -> Event {
    let value = CadenceValue::Event(Composite {
        id: event_type.to_string(),
        fields: fields
            .into_iter()
            .map(|(name, value)| CompositeField {
                name: name.to_string(),
                value,
            })
            .collect(),
    });
    Event {
        event_type: event_type.to_string(),
        transaction_id: FlowId::default(),
        transaction_index: 0,
        event_index: 0,
        payload: value.encode().expect("encodable event"),
    }
}

/// One scripted step of a mock event stream.
#[derive(Debug, Clone)]
pub enum StreamStep {
    Batch(u64, Vec<Event>),
    Fail(String),
    Idle(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStart {
    BlockId(FlowId),
    Height(u64),
}

struct Staged {
    pending_polls: u32,
    expired: bool,
    result: TransactionResult,
}

#[derive(Default)]
struct NodeState {
    blocks: Vec<Block>,
    block_events: HashMap<u64, Vec<Event>>,
    accounts: BTreeMap<FlowAddress, Account>,
    transactions: HashMap<FlowId, Transaction>,
    results: HashMap<FlowId, Staged>,
    collections: HashMap<FlowId, Collection>,
    created_accounts: u64,
    pending_polls: u32,
    expire_transactions: bool,
    result_polls: u32,
    scripts_run: Vec<String>,
    streams: VecDeque<Vec<StreamStep>>,
    subscriptions: Vec<SubscriptionStart>,
}

pub struct MockAccessApi {
    state: Mutex<NodeState>,
}

impl Default for MockAccessApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAccessApi {
    pub fn new() -> Self {
        let mut state = NodeState::default();
        for _ in 0..=GENESIS_HEIGHT {
            state.push_block(Vec::new());
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// Register `address` with `public_key` at index 0, full weight.
    pub fn with_account(self, address: FlowAddress, public_key: &PublicKey, balance: &str) -> Self {
        {
            let mut state = self.lock();
            state.accounts.insert(
                address,
                Account {
                    address,
                    balance: balance.parse().expect("valid balance"),
                    keys: Vec::new(),
                    contracts: BTreeMap::new(),
                },
            );
        }
        self.add_key(address, public_key, AccountKey::FULL_WEIGHT);
        self
    }

    /// Results report `Pending` this many times before `Sealed`.
    pub fn with_pending_polls(self, polls: u32) -> Self {
        self.lock().pending_polls = polls;
        self
    }

    /// Accepted transactions never seal.
    pub fn expiring(self) -> Self {
        self.lock().expire_transactions = true;
        self
    }

    pub fn add_key(&self, address: FlowAddress, public_key: &PublicKey, weight: u32) {
        let mut state = self.lock();
        let account = state.accounts.get_mut(&address).expect("known account");
        let mut key = AccountKey::new(public_key, HashAlgorithm::Sha3_256, weight);
        key.index = account.keys.len() as u32;
        account.keys.push(key);
    }

    pub fn push_stream(&self, steps: Vec<StreamStep>) {
        self.lock().streams.push_back(steps);
    }

    pub fn account(&self, address: FlowAddress) -> Option<Account> {
        self.lock().accounts.get(&address).cloned()
    }

    pub fn latest_height(&self) -> u64 {
        self.lock().tip().height
    }

    pub fn result_polls(&self) -> u32 {
        self.lock().result_polls
    }

    pub fn subscriptions(&self) -> Vec<SubscriptionStart> {
        self.lock().subscriptions.clone()
    }

    pub fn scripts_run(&self) -> Vec<String> {
        self.lock().scripts_run.clone()
    }

    pub fn transaction(&self, id: FlowId) -> Option<Transaction> {
        self.lock().transactions.get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().expect("mock state poisoned")
    }

    async fn subscribe(&self, start: SubscriptionStart, filter: EventFilter) -> AccessResult<EventSubscription> {
        let steps = {
            let mut state = self.lock();
            state.subscriptions.push(start);
            state.streams.pop_front()
        };
        let steps = steps.ok_or_else(|| AccessError::Stream("subscription refused".to_string()))?;

        Ok(EventSubscription::spawn(16, move |sink| async move {
            for step in steps {
                match step {
                    StreamStep::Batch(height, events) => {
                        let batch = EventResult {
                            block_id: block_id(height),
                            block_height: height,
                            block_timestamp: Utc::now(),
                            events: events.into_iter().filter(|e| filter.matches(&e.event_type)).collect(),
                        };
                        if !sink.send(batch).await {
                            return;
                        }
                    }
                    StreamStep::Fail(message) => {
                        sink.send_error(AccessError::Stream(message)).await;
                    }
                    StreamStep::Idle(duration) => tokio::time::sleep(duration).await,
                }
            }
        }))
    }
}

impl NodeState {
    fn tip(&self) -> &Block {
        self.blocks.last().expect("genesis blocks")
    }

    fn push_block(&mut self, collection_guarantees: Vec<CollectionGuarantee>) -> Block {
        let height = self.blocks.len() as u64;
        let block = Block {
            id: block_id(height),
            parent_id: if height == 0 { FlowId::default() } else { block_id(height - 1) },
            height,
            timestamp: Utc::now(),
            collection_guarantees,
            block_seals: Vec::new(),
        };
        self.blocks.push(block.clone());
        block
    }

    fn block(&self, height: u64) -> AccessResult<&Block> {
        self.blocks
            .get(height as usize)
            .ok_or_else(|| AccessError::NotFound(format!("block at height {height}")))
    }

    fn block_by_id(&self, id: FlowId) -> AccessResult<&Block> {
        self.blocks
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| AccessError::NotFound(format!("block {id}")))
    }

    /// Execution data of `block`: one chunk per collection guarantee.
    fn execution_data(&self, block: &Block) -> BlockExecutionData {
        let events = self.block_events.get(&block.height).cloned().unwrap_or_default();
        let chunk_execution_data = block
            .collection_guarantees
            .iter()
            .filter_map(|g| self.collections.get(&g.collection_id))
            .map(|collection| ChunkExecutionData {
                transaction_ids: collection.transaction_ids.clone(),
                events: events.clone(),
                transaction_results: collection
                    .transaction_ids
                    .iter()
                    .filter_map(|id| self.results.get(id))
                    .map(|staged| ExecutionDataTransactionResult {
                        transaction_id: staged.result.transaction_id,
                        failed: staged.result.status_code != 0,
                        computation_used: staged.result.computation_usage,
                    })
                    .collect(),
            })
            .collect();
        BlockExecutionData {
            block_id: block.id,
            chunk_execution_data,
        }
    }

    fn snapshot(block: &Block) -> ProtocolSnapshot {
        ProtocolSnapshot::new(serde_json::to_vec(block).expect("serializable block"))
    }

    fn account(&self, address: FlowAddress) -> AccessResult<&Account> {
        self.accounts
            .get(&address)
            .ok_or_else(|| AccessError::NotFound(format!("account {address}")))
    }

    fn signature_weight(&self, signature: &TransactionSignature, message: &[u8]) -> AccessResult<u32> {
        let key = self
            .account(signature.address)?
            .key(signature.key_index)
            .ok_or_else(|| rejected(1008, "signature key not found"))?;
        let public_key = key
            .decode_public_key()
            .map_err(|e| rejected(1008, &e.to_string()))?;
        let valid = public_key
            .verify(&signature.signature, message, key.hash_algo)
            .map_err(|e| rejected(1008, &e.to_string()))?;
        if !valid {
            return Err(rejected(1008, &format!("invalid signature from {}", signature.address)));
        }
        Ok(key.weight)
    }

    /// Envelope signatures belong to the payer; every signer needs full weight.
    fn verify(&self, tx: &Transaction) -> AccessResult<()> {
        self.block_by_id(tx.reference_block_id)
            .map_err(|_| rejected(1002, "unknown reference block"))?;

        let payload = tagged(&tx.canonical_payload());
        let envelope = tagged(&tx.canonical_authorization_envelope());
        let mut weights: HashMap<FlowAddress, u32> = HashMap::new();

        for signature in &tx.payload_signatures {
            *weights.entry(signature.address).or_default() += self.signature_weight(signature, &payload)?;
        }
        let mut payer_weight = 0;
        for signature in &tx.envelope_signatures {
            if signature.address != tx.payer {
                return Err(rejected(1009, &format!("envelope signed by non-payer {}", signature.address)));
            }
            payer_weight += self.signature_weight(signature, &envelope)?;
        }
        if payer_weight < AccountKey::FULL_WEIGHT {
            return Err(rejected(1009, "payer envelope weight below threshold"));
        }
        *weights.entry(tx.payer).or_default() += payer_weight;

        for signer in tx.signer_list() {
            if weights.get(&signer).copied().unwrap_or_default() < AccountKey::FULL_WEIGHT {
                return Err(rejected(1008, &format!("missing signatures from {signer}")));
            }
        }

        let proposer = self.account(tx.proposal_key.address)?;
        let key = proposer
            .key(tx.proposal_key.key_index)
            .ok_or_else(|| rejected(1006, "proposal key not found"))?;
        if key.sequence_number != tx.proposal_key.sequence_number {
            return Err(rejected(
                1007,
                &format!(
                    "invalid proposal key: expected sequence number {}, got {}",
                    key.sequence_number, tx.proposal_key.sequence_number
                ),
            ));
        }
        Ok(())
    }

    fn bump_sequence(&mut self, tx: &Transaction) {
        if let Some(key) = self
            .accounts
            .get_mut(&tx.proposal_key.address)
            .and_then(|a| a.keys.get_mut(tx.proposal_key.key_index as usize))
        {
            key.sequence_number += 1;
        }
    }

    /// Apply the bundled transaction scripts; anything else succeeds without effect.
    fn execute(&mut self, tx: &Transaction) -> Result<Vec<(String, Vec<(&'static str, CadenceValue)>)>, String> {
        let source = String::from_utf8_lossy(&tx.script).into_owned();
        let args = decode_arguments(&tx.arguments).map_err(|e| e.to_string())?;
        let signer = tx.authorizers.first().copied().unwrap_or(tx.payer);

        if is_script(&source, "create_account.cdc") {
            let public_key = arg(&args, 0)?.as_str().map_err(|e| e.to_string())?;
            let algorithm = uint8(arg(&args, 1)?)
                .and_then(SignatureAlgorithm::from_cadence_index)
                .ok_or("invalid signature algorithm")?;
            let hash = uint8(arg(&args, 2)?)
                .and_then(HashAlgorithm::from_cadence_index)
                .ok_or("invalid hash algorithm")?;
            let public_key = PublicKey::from_hex(public_key, algorithm).map_err(|e| e.to_string())?;

            self.created_accounts += 1;
            let address = FlowAddress::from_slice(&(0x01cf_0e2f_2f71_5400 + self.created_accounts).to_be_bytes())
                .map_err(|e| e.to_string())?;
            let key = AccountKey::new(&public_key, hash, AccountKey::FULL_WEIGHT);
            self.accounts.insert(
                address,
                Account {
                    address,
                    balance: UFix64::from_raw(100_000),
                    keys: vec![key],
                    contracts: BTreeMap::new(),
                },
            );
            return Ok(vec![(
                "flow.AccountCreated".to_string(),
                vec![("address", CadenceValue::address(address))],
            )]);
        }

        if is_script(&source, "add_key.cdc") {
            let public_key = arg(&args, 0)?.as_str().map_err(|e| e.to_string())?;
            let algorithm = uint8(arg(&args, 1)?)
                .and_then(SignatureAlgorithm::from_cadence_index)
                .ok_or("invalid signature algorithm")?;
            let hash = uint8(arg(&args, 2)?)
                .and_then(HashAlgorithm::from_cadence_index)
                .ok_or("invalid hash algorithm")?;
            let weight = arg(&args, 3)?.as_ufix64().map_err(|e| e.to_string())?;
            let public_key = PublicKey::from_hex(public_key, algorithm).map_err(|e| e.to_string())?;

            let account = self.accounts.get_mut(&signer).ok_or("signer account not found")?;
            let mut key = AccountKey::new(&public_key, hash, weight.integer_part() as u32);
            key.index = account.keys.len() as u32;
            account.keys.push(key);
            return Ok(vec![(
                "flow.AccountKeyAdded".to_string(),
                vec![("address", CadenceValue::address(signer))],
            )]);
        }

        if is_script(&source, "deploy_contract.cdc") {
            let name = arg(&args, 0)?.as_str().map_err(|e| e.to_string())?.to_string();
            let code = hex::decode(arg(&args, 1)?.as_str().map_err(|e| e.to_string())?)
                .map_err(|e| e.to_string())?;
            let code = String::from_utf8(code).map_err(|e| e.to_string())?;

            let account = self.accounts.get_mut(&signer).ok_or("signer account not found")?;
            if account.contracts.contains_key(&name) {
                return Err(format!("cannot overwrite existing contract with name \"{name}\""));
            }
            account.contracts.insert(name.clone(), code);
            return Ok(vec![(
                "flow.AccountContractAdded".to_string(),
                vec![
                    ("address", CadenceValue::address(signer)),
                    ("contract", CadenceValue::string(name)),
                ],
            )]);
        }

        if is_script(&source, "transfer_flow.cdc") {
            let amount = arg(&args, 0)?.as_ufix64().map_err(|e| e.to_string())?;
            let recipient = arg(&args, 1)?.as_address().map_err(|e| e.to_string())?;
            if !self.accounts.contains_key(&recipient) {
                return Err("Could not borrow receiver reference to the recipient's Vault".to_string());
            }

            let sender = self.accounts.get_mut(&signer).ok_or("signer account not found")?;
            sender.balance = sender
                .balance
                .checked_sub(amount)
                .ok_or("Amount withdrawn must be less than or equal than the balance of the Vault")?;
            if let Some(receiver) = self.accounts.get_mut(&recipient) {
                receiver.balance = receiver.balance.checked_add(amount).ok_or("balance overflow")?;
            }
            return Ok(vec![
                (
                    "A.0ae53cb6e3f42a79.FlowToken.TokensWithdrawn".to_string(),
                    vec![("amount", CadenceValue::ufix64(amount))],
                ),
                (
                    "A.0ae53cb6e3f42a79.FlowToken.TokensDeposited".to_string(),
                    vec![("amount", CadenceValue::ufix64(amount))],
                ),
            ]);
        }

        Ok(Vec::new())
    }

    fn run_script(&mut self, script: &[u8], arguments: &[Vec<u8>]) -> AccessResult<CadenceValue> {
        let source = String::from_utf8_lossy(script).into_owned();
        self.scripts_run.push(source.clone());
        let args = decode_arguments(arguments)?;
        let invalid = |e: String| AccessError::Status {
            status: 400,
            message: format!("[Error Code: 1101] {e}"),
        };

        if is_script(&source, "execute_simple_script_example.cdc") {
            let a: i64 = match arg(&args, 0).map_err(invalid)? {
                CadenceValue::Int(v) => v.parse().map_err(|_| invalid("invalid Int".to_string()))?,
                _ => return Err(invalid("expected Int".to_string())),
            };
            return Ok(CadenceValue::int(a + 10));
        }

        if is_script(&source, "execute_complex_script_example.cdc") {
            let name = arg(&args, 0).map_err(invalid)?.clone();
            return Ok(CadenceValue::Struct(Composite {
                id: "s.0000.User".to_string(),
                fields: vec![
                    field("balance", CadenceValue::UFix64("10.00000000".to_string())),
                    field("address", CadenceValue::Address("0x0000000000000001".to_string())),
                    field("name", name),
                ],
            }));
        }

        if is_script(&source, "user_signature.cdc") {
            return self.verify_key_list(&args).map(CadenceValue::bool).map_err(invalid);
        }

        if is_script(&source, "user_signature_validate_all.cdc") {
            return self.verify_account_keys(&args).map(CadenceValue::bool).map_err(invalid);
        }

        if is_script(&source, "user_signature_validate_any.cdc") {
            return self.verify_any_key(&args).map(CadenceValue::bool).map_err(invalid);
        }

        Err(invalid("script not supported by the mock node".to_string()))
    }

    fn verify_key_list(&self, args: &[CadenceValue]) -> Result<bool, String> {
        let keys = arg(args, 0)?.as_array().map_err(|e| e.to_string())?;
        let weights = arg(args, 1)?.as_array().map_err(|e| e.to_string())?;
        let signatures = arg(args, 2)?.as_array().map_err(|e| e.to_string())?;
        let to = arg(args, 3)?.as_address().map_err(|e| e.to_string())?;
        let from = arg(args, 4)?.as_address().map_err(|e| e.to_string())?;
        let amount = arg(args, 5)?.as_ufix64().map_err(|e| e.to_string())?;

        let mut message = to.as_bytes().to_vec();
        message.extend_from_slice(from.as_bytes());
        // UFix64.toBigEndianBytes(): the scaled value as eight bytes
        message.extend_from_slice(&amount.raw().to_be_bytes());

        let mut total = 0u64;
        for (i, signature) in signatures.iter().enumerate() {
            let key_hex = keys.get(i).ok_or("missing key")?.as_str().map_err(|e| e.to_string())?;
            let public_key = PublicKey::from_hex(key_hex, SignatureAlgorithm::EcdsaP256).map_err(|e| e.to_string())?;
            if !verify_hex(&public_key, signature, &message, HashAlgorithm::Sha3_256)? {
                return Ok(false);
            }
            total += weights.get(i).ok_or("missing weight")?.as_ufix64().map_err(|e| e.to_string())?.raw();
        }
        Ok(total >= UFix64::from_raw(100_000_000).raw())
    }

    fn verify_account_keys(&self, args: &[CadenceValue]) -> Result<bool, String> {
        let address = arg(args, 0)?.as_address().map_err(|e| e.to_string())?;
        let signatures = arg(args, 1)?.as_array().map_err(|e| e.to_string())?;
        let indexes = arg(args, 2)?.as_array().map_err(|e| e.to_string())?;
        let message = arg(args, 3)?.as_str().map_err(|e| e.to_string())?;
        let account = self.account(address).map_err(|e| e.to_string())?;

        let mut total = 0u32;
        for (i, signature) in signatures.iter().enumerate() {
            let index: u32 = match indexes.get(i) {
                Some(CadenceValue::Int(v)) => v.parse().map_err(|_| "invalid key index")?,
                _ => return Ok(false),
            };
            let Some(key) = account.key(index).filter(|k| !k.revoked) else {
                return Ok(false);
            };
            let public_key = key.decode_public_key().map_err(|e| e.to_string())?;
            if !verify_hex(&public_key, signature, message.as_bytes(), key.hash_algo)? {
                return Ok(false);
            }
            total += key.weight;
        }
        Ok(total >= AccountKey::FULL_WEIGHT)
    }

    fn verify_any_key(&self, args: &[CadenceValue]) -> Result<bool, String> {
        let address = arg(args, 0)?.as_address().map_err(|e| e.to_string())?;
        let signature = arg(args, 1)?;
        let message = arg(args, 2)?.as_str().map_err(|e| e.to_string())?;
        let account = self.account(address).map_err(|e| e.to_string())?;

        for key in account.keys.iter().filter(|k| !k.revoked) {
            let public_key = key.decode_public_key().map_err(|e| e.to_string())?;
            if verify_hex(&public_key, signature, message.as_bytes(), key.hash_algo)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn rejected(code: u32, message: &str) -> AccessError {
    AccessError::Status {
        status: 400,
        message: format!("[Error Code: {code}] {message}"),
    }
}

fn tagged(message: &[u8]) -> Vec<u8> {
    let mut out = TRANSACTION_DOMAIN_TAG.to_vec();
    out.extend_from_slice(message);
    out
}

fn is_script(source: &str, name: &str) -> bool {
    load_script_content(name).map(|s| s == source).unwrap_or(false)
}

fn decode_arguments(arguments: &[Vec<u8>]) -> AccessResult<Vec<CadenceValue>> {
    arguments
        .iter()
        .map(|a| CadenceValue::decode(a).map_err(|e| AccessError::InvalidRequest(e.to_string())))
        .collect()
}

fn arg(args: &[CadenceValue], index: usize) -> Result<&CadenceValue, String> {
    args.get(index).ok_or_else(|| format!("missing argument {index}"))
}

fn uint8(value: &CadenceValue) -> Option<u8> {
    match value {
        CadenceValue::UInt8(v) => v.parse().ok(),
        _ => None,
    }
}

fn field(name: &str, value: CadenceValue) -> CompositeField {
    CompositeField {
        name: name.to_string(),
        value,
    }
}

fn verify_hex(
    public_key: &PublicKey,
    signature: &CadenceValue,
    message: &[u8],
    hash: HashAlgorithm,
) -> Result<bool, String> {
    let signature = hex::decode(signature.as_str().map_err(|e| e.to_string())?).map_err(|e| e.to_string())?;
    public_key.verify(&signature, message, hash).map_err(|e| e.to_string())
}

#[async_trait]
impl AccessApi for MockAccessApi {
    async fn ping(&self) -> AccessResult<()> {
        Ok(())
    }

    async fn get_latest_block_header(&self, sealed: bool) -> AccessResult<BlockHeader> {
        Ok(self.get_latest_block(sealed).await?.header())
    }

    async fn get_block_header_by_id(&self, id: FlowId) -> AccessResult<BlockHeader> {
        Ok(self.lock().block_by_id(id)?.header())
    }

    async fn get_block_header_by_height(&self, height: u64) -> AccessResult<BlockHeader> {
        Ok(self.lock().block(height)?.header())
    }

    async fn get_latest_block(&self, _sealed: bool) -> AccessResult<Block> {
        Ok(self.lock().tip().clone())
    }

    async fn get_block_by_id(&self, id: FlowId) -> AccessResult<Block> {
        Ok(self.lock().block_by_id(id)?.clone())
    }

    async fn get_block_by_height(&self, height: u64) -> AccessResult<Block> {
        Ok(self.lock().block(height)?.clone())
    }

    async fn get_account_at_latest_block(&self, address: FlowAddress) -> AccessResult<Account> {
        Ok(self.lock().account(address)?.clone())
    }

    async fn get_account_by_block_height(&self, address: FlowAddress, height: u64) -> AccessResult<Account> {
        let state = self.lock();
        state.block(height)?;
        Ok(state.account(address)?.clone())
    }

    async fn get_account_balance_at_latest_block(&self, address: FlowAddress) -> AccessResult<UFix64> {
        Ok(self.lock().account(address)?.balance)
    }

    async fn get_account_balance_at_block_height(&self, address: FlowAddress, height: u64) -> AccessResult<UFix64> {
        Ok(self.get_account_by_block_height(address, height).await?.balance)
    }

    async fn get_account_key_at_latest_block(&self, address: FlowAddress, key_index: u32) -> AccessResult<AccountKey> {
        self.lock()
            .account(address)?
            .key(key_index)
            .cloned()
            .ok_or_else(|| AccessError::NotFound(format!("key {key_index} of {address}")))
    }

    async fn get_account_key_at_block_height(
        &self,
        address: FlowAddress,
        key_index: u32,
        height: u64,
    ) -> AccessResult<AccountKey> {
        self.lock().block(height)?;
        self.get_account_key_at_latest_block(address, key_index).await
    }

    async fn get_account_keys_at_latest_block(&self, address: FlowAddress) -> AccessResult<Vec<AccountKey>> {
        Ok(self.lock().account(address)?.keys.clone())
    }

    async fn get_account_keys_at_block_height(&self, address: FlowAddress, height: u64) -> AccessResult<Vec<AccountKey>> {
        Ok(self.get_account_by_block_height(address, height).await?.keys)
    }

    async fn get_collection_by_id(&self, id: FlowId) -> AccessResult<Collection> {
        self.lock()
            .collections
            .get(&id)
            .cloned()
            .ok_or_else(|| AccessError::NotFound(format!("collection {id}")))
    }

    async fn get_full_collection_by_id(&self, id: FlowId) -> AccessResult<Vec<Transaction>> {
        let collection = self.get_collection_by_id(id).await?;
        let state = self.lock();
        Ok(collection
            .transaction_ids
            .iter()
            .filter_map(|tx_id| state.transactions.get(tx_id).cloned())
            .collect())
    }

    async fn send_transaction(&self, transaction: &Transaction) -> AccessResult<FlowId> {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.verify(transaction)?;
        state.bump_sequence(transaction);

        let id = transaction.id();
        let outcome = state.execute(transaction);

        let collection_id = FlowId::new(sha3_256(id.as_bytes()));
        let block = state.push_block(vec![CollectionGuarantee {
            collection_id,
            signer_ids: Vec::new(),
        }]);

        let (events, status_code, error_message) = match outcome {
            Ok(events) => {
                let events: Vec<Event> = events
                    .into_iter()
                    .enumerate()
                    .map(|(i, (event_type, fields))| Event {
                        transaction_id: id,
                        event_index: i as u32,
                        ..event(&event_type, fields)
                    })
                    .collect();
                (events, 0, String::new())
            }
            Err(message) => (Vec::new(), 1, format!("[Error Code: 1101] error caused by: {message}")),
        };

        state.block_events.insert(block.height, events.clone());
        state.collections.insert(
            collection_id,
            Collection {
                id: collection_id,
                transaction_ids: vec![id],
            },
        );
        state.transactions.insert(id, transaction.clone());
        state.results.insert(
            id,
            Staged {
                pending_polls: state.pending_polls,
                expired: state.expire_transactions,
                result: TransactionResult {
                    transaction_id: id,
                    status: TransactionStatus::Sealed,
                    status_code,
                    error_message,
                    events,
                    block_id: block.id,
                    block_height: block.height,
                    collection_id: Some(collection_id),
                    computation_usage: 12,
                },
            },
        );
        Ok(id)
    }

    async fn get_transaction_by_id(&self, id: FlowId) -> AccessResult<Transaction> {
        self.transaction(id)
            .ok_or_else(|| AccessError::NotFound(format!("transaction {id}")))
    }

    async fn get_transaction_result_by_id(&self, id: FlowId) -> AccessResult<TransactionResult> {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.result_polls += 1;
        let staged = state
            .results
            .get_mut(&id)
            .ok_or_else(|| AccessError::NotFound(format!("transaction result {id}")))?;

        let status = if staged.expired {
            TransactionStatus::Expired
        } else if staged.pending_polls > 0 {
            staged.pending_polls -= 1;
            TransactionStatus::Pending
        } else {
            return Ok(staged.result.clone());
        };
        Ok(TransactionResult {
            transaction_id: id,
            status,
            status_code: 0,
            error_message: String::new(),
            events: Vec::new(),
            block_id: FlowId::default(),
            block_height: 0,
            collection_id: None,
            computation_usage: 0,
        })
    }

    async fn execute_script_at_latest_block(&self, script: &[u8], arguments: &[Vec<u8>]) -> AccessResult<ScriptResponse> {
        let value = self.lock().run_script(script, arguments)?;
        let bytes = value.encode().map_err(|e| AccessError::Decode(e.to_string()))?;
        Ok(ScriptResponse::new(bytes))
    }

    async fn execute_script_at_block_id(
        &self,
        script: &[u8],
        arguments: &[Vec<u8>],
        block_id: FlowId,
    ) -> AccessResult<ScriptResponse> {
        self.lock().block_by_id(block_id)?;
        self.execute_script_at_latest_block(script, arguments).await
    }

    async fn execute_script_at_block_height(
        &self,
        script: &[u8],
        arguments: &[Vec<u8>],
        height: u64,
    ) -> AccessResult<ScriptResponse> {
        self.lock().block(height)?;
        self.execute_script_at_latest_block(script, arguments).await
    }

    async fn get_events_for_height_range(
        &self,
        event_type: &str,
        start_height: u64,
        end_height: u64,
    ) -> AccessResult<Vec<EventResult>> {
        let state = self.lock();
        let end = end_height.min(state.tip().height);
        (start_height..=end)
            .map(|height| -> AccessResult<EventResult> {
                let block = state.block(height)?;
                Ok(EventResult {
                    block_id: block.id,
                    block_height: block.height,
                    block_timestamp: block.timestamp,
                    events: state
                        .block_events
                        .get(&height)
                        .map(|events| events.iter().filter(|e| e.event_type == event_type).cloned().collect())
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn get_events_for_block_ids(&self, event_type: &str, block_ids: &[FlowId]) -> AccessResult<Vec<EventResult>> {
        let mut results = Vec::with_capacity(block_ids.len());
        for id in block_ids {
            let height = self.lock().block_by_id(*id)?.height;
            results.extend(self.get_events_for_height_range(event_type, height, height).await?);
        }
        Ok(results)
    }

    async fn get_network_parameters(&self) -> AccessResult<ChainId> {
        Ok(ChainId::Emulator)
    }

    async fn get_node_version_info(&self) -> AccessResult<NodeVersionInfo> {
        Ok(NodeVersionInfo {
            semver: "v1.0.0".to_string(),
            commit: "mock".to_string(),
            spork_id: block_id(0),
            protocol_version: 0,
            spork_root_block_height: 0,
            node_root_block_height: 0,
            compatible_range: None,
        })
    }

    async fn get_execution_result_by_block_id(&self, block_id: FlowId) -> AccessResult<ExecutionResult> {
        let block = self.lock().block_by_id(block_id)?.clone();
        Ok(ExecutionResult {
            id: FlowId::new(sha3_256(block.id.as_bytes())),
            block_id: block.id,
            previous_result_id: FlowId::new(sha3_256(block.parent_id.as_bytes())),
            chunks: Vec::new(),
            service_events: Vec::new(),
        })
    }

    async fn get_latest_protocol_state_snapshot(&self) -> AccessResult<ProtocolSnapshot> {
        Ok(NodeState::snapshot(self.lock().tip()))
    }

    async fn get_protocol_state_snapshot_by_block_id(&self, block_id: FlowId) -> AccessResult<ProtocolSnapshot> {
        Ok(NodeState::snapshot(self.lock().block_by_id(block_id)?))
    }

    async fn get_protocol_state_snapshot_by_height(&self, height: u64) -> AccessResult<ProtocolSnapshot> {
        Ok(NodeState::snapshot(self.lock().block(height)?))
    }

    async fn subscribe_events_by_block_id(&self, start_block_id: FlowId, filter: EventFilter) -> AccessResult<EventSubscription> {
        self.subscribe(SubscriptionStart::BlockId(start_block_id), filter).await
    }

    async fn subscribe_events_by_block_height(&self, start_height: u64, filter: EventFilter) -> AccessResult<EventSubscription> {
        self.subscribe(SubscriptionStart::Height(start_height), filter).await
    }

    /// Streams the execution data of every block from the start block to the tip, then ends.
    async fn subscribe_execution_data_by_block_id(&self, start_block_id: FlowId) -> AccessResult<ExecutionDataSubscription> {
        let batches: Vec<BlockExecutionData> = {
            let mut state = self.lock();
            state.subscriptions.push(SubscriptionStart::BlockId(start_block_id));
            let start = state.block_by_id(start_block_id)?.height;
            state.blocks[start as usize..]
                .iter()
                .map(|block| state.execution_data(block))
                .collect()
        };

        Ok(ExecutionDataSubscription::spawn(16, move |sink| async move {
            for batch in batches {
                if !sink.send(batch).await {
                    return;
                }
            }
        }))
    }
}

/// A request as seen by [`start_routed_backend`].
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

/// Serve HTTP/1.1 on an ephemeral port, answering each request with `handler`.
pub async fn start_routed_backend<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = handler(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Accept connections and never answer them.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// A WebSocket access node accepting one subscription.
pub struct WsBackend {
    pub addr: SocketAddr,
    /// The subscribe request the client sent.
    pub requests: mpsc::UnboundedReceiver<serde_json::Value>,
    /// Fires once the client side of the socket is gone.
    pub closed: oneshot::Receiver<()>,
}

/// Accept one WebSocket connection, read the subscribe request, then push `frames` in order.
pub async fn start_ws_backend(frames: Vec<Message>) -> WsBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (request_tx, requests) = mpsc::unbounded_channel();
    let (closed_tx, closed) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut socket) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };

        if let Some(Ok(Message::Text(text))) = socket.next().await {
            if let Ok(json) = serde_json::from_str(text.as_str()) {
                let _ = request_tx.send(json);
            }
        }
        for frame in frames {
            if socket.send(frame).await.is_err() {
                break;
            }
        }
        while let Some(Ok(msg)) = socket.next().await {
            if msg.is_close() {
                break;
            }
        }
        let _ = closed_tx.send(());
    });

    WsBackend { addr, requests, closed }
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<Request> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let (path, query) = target.split_once('?').unwrap_or((target.as_str(), ""));
    Some(Request {
        method,
        path: path.to_string(),
        query: query.to_string(),
        body: String::from_utf8_lossy(&buf[header_end..]).into_owned(),
    })
}

pub fn generate_key() -> PrivateKey {
    PrivateKey::generate(SignatureAlgorithm::EcdsaP256)
}

pub fn wait(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
