//! The Access API client handle every example is built on.
//!
//! # Responsibilities
//! - Define the node operations as an async trait so examples take any binding
//! - Carry streamed event batches and execution data through [`Subscription`]
//! - Offer the script request builder used by script examples

use std::future::Future;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::sdk::cadence::{CadenceError, CadenceValue};
use crate::sdk::error::{AccessError, AccessResult};
use crate::sdk::transaction::Transaction;
use crate::sdk::types::{
    Account, AccountKey, Block, BlockEvents, BlockExecutionData, BlockHeader, ChainId, Collection,
    EventResult, ExecutionResult, FlowAddress, FlowId, NodeVersionInfo, ProtocolSnapshot,
    TransactionResult, UFix64,
};

/// Raw JSON-Cadence bytes returned by a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptResponse {
    pub bytes: Vec<u8>,
}

impl ScriptResponse {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn value(&self) -> Result<CadenceValue, CadenceError> {
        CadenceValue::decode(&self.bytes)
    }

    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Which events a subscription delivers. Empty lists match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub event_types: Vec<String>,
    pub addresses: Vec<FlowAddress>,
    pub contracts: Vec<String>,
}

impl EventFilter {
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types.push(event_type.into());
        self
    }

    /// The event type matches the type list (when non-empty).
    pub fn matches(&self, event_type: &str) -> bool {
        let type_ok = self.event_types.is_empty() || self.event_types.iter().any(|t| t == event_type);
        let contract_ok = self.contracts.is_empty()
            || self.contracts.iter().any(|c| event_type.starts_with(c.as_str()));
        type_ok && contract_ok
    }
}

/// Client handle to a Flow access node.
#[async_trait]
pub trait AccessApi: Send + Sync {
    async fn ping(&self) -> AccessResult<()>;

    async fn get_latest_block_header(&self, sealed: bool) -> AccessResult<BlockHeader>;
    async fn get_block_header_by_id(&self, id: FlowId) -> AccessResult<BlockHeader>;
    async fn get_block_header_by_height(&self, height: u64) -> AccessResult<BlockHeader>;

    async fn get_latest_block(&self, sealed: bool) -> AccessResult<Block>;
    async fn get_block_by_id(&self, id: FlowId) -> AccessResult<Block>;
    async fn get_block_by_height(&self, height: u64) -> AccessResult<Block>;

    async fn get_account_at_latest_block(&self, address: FlowAddress) -> AccessResult<Account>;
    async fn get_account_by_block_height(&self, address: FlowAddress, height: u64) -> AccessResult<Account>;

    async fn get_account_balance_at_latest_block(&self, address: FlowAddress) -> AccessResult<UFix64>;
    async fn get_account_balance_at_block_height(&self, address: FlowAddress, height: u64) -> AccessResult<UFix64>;

    async fn get_account_key_at_latest_block(&self, address: FlowAddress, key_index: u32) -> AccessResult<AccountKey>;
    async fn get_account_key_at_block_height(
        &self,
        address: FlowAddress,
        key_index: u32,
        height: u64,
    ) -> AccessResult<AccountKey>;
    async fn get_account_keys_at_latest_block(&self, address: FlowAddress) -> AccessResult<Vec<AccountKey>>;
    async fn get_account_keys_at_block_height(&self, address: FlowAddress, height: u64) -> AccessResult<Vec<AccountKey>>;

    async fn get_collection_by_id(&self, id: FlowId) -> AccessResult<Collection>;
    /// Every transaction of a collection.
    async fn get_full_collection_by_id(&self, id: FlowId) -> AccessResult<Vec<Transaction>>;

    /// Submit a signed transaction, returning its ID.
    async fn send_transaction(&self, transaction: &Transaction) -> AccessResult<FlowId>;
    async fn get_transaction_by_id(&self, id: FlowId) -> AccessResult<Transaction>;
    async fn get_transaction_result_by_id(&self, id: FlowId) -> AccessResult<TransactionResult>;

    async fn execute_script_at_latest_block(&self, script: &[u8], arguments: &[Vec<u8>]) -> AccessResult<ScriptResponse>;
    async fn execute_script_at_block_id(
        &self,
        script: &[u8],
        arguments: &[Vec<u8>],
        block_id: FlowId,
    ) -> AccessResult<ScriptResponse>;
    async fn execute_script_at_block_height(
        &self,
        script: &[u8],
        arguments: &[Vec<u8>],
        height: u64,
    ) -> AccessResult<ScriptResponse>;

    async fn get_events_for_height_range(
        &self,
        event_type: &str,
        start_height: u64,
        end_height: u64,
    ) -> AccessResult<Vec<EventResult>>;
    async fn get_events_for_block_ids(&self, event_type: &str, block_ids: &[FlowId]) -> AccessResult<Vec<EventResult>>;

    async fn get_network_parameters(&self) -> AccessResult<ChainId>;
    async fn get_node_version_info(&self) -> AccessResult<NodeVersionInfo>;
    async fn get_execution_result_by_block_id(&self, block_id: FlowId) -> AccessResult<ExecutionResult>;

    /// Serialized protocol state at the latest sealed block.
    async fn get_latest_protocol_state_snapshot(&self) -> AccessResult<ProtocolSnapshot>;
    async fn get_protocol_state_snapshot_by_block_id(&self, block_id: FlowId) -> AccessResult<ProtocolSnapshot>;
    async fn get_protocol_state_snapshot_by_height(&self, height: u64) -> AccessResult<ProtocolSnapshot>;

    async fn subscribe_events_by_block_id(&self, start_block_id: FlowId, filter: EventFilter) -> AccessResult<EventSubscription>;
    async fn subscribe_events_by_block_height(&self, start_height: u64, filter: EventFilter) -> AccessResult<EventSubscription>;
    /// Stream the execution data of every block from `start_block_id` on.
    async fn subscribe_execution_data_by_block_id(&self, start_block_id: FlowId) -> AccessResult<ExecutionDataSubscription>;
}

/// Streamed event batches.
pub type EventSubscription = Subscription<BlockEvents>;

/// Streamed block execution data.
pub type ExecutionDataSubscription = Subscription<BlockExecutionData>;

/// Producer half of a subscription, owned by the background task.
#[derive(Debug)]
pub struct SubscriptionSink<T> {
    data: mpsc::Sender<T>,
    errors: mpsc::Sender<AccessError>,
}

impl<T> Clone for SubscriptionSink<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            errors: self.errors.clone(),
        }
    }
}

impl<T> SubscriptionSink<T> {
    /// Deliver one message; `false` once the consumer is gone.
    pub async fn send(&self, item: T) -> bool {
        self.data.send(item).await.is_ok()
    }

    pub async fn send_error(&self, error: AccessError) -> bool {
        self.errors.send(error).await.is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.data.is_closed()
    }
}

/// A live stream: a data endpoint, an error endpoint and the task feeding them.
///
/// Dropping the subscription or calling [`cancel`](Self::cancel) stops the task.
#[derive(Debug)]
pub struct Subscription<T> {
    pub data: mpsc::Receiver<T>,
    pub errors: mpsc::Receiver<AccessError>,
    task: Option<JoinHandle<()>>,
    data_closed: bool,
    errors_closed: bool,
}

impl<T: Send + 'static> Subscription<T> {
    /// Start `producer` on the runtime with channels of `capacity` messages.
    pub fn spawn<F, Fut>(capacity: usize, producer: F) -> Self
    where
        F: FnOnce(SubscriptionSink<T>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (data_tx, data) = mpsc::channel(capacity.max(1));
        let (errors_tx, errors) = mpsc::channel(capacity.max(1));
        let sink = SubscriptionSink {
            data: data_tx,
            errors: errors_tx,
        };
        let task = tokio::spawn(producer(sink));
        Self {
            data,
            errors,
            task: Some(task),
            data_closed: false,
            errors_closed: false,
        }
    }

    /// Next message from either endpoint; data drains before errors.
    /// `None` once both endpoints are closed.
    pub async fn next(&mut self) -> Option<AccessResult<T>> {
        loop {
            if self.data_closed && self.errors_closed {
                return None;
            }
            tokio::select! {
                biased;
                msg = self.data.recv(), if !self.data_closed => match msg {
                    Some(events) => return Some(Ok(events)),
                    None => self.data_closed = true,
                },
                msg = self.errors.recv(), if !self.errors_closed => match msg {
                    Some(err) => return Some(Err(err)),
                    None => self.errors_closed = true,
                },
            }
        }
    }

    /// Stop the producer task and close both endpoints.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.data.close();
        self.errors.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.task.is_none()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Block a script runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptTarget {
    #[default]
    Latest,
    BlockId(FlowId),
    Height(u64),
}

/// Script source, arguments and target block.
#[derive(Debug, Clone, Default)]
pub struct ScriptRequest {
    script: Vec<u8>,
    arguments: Vec<CadenceValue>,
    target: ScriptTarget,
}

impl ScriptRequest {
    pub fn new(script: impl Into<Vec<u8>>) -> Self {
        Self {
            script: script.into(),
            ..Default::default()
        }
    }

    pub fn script(mut self, script: impl Into<Vec<u8>>) -> Self {
        self.script = script.into();
        self
    }

    pub fn arg(mut self, argument: CadenceValue) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn args(mut self, arguments: impl IntoIterator<Item = CadenceValue>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn at_block_id(mut self, block_id: FlowId) -> Self {
        self.target = ScriptTarget::BlockId(block_id);
        self
    }

    pub fn at_height(mut self, height: u64) -> Self {
        self.target = ScriptTarget::Height(height);
        self
    }

    pub fn target(&self) -> ScriptTarget {
        self.target
    }

    pub fn encoded_arguments(&self) -> Result<Vec<Vec<u8>>, CadenceError> {
        self.arguments.iter().map(CadenceValue::encode).collect()
    }
}

/// Conveniences layered over any [`AccessApi`].
#[async_trait]
pub trait AccessApiExt: AccessApi {
    /// Run a script built with [`ScriptRequest`] against its target block.
    async fn simple_script(&self, request: ScriptRequest) -> AccessResult<ScriptResponse> {
        let arguments = request
            .encoded_arguments()
            .map_err(|e| AccessError::InvalidRequest(e.to_string()))?;
        match request.target {
            ScriptTarget::Latest => self.execute_script_at_latest_block(&request.script, &arguments).await,
            ScriptTarget::BlockId(id) => self.execute_script_at_block_id(&request.script, &arguments, id).await,
            ScriptTarget::Height(height) => {
                self.execute_script_at_block_height(&request.script, &arguments, height).await
            }
        }
    }
}

impl<T: AccessApi + ?Sized> AccessApiExt for T {}
