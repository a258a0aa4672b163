//! [`AccessApi`] binding for the Flow HTTP Access API.
//!
//! # Responsibilities
//! - Map every trait operation onto a `/v1` REST endpoint
//! - Translate wire encodings (base64 scripts, hex IDs, stringified numbers)
//! - Bound every request with the configured timeout; fail over across endpoints
//! - Stream events over the `/v1/ws` WebSocket endpoint
//!
//! Only transport failures and timeouts move on to the next endpoint. An HTTP
//! error status is the node's answer and is returned as is.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::config::schema::AccessConfig;
use crate::sdk::access::{AccessApi, EventFilter, EventSubscription, ExecutionDataSubscription, ScriptResponse};
use crate::sdk::error::{AccessError, AccessResult};
use crate::sdk::transaction::Transaction;
use crate::sdk::types::{
    Account, AccountKey, Block, BlockHeader, ChainId, Collection, EventResult, ExecutionResult,
    FlowAddress, FlowId, NodeVersionInfo, ProtocolSnapshot, TransactionResult, UFix64,
};

/// Messages buffered per subscription endpoint.
const STREAM_CAPACITY: usize = 64;

/// REST client over one primary and optional failover access nodes.
#[derive(Clone)]
pub struct RestAccessApi {
    client: reqwest::Client,
    endpoints: Vec<Url>,
    ws_url: Url,
    timeout_duration: Duration,
    config: AccessConfig,
}

impl RestAccessApi {
    /// Build the client and verify the node's chain.
    ///
    /// A chain mismatch or unreachable node is logged, not fatal.
    pub async fn new(config: AccessConfig) -> AccessResult<Self> {
        let api = Self::build(config)?;

        match api.verify_chain_id().await {
            Ok(chain_id) => {
                tracing::info!(
                    rest_url = %api.config.rest_url,
                    chain_id = %chain_id,
                    "Access client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Access client initialized but chain verification failed"
                );
            }
        }

        Ok(api)
    }

    /// Build the client without contacting the node.
    pub fn build(config: AccessConfig) -> AccessResult<Self> {
        let mut endpoints = vec![parse_url(&config.rest_url)?];
        for url_str in &config.failover_urls {
            match Url::parse(url_str) {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover access URL"),
            }
        }

        let ws_url = match &config.ws_url {
            Some(url) => parse_url(url)?,
            None => websocket_url(&endpoints[0])?,
        };

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AccessError::transport("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            endpoints,
            ws_url,
            timeout_duration: Duration::from_secs(config.request_timeout_secs),
            config,
        })
    }

    /// Compare the node's chain with the configured one, if any.
    pub async fn verify_chain_id(&self) -> AccessResult<ChainId> {
        let actual = self.get_network_parameters().await?;
        if let Some(expected) = &self.config.chain_id {
            let expected = ChainId::from_name(expected);
            if expected != actual {
                return Err(AccessError::InvalidRequest(format!(
                    "chain id mismatch: expected {}, got {}",
                    expected, actual
                )));
            }
        }
        Ok(actual)
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    fn endpoint(base: &Url, path: &str) -> String {
        format!("{}/v1/{}", base.as_str().trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AccessResult<T> {
        self.execute(path, |base| {
            self.client.get(Self::endpoint(base, path)).query(query)
        })
        .await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> AccessResult<T> {
        self.execute(path, |base| {
            self.client
                .post(Self::endpoint(base, path))
                .query(query)
                .json(body)
        })
        .await
    }

    async fn execute<T, F>(&self, path: &str, build: F) -> AccessResult<T>
    where
        T: DeserializeOwned,
        F: Fn(&Url) -> reqwest::RequestBuilder,
    {
        let mut last_error = None;
        for (i, base) in self.endpoints.iter().enumerate() {
            let fut = build(base).send();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(response)) => return decode_response(response).await,
                Ok(Err(e)) => {
                    tracing::warn!(endpoint_idx = i, path = %path, error = %e, "Access request failed, trying next endpoint");
                    last_error = Some(AccessError::transport(format!("request to {} failed", path), e));
                }
                Err(_) => {
                    tracing::warn!(endpoint_idx = i, path = %path, "Access request timed out, trying next endpoint");
                    last_error = Some(AccessError::Timeout(self.timeout_duration.as_secs()));
                }
            }
        }
        Err(last_error.unwrap_or_else(|| AccessError::Transport {
            message: "no access endpoints configured".to_string(),
            source: None,
        }))
    }

    async fn first_block(&self, path: &str, query: &[(&str, String)]) -> AccessResult<Block> {
        let blocks: Vec<wire::Block> = self.get(path, query).await?;
        blocks
            .into_iter()
            .next()
            .ok_or_else(|| AccessError::NotFound(format!("block at {}", path)))?
            .try_into()
    }

    async fn account(&self, address: FlowAddress, height: Option<u64>) -> AccessResult<Account> {
        let raw: wire::Account = self
            .get(
                &format!("accounts/{}", address.to_hex()),
                &[
                    ("block_height", height_param(height, true)),
                    ("expand", "keys,contracts".to_string()),
                ],
            )
            .await?;
        raw.try_into()
    }

    async fn account_key(&self, address: FlowAddress, key_index: u32, height: Option<u64>) -> AccessResult<AccountKey> {
        let raw: wire::AccountKey = self
            .get(
                &format!("accounts/{}/keys/{}", address.to_hex(), key_index),
                &[("block_height", height_param(height, true))],
            )
            .await?;
        raw.try_into()
    }

    async fn script(
        &self,
        script: &[u8],
        arguments: &[Vec<u8>],
        query: &[(&str, String)],
    ) -> AccessResult<ScriptResponse> {
        let body = wire::ScriptBody::new(script, arguments);
        let encoded: String = self.post("scripts", query, &body).await?;
        Ok(ScriptResponse::new(wire::base64(&encoded)?))
    }

    async fn events(&self, query: &[(&str, String)]) -> AccessResult<Vec<EventResult>> {
        let results: Vec<wire::BlockEvents> = self.get("events", query).await?;
        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn subscribe(&self, start: serde_json::Value, filter: EventFilter) -> AccessResult<EventSubscription> {
        let fut = tokio_tungstenite::connect_async(self.ws_url.as_str());
        let (mut socket, _) = timeout(self.timeout_duration, fut)
            .await
            .map_err(|_| AccessError::Timeout(self.timeout_duration.as_secs()))?
            .map_err(|e| AccessError::Stream(format!("websocket connect failed: {}", e)))?;

        let subscription_id = format!("events-{}", rand::random::<u32>());
        let request = wire::subscribe_message(&subscription_id, start, &filter);
        socket
            .send(Message::Text(request.to_string().into()))
            .await
            .map_err(|e| AccessError::Stream(format!("subscribe request failed: {}", e)))?;

        tracing::info!(ws_url = %self.ws_url, subscription_id = %subscription_id, "Event subscription opened");

        Ok(EventSubscription::spawn(STREAM_CAPACITY, move |sink| async move {
            while let Some(frame) = socket.next().await {
                let text = match frame {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        sink.send_error(AccessError::Stream(e.to_string())).await;
                        return;
                    }
                };

                match wire::parse_stream_message(&text) {
                    Ok(Some(events)) => {
                        if !sink.send(events).await {
                            tracing::debug!("Subscriber gone, closing stream");
                            let _ = socket.close(None).await;
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        sink.send_error(e).await;
                        return;
                    }
                }
            }
            sink.send_error(AccessError::Stream("stream closed by access node".to_string()))
                .await;
        }))
    }
}

impl std::fmt::Debug for RestAccessApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestAccessApi")
            .field("rest_url", &self.config.rest_url)
            .field("endpoints", &self.endpoints.len())
            .field("timeout_secs", &self.config.request_timeout_secs)
            .finish()
    }
}

fn parse_url(text: &str) -> AccessResult<Url> {
    Url::parse(text).map_err(|e| AccessError::InvalidRequest(format!("invalid access URL '{}': {}", text, e)))
}

fn websocket_url(base: &Url) -> AccessResult<Url> {
    let mut url = parse_url(&RestAccessApi::endpoint(base, "ws"))?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|_| AccessError::InvalidRequest(format!("cannot derive websocket URL from {}", base)))?;
    Ok(url)
}

fn height_param(height: Option<u64>, sealed: bool) -> String {
    match height {
        Some(h) => h.to_string(),
        None if sealed => "sealed".to_string(),
        None => "final".to_string(),
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> AccessResult<T> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| AccessError::transport("failed to read response body", e))?;

    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|e| AccessError::Decode(e.to_string()));
    }

    let message = serde_json::from_slice::<wire::ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(AccessError::NotFound(message));
    }
    Err(AccessError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl AccessApi for RestAccessApi {
    async fn ping(&self) -> AccessResult<()> {
        self.get_network_parameters().await.map(|_| ())
    }

    async fn get_latest_block_header(&self, sealed: bool) -> AccessResult<BlockHeader> {
        self.get_latest_block(sealed).await.map(|b| b.header())
    }

    async fn get_block_header_by_id(&self, id: FlowId) -> AccessResult<BlockHeader> {
        self.get_block_by_id(id).await.map(|b| b.header())
    }

    async fn get_block_header_by_height(&self, height: u64) -> AccessResult<BlockHeader> {
        self.get_block_by_height(height).await.map(|b| b.header())
    }

    async fn get_latest_block(&self, sealed: bool) -> AccessResult<Block> {
        self.first_block(
            "blocks",
            &[
                ("height", height_param(None, sealed)),
                ("expand", "payload".to_string()),
            ],
        )
        .await
    }

    async fn get_block_by_id(&self, id: FlowId) -> AccessResult<Block> {
        self.first_block(&format!("blocks/{}", id.to_hex()), &[("expand", "payload".to_string())])
            .await
    }

    async fn get_block_by_height(&self, height: u64) -> AccessResult<Block> {
        self.first_block(
            "blocks",
            &[
                ("height", height.to_string()),
                ("expand", "payload".to_string()),
            ],
        )
        .await
    }

    async fn get_account_at_latest_block(&self, address: FlowAddress) -> AccessResult<Account> {
        self.account(address, None).await
    }

    async fn get_account_by_block_height(&self, address: FlowAddress, height: u64) -> AccessResult<Account> {
        self.account(address, Some(height)).await
    }

    async fn get_account_balance_at_latest_block(&self, address: FlowAddress) -> AccessResult<UFix64> {
        self.account(address, None).await.map(|a| a.balance)
    }

    async fn get_account_balance_at_block_height(&self, address: FlowAddress, height: u64) -> AccessResult<UFix64> {
        self.account(address, Some(height)).await.map(|a| a.balance)
    }

    async fn get_account_key_at_latest_block(&self, address: FlowAddress, key_index: u32) -> AccessResult<AccountKey> {
        self.account_key(address, key_index, None).await
    }

    async fn get_account_key_at_block_height(
        &self,
        address: FlowAddress,
        key_index: u32,
        height: u64,
    ) -> AccessResult<AccountKey> {
        self.account_key(address, key_index, Some(height)).await
    }

    async fn get_account_keys_at_latest_block(&self, address: FlowAddress) -> AccessResult<Vec<AccountKey>> {
        self.account(address, None).await.map(|a| a.keys)
    }

    async fn get_account_keys_at_block_height(&self, address: FlowAddress, height: u64) -> AccessResult<Vec<AccountKey>> {
        self.account(address, Some(height)).await.map(|a| a.keys)
    }

    async fn get_collection_by_id(&self, id: FlowId) -> AccessResult<Collection> {
        let raw: wire::Collection = self
            .get(
                &format!("collections/{}", id.to_hex()),
                &[("expand", "transactions".to_string())],
            )
            .await?;
        raw.try_into()
    }

    async fn get_full_collection_by_id(&self, id: FlowId) -> AccessResult<Vec<Transaction>> {
        let raw: wire::Collection = self
            .get(
                &format!("collections/{}", id.to_hex()),
                &[("expand", "transactions".to_string())],
            )
            .await?;
        raw.transactions.into_iter().map(TryInto::try_into).collect()
    }

    async fn send_transaction(&self, transaction: &Transaction) -> AccessResult<FlowId> {
        let body = wire::Transaction::from(transaction);
        let sent: wire::Transaction = self.post("transactions", &[], &body).await?;
        let id = match sent.id.as_deref() {
            Some(id) => wire::id(id)?,
            None => transaction.id(),
        };
        tracing::debug!(tx_id = %id, "Transaction accepted by access node");
        Ok(id)
    }

    async fn get_transaction_by_id(&self, id: FlowId) -> AccessResult<Transaction> {
        let raw: wire::Transaction = self.get(&format!("transactions/{}", id.to_hex()), &[]).await?;
        raw.try_into()
    }

    async fn get_transaction_result_by_id(&self, id: FlowId) -> AccessResult<TransactionResult> {
        let raw: wire::TransactionResult = self
            .get(&format!("transaction_results/{}", id.to_hex()), &[])
            .await?;
        raw.into_result(id)
    }

    async fn execute_script_at_latest_block(&self, script: &[u8], arguments: &[Vec<u8>]) -> AccessResult<ScriptResponse> {
        self.script(script, arguments, &[("block_height", "sealed".to_string())])
            .await
    }

    async fn execute_script_at_block_id(
        &self,
        script: &[u8],
        arguments: &[Vec<u8>],
        block_id: FlowId,
    ) -> AccessResult<ScriptResponse> {
        self.script(script, arguments, &[("block_id", block_id.to_hex())])
            .await
    }

    async fn execute_script_at_block_height(
        &self,
        script: &[u8],
        arguments: &[Vec<u8>],
        height: u64,
    ) -> AccessResult<ScriptResponse> {
        self.script(script, arguments, &[("block_height", height.to_string())])
            .await
    }

    async fn get_events_for_height_range(
        &self,
        event_type: &str,
        start_height: u64,
        end_height: u64,
    ) -> AccessResult<Vec<EventResult>> {
        self.events(&[
            ("type", event_type.to_string()),
            ("start_height", start_height.to_string()),
            ("end_height", end_height.to_string()),
        ])
        .await
    }

    async fn get_events_for_block_ids(&self, event_type: &str, block_ids: &[FlowId]) -> AccessResult<Vec<EventResult>> {
        let ids: Vec<String> = block_ids.iter().map(FlowId::to_hex).collect();
        self.events(&[("type", event_type.to_string()), ("block_ids", ids.join(","))])
            .await
    }

    async fn get_network_parameters(&self) -> AccessResult<ChainId> {
        let params: wire::NetworkParameters = self.get("network/parameters", &[]).await?;
        Ok(ChainId::from_name(&params.chain_id))
    }

    async fn get_node_version_info(&self) -> AccessResult<NodeVersionInfo> {
        let raw: wire::NodeVersionInfo = self.get("node_version_info", &[]).await?;
        raw.try_into()
    }

    async fn get_execution_result_by_block_id(&self, block_id: FlowId) -> AccessResult<ExecutionResult> {
        let results: Vec<wire::ExecutionResult> = self
            .get("execution_results", &[("block_id", block_id.to_hex())])
            .await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| AccessError::NotFound(format!("execution result for block {}", block_id)))?
            .try_into()
    }

    async fn get_latest_protocol_state_snapshot(&self) -> AccessResult<ProtocolSnapshot> {
        Err(AccessError::Unsupported("protocol state snapshots"))
    }

    async fn get_protocol_state_snapshot_by_block_id(&self, _block_id: FlowId) -> AccessResult<ProtocolSnapshot> {
        Err(AccessError::Unsupported("protocol state snapshots"))
    }

    async fn get_protocol_state_snapshot_by_height(&self, _height: u64) -> AccessResult<ProtocolSnapshot> {
        Err(AccessError::Unsupported("protocol state snapshots"))
    }

    async fn subscribe_events_by_block_id(&self, start_block_id: FlowId, filter: EventFilter) -> AccessResult<EventSubscription> {
        self.subscribe(serde_json::json!({ "start_block_id": start_block_id.to_hex() }), filter)
            .await
    }

    async fn subscribe_events_by_block_height(&self, start_height: u64, filter: EventFilter) -> AccessResult<EventSubscription> {
        self.subscribe(
            serde_json::json!({ "start_block_height": start_height.to_string() }),
            filter,
        )
        .await
    }

    async fn subscribe_execution_data_by_block_id(&self, _start_block_id: FlowId) -> AccessResult<ExecutionDataSubscription> {
        Err(AccessError::Unsupported("execution data streaming"))
    }
}

/// JSON shapes of the HTTP Access API.
mod wire {
    use std::collections::BTreeMap;

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize};

    use crate::sdk::access::EventFilter;
    use crate::sdk::encoding::{decode_base64, decode_hex, encode_base64};
    use crate::sdk::error::{AccessError, AccessResult};
    use crate::sdk::types as model;
    use crate::sdk::types::{FlowAddress, FlowId, TransactionStatus, UFix64};

    pub fn id(text: &str) -> AccessResult<FlowId> {
        FlowId::from_hex(text).map_err(|e| AccessError::Decode(e.to_string()))
    }

    pub fn address(text: &str) -> AccessResult<FlowAddress> {
        FlowAddress::from_hex(text).map_err(|e| AccessError::Decode(e.to_string()))
    }

    pub fn base64(text: &str) -> AccessResult<Vec<u8>> {
        decode_base64(text).map_err(|e| AccessError::Decode(format!("invalid base64: {}", e)))
    }

    fn hex(text: &str) -> AccessResult<Vec<u8>> {
        decode_hex(text).map_err(|e| AccessError::Decode(format!("invalid hex: {}", e)))
    }

    fn ids(values: &[String]) -> AccessResult<Vec<FlowId>> {
        values.iter().map(|v| id(v)).collect()
    }

    /// Numbers arrive as strings; accept bare numbers too.
    fn de_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(t) => t.parse().map_err(serde::de::Error::custom),
        }
    }

    fn to_u32(value: u64, what: &str) -> AccessResult<u32> {
        u32::try_from(value).map_err(|_| AccessError::Decode(format!("{} {} overflows u32", what, value)))
    }

    #[derive(Deserialize)]
    pub struct ErrorBody {
        #[serde(default)]
        pub message: String,
    }

    #[derive(Deserialize)]
    pub struct BlockHeader {
        id: String,
        parent_id: String,
        #[serde(deserialize_with = "de_u64")]
        height: u64,
        timestamp: DateTime<Utc>,
    }

    #[derive(Deserialize, Default)]
    pub struct BlockPayload {
        #[serde(default)]
        collection_guarantees: Vec<CollectionGuarantee>,
        #[serde(default)]
        block_seals: Vec<BlockSeal>,
    }

    #[derive(Deserialize)]
    pub struct CollectionGuarantee {
        collection_id: String,
        #[serde(default)]
        signer_ids: Vec<String>,
    }

    #[derive(Deserialize)]
    pub struct BlockSeal {
        block_id: String,
        result_id: String,
    }

    #[derive(Deserialize)]
    pub struct Block {
        header: BlockHeader,
        #[serde(default)]
        payload: Option<BlockPayload>,
    }

    impl TryFrom<Block> for model::Block {
        type Error = AccessError;

        fn try_from(block: Block) -> AccessResult<Self> {
            let payload = block.payload.unwrap_or_default();
            Ok(model::Block {
                id: id(&block.header.id)?,
                parent_id: id(&block.header.parent_id)?,
                height: block.header.height,
                timestamp: block.header.timestamp,
                collection_guarantees: payload
                    .collection_guarantees
                    .iter()
                    .map(|g| -> AccessResult<_> {
                        Ok(model::CollectionGuarantee {
                            collection_id: id(&g.collection_id)?,
                            signer_ids: ids(&g.signer_ids)?,
                        })
                    })
                    .collect::<AccessResult<_>>()?,
                block_seals: payload
                    .block_seals
                    .iter()
                    .map(|s| -> AccessResult<_> {
                        Ok(model::BlockSeal {
                            block_id: id(&s.block_id)?,
                            result_id: id(&s.result_id)?,
                        })
                    })
                    .collect::<AccessResult<_>>()?,
            })
        }
    }

    #[derive(Deserialize)]
    pub struct AccountKey {
        #[serde(deserialize_with = "de_u64")]
        index: u64,
        public_key: String,
        signing_algorithm: String,
        hashing_algorithm: String,
        #[serde(deserialize_with = "de_u64")]
        sequence_number: u64,
        #[serde(deserialize_with = "de_u64")]
        weight: u64,
        #[serde(default)]
        revoked: bool,
    }

    impl TryFrom<AccountKey> for model::AccountKey {
        type Error = AccessError;

        fn try_from(key: AccountKey) -> AccessResult<Self> {
            Ok(model::AccountKey {
                index: to_u32(key.index, "key index")?,
                public_key: hex(&key.public_key)?,
                sign_algo: key
                    .signing_algorithm
                    .parse()
                    .map_err(|e: crate::sdk::crypto::CryptoError| AccessError::Decode(e.to_string()))?,
                hash_algo: key
                    .hashing_algorithm
                    .parse()
                    .map_err(|e: crate::sdk::crypto::CryptoError| AccessError::Decode(e.to_string()))?,
                weight: to_u32(key.weight, "key weight")?,
                sequence_number: key.sequence_number,
                revoked: key.revoked,
            })
        }
    }

    #[derive(Deserialize)]
    pub struct Account {
        address: String,
        #[serde(deserialize_with = "de_u64")]
        balance: u64,
        #[serde(default)]
        keys: Vec<AccountKey>,
        #[serde(default)]
        contracts: BTreeMap<String, String>,
    }

    impl TryFrom<Account> for model::Account {
        type Error = AccessError;

        fn try_from(account: Account) -> AccessResult<Self> {
            let contracts = account
                .contracts
                .iter()
                .map(|(name, code)| -> AccessResult<_> {
                    let source = String::from_utf8(base64(code)?)
                        .map_err(|e| AccessError::Decode(format!("contract {}: {}", name, e)))?;
                    Ok((name.clone(), source))
                })
                .collect::<AccessResult<_>>()?;
            Ok(model::Account {
                address: address(&account.address)?,
                balance: UFix64::from_raw(account.balance),
                keys: account
                    .keys
                    .into_iter()
                    .map(TryInto::try_into)
                    .collect::<AccessResult<_>>()?,
                contracts,
            })
        }
    }

    #[derive(Serialize, Deserialize)]
    pub struct ProposalKey {
        address: String,
        key_index: String,
        sequence_number: String,
    }

    #[derive(Serialize, Deserialize)]
    pub struct Signature {
        address: String,
        key_index: String,
        signature: String,
    }

    #[derive(Serialize, Deserialize)]
    pub struct Transaction {
        #[serde(default, skip_serializing)]
        pub id: Option<String>,
        #[serde(default)]
        script: String,
        #[serde(default)]
        arguments: Vec<String>,
        #[serde(default)]
        reference_block_id: String,
        #[serde(default)]
        gas_limit: String,
        #[serde(default)]
        payer: String,
        proposal_key: ProposalKey,
        #[serde(default)]
        authorizers: Vec<String>,
        #[serde(default)]
        payload_signatures: Vec<Signature>,
        #[serde(default)]
        envelope_signatures: Vec<Signature>,
    }

    fn signatures(sigs: &[crate::sdk::transaction::TransactionSignature]) -> Vec<Signature> {
        sigs.iter()
            .map(|s| Signature {
                address: s.address.to_hex(),
                key_index: s.key_index.to_string(),
                signature: encode_base64(&s.signature),
            })
            .collect()
    }

    impl From<&crate::sdk::transaction::Transaction> for Transaction {
        fn from(tx: &crate::sdk::transaction::Transaction) -> Self {
            Transaction {
                id: None,
                script: encode_base64(&tx.script),
                arguments: tx.arguments.iter().map(|a| encode_base64(a)).collect(),
                reference_block_id: tx.reference_block_id.to_hex(),
                gas_limit: tx.gas_limit.to_string(),
                payer: tx.payer.to_hex(),
                proposal_key: ProposalKey {
                    address: tx.proposal_key.address.to_hex(),
                    key_index: tx.proposal_key.key_index.to_string(),
                    sequence_number: tx.proposal_key.sequence_number.to_string(),
                },
                authorizers: tx.authorizers.iter().map(FlowAddress::to_hex).collect(),
                payload_signatures: signatures(&tx.payload_signatures),
                envelope_signatures: signatures(&tx.envelope_signatures),
            }
        }
    }

    fn number<T: std::str::FromStr>(text: &str, what: &str) -> AccessResult<T> {
        text.parse()
            .map_err(|_| AccessError::Decode(format!("invalid {} '{}'", what, text)))
    }

    impl TryFrom<Transaction> for crate::sdk::transaction::Transaction {
        type Error = AccessError;

        fn try_from(wire: Transaction) -> AccessResult<Self> {
            let decode = |e: crate::sdk::transaction::TransactionError| AccessError::Decode(e.to_string());

            let mut tx = crate::sdk::transaction::Transaction::new(
                base64(&wire.script)?,
                id(&wire.reference_block_id)?,
                number(&wire.gas_limit, "gas limit")?,
                crate::sdk::transaction::ProposalKey {
                    address: address(&wire.proposal_key.address)?,
                    key_index: number(&wire.proposal_key.key_index, "key index")?,
                    sequence_number: number(&wire.proposal_key.sequence_number, "sequence number")?,
                },
                address(&wire.payer)?,
            );
            for argument in &wire.arguments {
                tx.arguments.push(base64(argument)?);
            }
            for authorizer in &wire.authorizers {
                tx.authorizers.push(address(authorizer)?);
            }
            for sig in &wire.payload_signatures {
                tx.add_payload_signature_bytes(address(&sig.address)?, number(&sig.key_index, "key index")?, base64(&sig.signature)?)
                    .map_err(decode)?;
            }
            for sig in &wire.envelope_signatures {
                tx.add_envelope_signature_bytes(address(&sig.address)?, number(&sig.key_index, "key index")?, base64(&sig.signature)?)
                    .map_err(decode)?;
            }
            Ok(tx)
        }
    }

    #[derive(Deserialize)]
    pub struct Collection {
        id: String,
        #[serde(default)]
        pub transactions: Vec<Transaction>,
    }

    impl TryFrom<Collection> for model::Collection {
        type Error = AccessError;

        fn try_from(collection: Collection) -> AccessResult<Self> {
            let transaction_ids = collection
                .transactions
                .iter()
                .map(|t| match &t.id {
                    Some(tx_id) => id(tx_id),
                    None => Err(AccessError::Decode("collection transaction without id".to_string())),
                })
                .collect::<AccessResult<_>>()?;
            Ok(model::Collection {
                id: id(&collection.id)?,
                transaction_ids,
            })
        }
    }

    #[derive(Deserialize)]
    pub struct Event {
        #[serde(rename = "type")]
        event_type: String,
        transaction_id: String,
        #[serde(deserialize_with = "de_u64")]
        transaction_index: u64,
        #[serde(deserialize_with = "de_u64")]
        event_index: u64,
        payload: String,
    }

    impl TryFrom<Event> for model::Event {
        type Error = AccessError;

        fn try_from(event: Event) -> AccessResult<Self> {
            Ok(model::Event {
                event_type: event.event_type,
                transaction_id: id(&event.transaction_id)?,
                transaction_index: to_u32(event.transaction_index, "transaction index")?,
                event_index: to_u32(event.event_index, "event index")?,
                payload: base64(&event.payload)?,
            })
        }
    }

    fn events(events: Vec<Event>) -> AccessResult<Vec<model::Event>> {
        events.into_iter().map(TryInto::try_into).collect()
    }

    #[derive(Deserialize)]
    pub struct BlockEvents {
        block_id: String,
        #[serde(deserialize_with = "de_u64")]
        block_height: u64,
        block_timestamp: DateTime<Utc>,
        #[serde(default)]
        events: Vec<Event>,
    }

    impl TryFrom<BlockEvents> for model::EventResult {
        type Error = AccessError;

        fn try_from(batch: BlockEvents) -> AccessResult<Self> {
            Ok(model::EventResult {
                block_id: id(&batch.block_id)?,
                block_height: batch.block_height,
                block_timestamp: batch.block_timestamp,
                events: events(batch.events)?,
            })
        }
    }

    #[derive(Deserialize)]
    pub struct TransactionResult {
        #[serde(default)]
        block_id: String,
        #[serde(default, deserialize_with = "de_u64")]
        block_height: u64,
        #[serde(default)]
        collection_id: String,
        #[serde(default)]
        status: String,
        #[serde(default, deserialize_with = "de_u64")]
        status_code: u64,
        #[serde(default)]
        error_message: String,
        #[serde(default, deserialize_with = "de_u64")]
        computation_used: u64,
        #[serde(default)]
        events: Vec<Event>,
    }

    impl TransactionResult {
        pub fn into_result(self, transaction_id: FlowId) -> AccessResult<model::TransactionResult> {
            let optional_id = |text: &str| if text.is_empty() { Ok(None) } else { id(text).map(Some) };
            Ok(model::TransactionResult {
                transaction_id,
                status: TransactionStatus::from_name(&self.status),
                status_code: to_u32(self.status_code, "status code")?,
                error_message: self.error_message,
                events: events(self.events)?,
                block_id: optional_id(&self.block_id)?.unwrap_or_default(),
                block_height: self.block_height,
                collection_id: optional_id(&self.collection_id)?,
                computation_usage: self.computation_used,
            })
        }
    }

    #[derive(Serialize)]
    pub struct ScriptBody {
        script: String,
        arguments: Vec<String>,
    }

    impl ScriptBody {
        pub fn new(script: &[u8], arguments: &[Vec<u8>]) -> Self {
            Self {
                script: encode_base64(script),
                arguments: arguments.iter().map(|a| encode_base64(a)).collect(),
            }
        }
    }

    #[derive(Deserialize)]
    pub struct NetworkParameters {
        pub chain_id: String,
    }

    #[derive(Deserialize)]
    pub struct CompatibleRange {
        #[serde(deserialize_with = "de_u64")]
        start_height: u64,
        #[serde(deserialize_with = "de_u64")]
        end_height: u64,
    }

    #[derive(Deserialize)]
    pub struct NodeVersionInfo {
        semver: String,
        commit: String,
        spork_id: String,
        #[serde(deserialize_with = "de_u64")]
        protocol_version: u64,
        #[serde(deserialize_with = "de_u64")]
        spork_root_block_height: u64,
        #[serde(deserialize_with = "de_u64")]
        node_root_block_height: u64,
        #[serde(default)]
        compatible_range: Option<CompatibleRange>,
    }

    impl TryFrom<NodeVersionInfo> for model::NodeVersionInfo {
        type Error = AccessError;

        fn try_from(info: NodeVersionInfo) -> AccessResult<Self> {
            Ok(model::NodeVersionInfo {
                semver: info.semver,
                commit: info.commit,
                spork_id: id(&info.spork_id)?,
                protocol_version: info.protocol_version,
                spork_root_block_height: info.spork_root_block_height,
                node_root_block_height: info.node_root_block_height,
                compatible_range: info.compatible_range.map(|r| model::CompatibleRange {
                    start_height: r.start_height,
                    end_height: r.end_height,
                }),
            })
        }
    }

    #[derive(Deserialize)]
    pub struct Chunk {
        #[serde(deserialize_with = "de_u64")]
        index: u64,
        #[serde(deserialize_with = "de_u64")]
        collection_index: u64,
        block_id: String,
        #[serde(default)]
        start_state: String,
        #[serde(default)]
        end_state: String,
        #[serde(default)]
        event_collection: String,
        #[serde(default, deserialize_with = "de_u64")]
        number_of_transactions: u64,
        #[serde(default, deserialize_with = "de_u64")]
        total_computation_used: u64,
    }

    #[derive(Deserialize)]
    pub struct ServiceEvent {
        #[serde(rename = "type")]
        event_type: String,
        #[serde(default)]
        payload: String,
    }

    #[derive(Deserialize)]
    pub struct ExecutionResult {
        id: String,
        block_id: String,
        previous_result_id: String,
        #[serde(default)]
        chunks: Vec<Chunk>,
        #[serde(default)]
        service_events: Vec<ServiceEvent>,
    }

    impl TryFrom<ExecutionResult> for model::ExecutionResult {
        type Error = AccessError;

        fn try_from(result: ExecutionResult) -> AccessResult<Self> {
            let chunks = result
                .chunks
                .iter()
                .map(|c| -> AccessResult<_> {
                    Ok(model::Chunk {
                        index: c.index,
                        collection_index: to_u32(c.collection_index, "collection index")?,
                        block_id: id(&c.block_id)?,
                        start_state: hex(&c.start_state)?,
                        end_state: hex(&c.end_state)?,
                        event_collection: hex(&c.event_collection)?,
                        number_of_transactions: c.number_of_transactions,
                        total_computation_used: c.total_computation_used,
                    })
                })
                .collect::<AccessResult<_>>()?;
            let service_events = result
                .service_events
                .iter()
                .map(|e| -> AccessResult<_> {
                    Ok(model::ServiceEvent {
                        event_type: e.event_type.clone(),
                        payload: base64(&e.payload)?,
                    })
                })
                .collect::<AccessResult<_>>()?;
            Ok(model::ExecutionResult {
                id: id(&result.id)?,
                block_id: id(&result.block_id)?,
                previous_result_id: id(&result.previous_result_id)?,
                chunks,
                service_events,
            })
        }
    }

    pub fn subscribe_message(subscription_id: &str, mut arguments: serde_json::Value, filter: &EventFilter) -> serde_json::Value {
        if let Some(args) = arguments.as_object_mut() {
            if !filter.event_types.is_empty() {
                args.insert("event_types".to_string(), serde_json::json!(filter.event_types));
            }
            if !filter.addresses.is_empty() {
                let addresses: Vec<String> = filter.addresses.iter().map(FlowAddress::to_hex).collect();
                args.insert("addresses".to_string(), serde_json::json!(addresses));
            }
            if !filter.contracts.is_empty() {
                args.insert("contracts".to_string(), serde_json::json!(filter.contracts));
            }
        }
        serde_json::json!({
            "subscription_id": subscription_id,
            "action": "subscribe",
            "topic": "events",
            "arguments": arguments,
        })
    }

    #[derive(Deserialize)]
    struct StreamError {
        #[serde(default)]
        code: i64,
        #[serde(default)]
        message: String,
    }

    #[derive(Deserialize)]
    struct StreamMessage {
        #[serde(default)]
        error: Option<StreamError>,
        #[serde(default)]
        payload: Option<BlockEvents>,
    }

    /// Events carried by one WebSocket frame; acknowledgements yield `None`.
    pub fn parse_stream_message(text: &str) -> AccessResult<Option<model::EventResult>> {
        let message: StreamMessage = serde_json::from_str(text)
            .map_err(|e| AccessError::Decode(format!("invalid stream message: {}", e)))?;
        if let Some(err) = message.error {
            return Err(AccessError::Stream(format!("{} (code {})", err.message, err.code)));
        }
        message.payload.map(TryInto::try_into).transpose()
    }

}
