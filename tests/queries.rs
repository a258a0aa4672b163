//! Read-only examples: accounts, blocks, collections, events, transactions, network.

use std::sync::Arc;

use flow_examples::examples::create_account::{CreateAccountExample, ACCOUNT_CREATED_EVENT};
use flow_examples::examples::{
    GetAccountBalanceExample, GetAccountExample, GetAccountKeysExample, GetBlockExample,
    GetCollectionExample, GetEventsExample, GetExecutionDataExample, GetNetworkParametersExample,
    GetNodeVersionInfoExample, GetProtocolStateExample, GetTransactionExample,
};
use flow_examples::sdk::{Block, ChainId, TransactionStatus, UFix64};
use flow_examples::ExampleError;

mod common;
use common::{block_id, connector, generate_key, service_address, MockAccessApi, GENESIS_HEIGHT};

#[tokio::test]
async fn test_account_queries() {
    let key = generate_key();
    let api = Arc::new(MockAccessApi::new().with_account(service_address(), key.public_key(), "12.5"));
    api.add_key(service_address(), key.public_key(), 1);

    let accounts = GetAccountExample::new(api.clone());
    let account = accounts.get_account_at_latest_block(service_address()).await.unwrap();
    assert_eq!(account.address, service_address());
    assert_eq!(
        accounts.get_account_at_block_height(service_address(), GENESIS_HEIGHT).await.unwrap(),
        account
    );

    let balances = GetAccountBalanceExample::new(api.clone());
    let expected: UFix64 = "12.5".parse().unwrap();
    assert_eq!(balances.get_balance_at_latest_block(service_address()).await.unwrap(), expected);
    assert_eq!(accounts.get_account_balance(service_address()).await.unwrap(), expected);

    let keys = GetAccountKeysExample::new(api);
    assert_eq!(keys.get_account_keys_at_latest_block(service_address()).await.unwrap().len(), 2);
    assert_eq!(
        keys.get_account_key_at_latest_block(service_address(), 1).await.unwrap().weight,
        1
    );
    let err = keys
        .get_account_key_at_latest_block(service_address(), 7)
        .await
        .unwrap_err();
    assert!(matches!(err, ExampleError::Access(_)));
}

#[tokio::test]
async fn test_block_queries() {
    let api = Arc::new(MockAccessApi::new());
    let blocks = GetBlockExample::new(api);

    let latest = blocks.get_latest_sealed_block().await.unwrap();
    assert_eq!(latest.height, GENESIS_HEIGHT);
    assert_eq!(blocks.get_block_by_id(latest.id).await.unwrap(), latest);

    let parent = blocks.get_block_by_height(GENESIS_HEIGHT - 1).await.unwrap();
    assert_eq!(parent.id, latest.parent_id);
    assert!(blocks.get_block_by_height(GENESIS_HEIGHT + 1).await.is_err());
}

#[tokio::test]
async fn test_collection_and_transaction_lookup() {
    let key = generate_key();
    let api = Arc::new(MockAccessApi::new().with_account(service_address(), key.public_key(), "100.0"));
    let address = CreateAccountExample::new(connector(api.clone(), key))
        .create_account(service_address(), generate_key().public_key())
        .await
        .unwrap();

    let latest = GetBlockExample::new(api.clone()).get_latest_sealed_block().await.unwrap();
    let collection_id = latest.collection_guarantees[0].collection_id;

    let collections = GetCollectionExample::new(api.clone());
    let collection = collections.get_collection_by_id(collection_id).await.unwrap();
    assert_eq!(collection.transaction_ids.len(), 1);
    let full = collections.get_full_collection_by_id(collection_id).await.unwrap();
    assert_eq!(full[0].id(), collection.transaction_ids[0]);

    let transactions = GetTransactionExample::new(api.clone());
    let tx = transactions.get_transaction(collection.transaction_ids[0]).await.unwrap();
    assert_eq!(tx.payer, service_address());
    let result = transactions
        .get_transaction_result(collection.transaction_ids[0])
        .await
        .unwrap();
    assert_eq!(result.status, TransactionStatus::Sealed);
    assert_eq!(result.block_height, latest.height);

    let events = GetEventsExample::new(api);
    let created = events
        .get_account_created_events(GENESIS_HEIGHT, latest.height)
        .await
        .unwrap();
    let found: Vec<_> = created.iter().flat_map(|r| r.events.iter()).collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].event_type, ACCOUNT_CREATED_EVENT);
    assert_eq!(found[0].field("address").unwrap().as_address().unwrap(), address);
}

#[tokio::test]
async fn test_events_for_block_ids_dedups() {
    let api = Arc::new(MockAccessApi::new());
    let events = GetEventsExample::new(api);

    let ids = [block_id(3), block_id(4), block_id(3)];
    let results = events.get_events_for_block_ids(ACCOUNT_CREATED_EVENT, &ids).await.unwrap();
    let heights: Vec<u64> = results.iter().map(|r| r.block_height).collect();
    assert_eq!(heights, vec![3, 4]);
}

#[tokio::test]
async fn test_network_and_execution_queries() {
    let api = Arc::new(MockAccessApi::new());

    let chain = GetNetworkParametersExample::new(api.clone()).get_network_parameters().await.unwrap();
    assert_eq!(chain, ChainId::Emulator);

    let version = GetNodeVersionInfoExample::new(api.clone()).get_node_version_info().await.unwrap();
    assert!(!version.semver.is_empty());

    let result = GetExecutionDataExample::new(api)
        .get_execution_result_by_block_id(block_id(5))
        .await
        .unwrap();
    assert_eq!(result.block_id, block_id(5));
}

#[tokio::test]
async fn test_protocol_state_snapshots() {
    let api = Arc::new(MockAccessApi::new());
    let example = GetProtocolStateExample::new(api);

    let latest = example.get_latest_protocol_state_snapshot().await.unwrap();
    assert!(!latest.is_empty());
    let tip: Block = serde_json::from_slice(&latest.bytes).unwrap();
    assert_eq!(tip.height, GENESIS_HEIGHT);

    let by_id = example.get_protocol_state_snapshot_by_block_id(block_id(4)).await.unwrap();
    let by_height = example.get_protocol_state_snapshot_by_height(4).await.unwrap();
    assert_eq!(by_id, by_height);

    let err = example
        .get_protocol_state_snapshot_by_height(GENESIS_HEIGHT + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ExampleError::Access(_)));
}
