//! Block, collection and execution result lookups.

use std::sync::Arc;

use crate::error::ExampleResult;
use crate::sdk::{AccessApi, Block, Collection, ExecutionResult, FlowId, Transaction};

pub struct GetBlockExample {
    api: Arc<dyn AccessApi>,
}

impl GetBlockExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_latest_sealed_block(&self) -> ExampleResult<Block> {
        Ok(self.api.get_latest_block(true).await?)
    }

    pub async fn get_block_by_id(&self, block_id: FlowId) -> ExampleResult<Block> {
        Ok(self.api.get_block_by_id(block_id).await?)
    }

    pub async fn get_block_by_height(&self, height: u64) -> ExampleResult<Block> {
        Ok(self.api.get_block_by_height(height).await?)
    }
}

pub struct GetCollectionExample {
    api: Arc<dyn AccessApi>,
}

impl GetCollectionExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_collection_by_id(&self, collection_id: FlowId) -> ExampleResult<Collection> {
        Ok(self.api.get_collection_by_id(collection_id).await?)
    }

    /// The collection's transactions in full.
    pub async fn get_full_collection_by_id(&self, collection_id: FlowId) -> ExampleResult<Vec<Transaction>> {
        Ok(self.api.get_full_collection_by_id(collection_id).await?)
    }
}

pub struct GetExecutionDataExample {
    api: Arc<dyn AccessApi>,
}

impl GetExecutionDataExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_execution_result_by_block_id(&self, block_id: FlowId) -> ExampleResult<ExecutionResult> {
        Ok(self.api.get_execution_result_by_block_id(block_id).await?)
    }
}
