//! Account, balance and key lookups.

use std::sync::Arc;

use crate::error::ExampleResult;
use crate::sdk::{AccessApi, Account, AccountKey, FlowAddress, UFix64};

pub struct GetAccountExample {
    api: Arc<dyn AccessApi>,
}

impl GetAccountExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_account_at_latest_block(&self, address: FlowAddress) -> ExampleResult<Account> {
        Ok(self.api.get_account_at_latest_block(address).await?)
    }

    pub async fn get_account_at_block_height(&self, address: FlowAddress, height: u64) -> ExampleResult<Account> {
        Ok(self.api.get_account_by_block_height(address, height).await?)
    }

    /// Balance read from the full account.
    pub async fn get_account_balance(&self, address: FlowAddress) -> ExampleResult<UFix64> {
        Ok(self.get_account_at_latest_block(address).await?.balance)
    }
}

pub struct GetAccountBalanceExample {
    api: Arc<dyn AccessApi>,
}

impl GetAccountBalanceExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_balance_at_latest_block(&self, address: FlowAddress) -> ExampleResult<UFix64> {
        Ok(self.api.get_account_balance_at_latest_block(address).await?)
    }

    pub async fn get_balance_at_block_height(&self, address: FlowAddress, height: u64) -> ExampleResult<UFix64> {
        Ok(self.api.get_account_balance_at_block_height(address, height).await?)
    }
}

pub struct GetAccountKeysExample {
    api: Arc<dyn AccessApi>,
}

impl GetAccountKeysExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_account_key_at_latest_block(&self, address: FlowAddress, key_index: u32) -> ExampleResult<AccountKey> {
        Ok(self.api.get_account_key_at_latest_block(address, key_index).await?)
    }

    pub async fn get_account_key_at_block_height(
        &self,
        address: FlowAddress,
        key_index: u32,
        height: u64,
    ) -> ExampleResult<AccountKey> {
        Ok(self
            .api
            .get_account_key_at_block_height(address, key_index, height)
            .await?)
    }

    pub async fn get_account_keys_at_latest_block(&self, address: FlowAddress) -> ExampleResult<Vec<AccountKey>> {
        Ok(self.api.get_account_keys_at_latest_block(address).await?)
    }

    pub async fn get_account_keys_at_block_height(&self, address: FlowAddress, height: u64) -> ExampleResult<Vec<AccountKey>> {
        Ok(self.api.get_account_keys_at_block_height(address, height).await?)
    }
}
