//! Transaction and result lookups.

use std::sync::Arc;

use crate::error::ExampleResult;
use crate::sdk::{AccessApi, FlowId, Transaction, TransactionResult};

pub struct GetTransactionExample {
    api: Arc<dyn AccessApi>,
}

impl GetTransactionExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_transaction(&self, tx_id: FlowId) -> ExampleResult<Transaction> {
        Ok(self.api.get_transaction_by_id(tx_id).await?)
    }

    /// Result as reported by the node, whatever its status.
    pub async fn get_transaction_result(&self, tx_id: FlowId) -> ExampleResult<TransactionResult> {
        Ok(self.api.get_transaction_result_by_id(tx_id).await?)
    }
}
