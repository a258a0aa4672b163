//! Historical event queries.

use std::sync::Arc;

use crate::error::ExampleResult;
use crate::examples::create_account::ACCOUNT_CREATED_EVENT;
use crate::sdk::{AccessApi, EventResult, FlowId, TransactionResult};

pub struct GetEventsExample {
    api: Arc<dyn AccessApi>,
}

impl GetEventsExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    /// Events of `event_type` in blocks `start_height..=end_height`.
    pub async fn get_events_for_height_range(
        &self,
        event_type: &str,
        start_height: u64,
        end_height: u64,
    ) -> ExampleResult<Vec<EventResult>> {
        Ok(self
            .api
            .get_events_for_height_range(event_type, start_height, end_height)
            .await?)
    }

    /// Events of `event_type` in the given blocks; duplicate ids are queried once.
    pub async fn get_events_for_block_ids(&self, event_type: &str, block_ids: &[FlowId]) -> ExampleResult<Vec<EventResult>> {
        let mut unique = Vec::with_capacity(block_ids.len());
        for id in block_ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        Ok(self.api.get_events_for_block_ids(event_type, &unique).await?)
    }

    /// Events of a single transaction, taken from its result.
    pub async fn get_transaction_result(&self, tx_id: FlowId) -> ExampleResult<TransactionResult> {
        Ok(self.api.get_transaction_result_by_id(tx_id).await?)
    }

    pub async fn get_account_created_events(&self, start_height: u64, end_height: u64) -> ExampleResult<Vec<EventResult>> {
        self.get_events_for_height_range(ACCOUNT_CREATED_EVENT, start_height, end_height)
            .await
    }
}
