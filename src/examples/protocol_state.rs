//! Protocol state snapshots.

use std::sync::Arc;

use crate::error::ExampleResult;
use crate::sdk::{AccessApi, FlowId, ProtocolSnapshot};

pub struct GetProtocolStateExample {
    api: Arc<dyn AccessApi>,
}

impl GetProtocolStateExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_latest_protocol_state_snapshot(&self) -> ExampleResult<ProtocolSnapshot> {
        Ok(self.api.get_latest_protocol_state_snapshot().await?)
    }

    pub async fn get_protocol_state_snapshot_by_block_id(&self, block_id: FlowId) -> ExampleResult<ProtocolSnapshot> {
        Ok(self.api.get_protocol_state_snapshot_by_block_id(block_id).await?)
    }

    pub async fn get_protocol_state_snapshot_by_height(&self, height: u64) -> ExampleResult<ProtocolSnapshot> {
        Ok(self.api.get_protocol_state_snapshot_by_height(height).await?)
    }
}
