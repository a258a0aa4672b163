//! Stream block execution data from the latest sealed block.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::ExampleResult;
use crate::examples::subscribe_events::stopped;
use crate::sdk::{AccessApi, BlockExecutionData};

/// Execution data consumed before the stream stopped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReceivedExecutionData {
    pub blocks: Vec<BlockExecutionData>,
    pub errors: Vec<String>,
}

pub struct SubscribeExecutionDataExample {
    api: Arc<dyn AccessApi>,
}

impl SubscribeExecutionDataExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    /// Subscribe at the latest sealed block and collect until the stream ends,
    /// `max_blocks` arrive or shutdown fires.
    pub async fn stream_execution_data(
        &self,
        max_blocks: Option<usize>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> ExampleResult<ReceivedExecutionData> {
        let block_id = self.api.get_latest_block_header(true).await?.id;
        tracing::info!(block_id = %block_id, "Subscribing to execution data");
        let mut subscription = self.api.subscribe_execution_data_by_block_id(block_id).await?;

        let mut received = ReceivedExecutionData::default();
        while !max_blocks.is_some_and(|max| received.blocks.len() >= max) {
            tokio::select! {
                _ = stopped(&mut shutdown) => break,
                msg = subscription.next() => match msg {
                    Some(Ok(data)) => {
                        tracing::info!(
                            block_id = %data.block_id,
                            chunks = data.chunk_execution_data.len(),
                            "Received execution data"
                        );
                        received.blocks.push(data);
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Execution data stream error");
                        received.errors.push(e.to_string());
                    }
                    None => break,
                },
            }
        }

        subscription.cancel();
        Ok(received)
    }
}
