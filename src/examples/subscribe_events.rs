//! Subscribe to events starting at the latest sealed block.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::ExampleResult;
use crate::sdk::{AccessApi, BlockEvents, Event, EventFilter, EventSubscription};

/// What a streaming example consumed before it stopped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReceivedEvents {
    /// Block messages received.
    pub batches: usize,
    pub last_height: Option<u64>,
    pub events: Vec<Event>,
    pub errors: Vec<String>,
    /// Successful resubscriptions.
    pub reconnects: u32,
    /// Stopped because reconnect attempts ran out.
    pub exhausted: bool,
}

impl ReceivedEvents {
    pub(crate) fn record(&mut self, batch: BlockEvents) {
        tracing::info!(
            block_height = batch.block_height,
            events = batch.events.len(),
            "Received events"
        );
        self.batches += 1;
        self.last_height = Some(batch.block_height);
        self.events.extend(batch.events);
    }

    pub(crate) fn limit_reached(&self, max_batches: Option<usize>) -> bool {
        max_batches.is_some_and(|max| self.batches >= max)
    }
}

/// Resolves once shutdown is triggered. A dropped coordinator never triggers.
pub(crate) async fn stopped(shutdown: &mut broadcast::Receiver<()>) {
    match shutdown.recv().await {
        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
        Err(broadcast::error::RecvError::Closed) => std::future::pending().await,
    }
}

pub struct SubscribeEventsExample {
    api: Arc<dyn AccessApi>,
}

impl SubscribeEventsExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    /// Open a subscription at the latest sealed block.
    pub async fn subscribe_to_latest_block_events(&self, filter: EventFilter) -> ExampleResult<EventSubscription> {
        let block_id = self.api.get_latest_block_header(true).await?.id;
        tracing::info!(block_id = %block_id, "Subscribing to events");
        Ok(self.api.subscribe_events_by_block_id(block_id, filter).await?)
    }

    /// Drain both endpoints until the stream ends, `max_batches` arrive or shutdown fires.
    /// The subscription is cancelled on return.
    pub async fn consume(
        &self,
        mut subscription: EventSubscription,
        max_batches: Option<usize>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> ReceivedEvents {
        let mut received = ReceivedEvents::default();

        while !received.limit_reached(max_batches) {
            tokio::select! {
                _ = stopped(&mut shutdown) => break,
                msg = subscription.next() => match msg {
                    Some(Ok(batch)) => received.record(batch),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Subscription error");
                        received.errors.push(e.to_string());
                    }
                    None => break,
                },
            }
        }

        subscription.cancel();
        received
    }
}
