//! Event stream that resubscribes from the last seen height when it drops.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};

use crate::config::StreamingConfig;
use crate::error::ExampleResult;
use crate::examples::subscribe_events::{stopped, ReceivedEvents};
use crate::resilience::ReconnectPolicy;
use crate::sdk::{AccessApi, EventFilter, EventSubscription};

enum Resubscribed {
    Connected(EventSubscription),
    Exhausted,
    Stopped,
}

pub struct SubscribeEventsReconnectExample {
    api: Arc<dyn AccessApi>,
    config: StreamingConfig,
}

impl SubscribeEventsReconnectExample {
    pub fn new(api: Arc<dyn AccessApi>, config: StreamingConfig) -> Self {
        Self { api, config }
    }

    /// Stream from the latest sealed block, reconnecting on errors and closed streams.
    ///
    /// An idle receive timeout is not a failure. Each received batch resets
    /// the attempt counter; streaming stops once `max_reconnect_attempts`
    /// consecutive reconnects have been spent, `max_batches` arrive or
    /// shutdown fires.
    pub async fn stream_events(
        &self,
        filter: EventFilter,
        max_batches: Option<usize>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> ExampleResult<ReceivedEvents> {
        let header = self.api.get_latest_block_header(true).await?;
        let mut subscription = self
            .api
            .subscribe_events_by_block_id(header.id, filter.clone())
            .await?;

        let receive_timeout = Duration::from_millis(self.config.receive_timeout_ms);
        let mut policy = ReconnectPolicy::new(
            self.config.max_reconnect_attempts,
            self.config.reconnect_base_delay_ms,
            self.config.reconnect_max_delay_ms,
        );
        let mut next_height = header.height;
        let mut received = ReceivedEvents::default();

        while !received.limit_reached(max_batches) {
            let msg = tokio::select! {
                _ = stopped(&mut shutdown) => break,
                msg = timeout(receive_timeout, subscription.next()) => msg,
            };

            match msg {
                Err(_) => {
                    tracing::debug!(height = next_height, "No events within receive timeout");
                    continue;
                }
                Ok(Some(Ok(batch))) => {
                    next_height = batch.block_height + 1;
                    received.record(batch);
                    policy.reset();
                    continue;
                }
                Ok(Some(Err(e))) => {
                    tracing::warn!(error = %e, "Subscription error");
                    received.errors.push(e.to_string());
                }
                Ok(None) => {
                    tracing::warn!(height = next_height, "Subscription closed");
                }
            }

            subscription.cancel();
            match self
                .resubscribe(next_height, &filter, &mut policy, &mut received, &mut shutdown)
                .await
            {
                Resubscribed::Connected(s) => {
                    subscription = s;
                    received.reconnects += 1;
                }
                Resubscribed::Exhausted => {
                    tracing::error!(
                        attempts = policy.attempts(),
                        "Max reconnect attempts reached, stopping"
                    );
                    received.exhausted = true;
                    return Ok(received);
                }
                Resubscribed::Stopped => return Ok(received),
            }
        }

        subscription.cancel();
        Ok(received)
    }

    async fn resubscribe(
        &self,
        height: u64,
        filter: &EventFilter,
        policy: &mut ReconnectPolicy,
        received: &mut ReceivedEvents,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Resubscribed {
        loop {
            let Some(delay) = policy.next_delay() else {
                return Resubscribed::Exhausted;
            };
            tracing::info!(
                height,
                attempt = policy.attempts(),
                max = self.config.max_reconnect_attempts,
                "Reconnecting"
            );
            tokio::select! {
                _ = stopped(shutdown) => return Resubscribed::Stopped,
                _ = sleep(delay) => {}
            }

            match self.api.subscribe_events_by_block_height(height, filter.clone()).await {
                Ok(subscription) => return Resubscribed::Connected(subscription),
                Err(e) => {
                    tracing::warn!(error = %e, height, "Resubscribe failed");
                    received.errors.push(e.to_string());
                }
            }
        }
    }
}
