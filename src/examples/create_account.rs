//! Create an account paid for by an existing one.

use crate::connector::{AccessApiConnector, DEFAULT_GAS_LIMIT};
use crate::error::{ExampleError, ExampleResult};
use crate::sdk::{FlowAddress, PublicKey, TransactionResult};

/// Event emitted once per created account.
pub const ACCOUNT_CREATED_EVENT: &str = "flow.AccountCreated";

pub struct CreateAccountExample {
    connector: AccessApiConnector,
}

impl CreateAccountExample {
    pub fn new(connector: AccessApiConnector) -> Self {
        Self { connector }
    }

    /// Create an account holding `public_key` and return its address.
    pub async fn create_account(&self, payer: FlowAddress, public_key: &PublicKey) -> ExampleResult<FlowAddress> {
        let tx_id = self
            .connector
            .send_sample_transaction(payer, public_key, "cadence/create_account.cdc", DEFAULT_GAS_LIMIT)
            .await?;
        let result = self.connector.wait_for_seal(tx_id).await?;
        let address = account_created_address(&result)?;
        tracing::info!(tx_id = %tx_id, address = %address, "Account created");
        Ok(address)
    }
}

/// Address carried by the first `flow.AccountCreated` event of `result`.
pub fn account_created_address(result: &TransactionResult) -> ExampleResult<FlowAddress> {
    let event = result
        .events
        .iter()
        .find(|e| e.event_type == ACCOUNT_CREATED_EVENT)
        .ok_or_else(|| {
            ExampleError::UnexpectedResponse(format!(
                "transaction {} emitted no {} event",
                result.transaction_id, ACCOUNT_CREATED_EVENT
            ))
        })?;
    Ok(event.field("address")?.as_address()?)
}
