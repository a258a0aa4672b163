//! Send a transaction with and without arguments.

use crate::connector::AccessApiConnector;
use crate::error::ExampleResult;
use crate::sdk::{CadenceValue, FlowAddress, TransactionResult};

pub const DEFAULT_GREETING: &str = "Hello world!";

pub struct SendTransactionExample {
    connector: AccessApiConnector,
}

impl SendTransactionExample {
    pub fn new(connector: AccessApiConnector) -> Self {
        Self { connector }
    }

    pub async fn send_simple_transaction(
        &self,
        payer: FlowAddress,
        script_name: &str,
        gas_limit: u64,
    ) -> ExampleResult<TransactionResult> {
        self.send(payer, script_name, gas_limit, &[]).await
    }

    /// Send `script_name` with a single `String` argument.
    pub async fn send_complex_transaction_with_arguments(
        &self,
        payer: FlowAddress,
        script_name: &str,
        gas_limit: u64,
        greeting: &str,
    ) -> ExampleResult<TransactionResult> {
        self.send(payer, script_name, gas_limit, &[CadenceValue::string(greeting)])
            .await
    }

    async fn send(
        &self,
        payer: FlowAddress,
        script_name: &str,
        gas_limit: u64,
        arguments: &[CadenceValue],
    ) -> ExampleResult<TransactionResult> {
        let script = self.connector.scripts().load_script(script_name)?;
        let (tx, payer_key) = self
            .connector
            .single_party_transaction(payer, script, gas_limit)
            .await?;
        let mut tx = tx.with_arguments(arguments)?;

        let signer = self.connector.signer_for(&payer_key)?;
        tx.add_envelope_signature(payer, payer_key.index, &signer)?;

        self.connector.send_and_wait(&tx).await
    }
}
