//! Deploy a contract to the payer's account.

use crate::connector::AccessApiConnector;
use crate::error::ExampleResult;
use crate::sdk::{CadenceValue, FlowAddress, TransactionResult};

/// Default gas limit for deployments.
pub const DEPLOY_GAS_LIMIT: u64 = 1000;

pub struct DeployContractExample {
    connector: AccessApiConnector,
}

impl DeployContractExample {
    pub fn new(connector: AccessApiConnector) -> Self {
        Self { connector }
    }

    /// Deploy the source at `script_name` as contract `name` on `payer`.
    ///
    /// The source travels hex encoded as a transaction argument, so any
    /// contract text is safe to deploy.
    pub async fn deploy_contract(
        &self,
        payer: FlowAddress,
        name: &str,
        script_name: &str,
        gas_limit: u64,
    ) -> ExampleResult<TransactionResult> {
        let code = self.connector.scripts().load_script(script_name)?;
        let deploy = self.connector.scripts().load_script("cadence/deploy_contract.cdc")?;

        let (tx, payer_key) = self
            .connector
            .single_party_transaction(payer, deploy, gas_limit)
            .await?;
        let mut tx = tx.with_arguments(&[
            CadenceValue::string(name),
            CadenceValue::string(hex::encode(&code)),
        ])?;

        let signer = self.connector.signer_for(&payer_key)?;
        tx.add_envelope_signature(payer, payer_key.index, &signer)?;

        tracing::info!(payer = %payer, contract = name, "Deploying contract");
        self.connector.send_and_wait(&tx).await
    }
}
