//! Add a second copy of an account's key 0 to the same account.

use crate::connector::AccessApiConnector;
use crate::error::ExampleResult;
use crate::sdk::{CadenceValue, FlowAddress, TransactionResult, UFix64};

pub struct AddAccountKeyExample {
    connector: AccessApiConnector,
}

impl AddAccountKeyExample {
    pub fn new(connector: AccessApiConnector) -> Self {
        Self { connector }
    }

    /// Register key 0's public key again at full weight.
    pub async fn add_key_to_account(
        &self,
        payer: FlowAddress,
        script_name: &str,
        gas_limit: u64,
    ) -> ExampleResult<TransactionResult> {
        let script = self.connector.scripts().load_script(script_name)?;
        let (tx, payer_key) = self
            .connector
            .single_party_transaction(payer, script, gas_limit)
            .await?;

        let weight: UFix64 = "1000.0".parse()?;
        let mut tx = tx.with_arguments(&[
            CadenceValue::string(payer_key.public_key_hex()),
            CadenceValue::uint8(payer_key.sign_algo.cadence_index()),
            CadenceValue::uint8(payer_key.hash_algo.cadence_index()),
            CadenceValue::ufix64(weight),
        ])?;

        let signer = self.connector.signer_for(&payer_key)?;
        tx.add_envelope_signature(payer, payer_key.index, &signer)?;

        self.connector.send_and_wait(&tx).await
    }
}
