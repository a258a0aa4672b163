//! Signing patterns: one or many parties, one or many keys per party.
//!
//! Payload signatures come from authorizers that are not the payer; the
//! payer always signs the envelope last.

use crate::connector::AccessApiConnector;
use crate::error::ExampleResult;
use crate::sdk::crypto::get_signer;
use crate::sdk::{AccountKey, FlowAddress, PrivateKey, ProposalKey, Transaction, TransactionResult};

pub struct SignTransactionExample {
    connector: AccessApiConnector,
}

impl SignTransactionExample {
    pub fn new(connector: AccessApiConnector) -> Self {
        Self { connector }
    }

    async fn unsigned(
        &self,
        script_name: &str,
        gas_limit: u64,
        proposer: FlowAddress,
        proposer_key: &AccountKey,
        payer: FlowAddress,
        authorizers: &[FlowAddress],
    ) -> ExampleResult<Transaction> {
        let script = self.connector.scripts().load_script(script_name)?;
        let mut tx = Transaction::new(
            script,
            self.connector.latest_block_id().await?,
            gas_limit,
            ProposalKey {
                address: proposer,
                key_index: proposer_key.index,
                sequence_number: proposer_key.sequence_number,
            },
            payer,
        );
        for authorizer in authorizers {
            tx = tx.with_authorizer(*authorizer);
        }
        Ok(tx)
    }

    /// One account proposes, pays and authorizes with key 0.
    pub async fn single_party_single_signature(
        &self,
        payer: FlowAddress,
        script_name: &str,
        gas_limit: u64,
    ) -> ExampleResult<TransactionResult> {
        let payer_key = self.connector.get_account_key(payer, 0).await?;
        let mut tx = self
            .unsigned(script_name, gas_limit, payer, &payer_key, payer, &[payer])
            .await?;

        let signer = self.connector.signer_for(&payer_key)?;
        tx.add_envelope_signature(payer, payer_key.index, &signer)?;

        self.connector.send_and_wait(&tx).await
    }

    /// One account signs the envelope with keys 0 and 1.
    pub async fn single_party_multi_signature(
        &self,
        payer: FlowAddress,
        script_name: &str,
        gas_limit: u64,
    ) -> ExampleResult<TransactionResult> {
        let key1 = self.connector.get_account_key(payer, 0).await?;
        let key2 = self.connector.get_account_key(payer, 1).await?;
        let mut tx = self
            .unsigned(script_name, gas_limit, payer, &key1, payer, &[payer])
            .await?;

        let signer = self.connector.signer_for(&key1)?;
        tx.add_envelope_signature(payer, key1.index, &signer)?;
        tx.add_envelope_signature(payer, key2.index, &signer)?;

        self.connector.send_and_wait(&tx).await
    }

    /// The authorizer proposes and signs the payload; a second account pays.
    pub async fn multi_party_single_signature(
        &self,
        authorizer_private_key: &PrivateKey,
        payer_private_key: &PrivateKey,
        payer: FlowAddress,
        authorizer: FlowAddress,
        script_name: &str,
        gas_limit: u64,
    ) -> ExampleResult<TransactionResult> {
        let authorizer_key = self.connector.get_account_key(authorizer, 0).await?;
        let payer_key = self.connector.get_account_key(payer, 0).await?;
        let mut tx = self
            .unsigned(script_name, gas_limit, authorizer, &authorizer_key, payer, &[authorizer])
            .await?;

        let authorizer_signer = get_signer(authorizer_private_key, authorizer_key.hash_algo)?;
        tx.add_payload_signature(authorizer, authorizer_key.index, &authorizer_signer)?;

        let payer_signer = get_signer(payer_private_key, payer_key.hash_algo)?;
        tx.add_envelope_signature(payer, payer_key.index, &payer_signer)?;

        self.connector.send_and_wait(&tx).await
    }

    /// Like [`multi_party_single_signature`](Self::multi_party_single_signature)
    /// with both parties signing with keys 0 and 1.
    pub async fn multi_party_multi_signature(
        &self,
        authorizer_private_keys: &[PrivateKey; 2],
        payer_private_keys: &[PrivateKey; 2],
        payer: FlowAddress,
        authorizer: FlowAddress,
        script_name: &str,
        gas_limit: u64,
    ) -> ExampleResult<TransactionResult> {
        let authorizer_keys = self.key_pair_of(authorizer).await?;
        let payer_keys = self.key_pair_of(payer).await?;
        let mut tx = self
            .unsigned(script_name, gas_limit, authorizer, &authorizer_keys[0], payer, &[authorizer])
            .await?;

        for (key, private_key) in authorizer_keys.iter().zip(authorizer_private_keys) {
            let signer = get_signer(private_key, key.hash_algo)?;
            tx.add_payload_signature(authorizer, key.index, &signer)?;
        }
        for (key, private_key) in payer_keys.iter().zip(payer_private_keys) {
            let signer = get_signer(private_key, key.hash_algo)?;
            tx.add_envelope_signature(payer, key.index, &signer)?;
        }

        self.connector.send_and_wait(&tx).await
    }

    /// Two authorizers; the first proposes and signs the payload, the second signs the envelope.
    ///
    /// The node only accepts this when the second authorizer is also the payer.
    #[allow(clippy::too_many_arguments)]
    pub async fn multi_party_two_authorizers(
        &self,
        first_private_key: &PrivateKey,
        second_private_key: &PrivateKey,
        payer: FlowAddress,
        first_authorizer: FlowAddress,
        second_authorizer: FlowAddress,
        script_name: &str,
        gas_limit: u64,
    ) -> ExampleResult<TransactionResult> {
        let first_key = self.connector.get_account_key(first_authorizer, 0).await?;
        let second_key = self.connector.get_account_key(second_authorizer, 0).await?;
        let mut tx = self
            .unsigned(
                script_name,
                gas_limit,
                first_authorizer,
                &first_key,
                payer,
                &[first_authorizer, second_authorizer],
            )
            .await?;

        let first_signer = get_signer(first_private_key, first_key.hash_algo)?;
        tx.add_payload_signature(first_authorizer, first_key.index, &first_signer)?;

        let second_signer = get_signer(second_private_key, second_key.hash_algo)?;
        tx.add_envelope_signature(second_authorizer, second_key.index, &second_signer)?;

        self.connector.send_and_wait(&tx).await
    }

    async fn key_pair_of(&self, address: FlowAddress) -> ExampleResult<[AccountKey; 2]> {
        let first = self.connector.get_account_key(address, 0).await?;
        let second = self.connector.get_account_key(address, 1).await?;
        Ok([first, second])
    }
}
