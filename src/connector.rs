//! Shared access helpers used by every example.
//!
//! # Data Flow
//! ```text
//! example
//!     → AccessApiConnector (account/key lookup, reference block, signing)
//!     → AccessApi::send_transaction
//!     → wait_for_seal (poll get_transaction_result until Sealed)
//!     → TransactionResult
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use crate::config::PollingConfig;
use crate::error::{ExampleError, ExampleResult};
use crate::scripts::ScriptLoader;
use crate::sdk::crypto::{get_signer, KeySigner};
use crate::sdk::{
    Account, AccessApi, AccountKey, CadenceValue, FlowAddress, FlowId, HashAlgorithm, PrivateKey, ProposalKey,
    PublicKey, Transaction, TransactionResult, TransactionStatus, UFix64,
};

/// Default gas limit for example transactions.
pub const DEFAULT_GAS_LIMIT: u64 = 500;

/// Access client handle plus the private key examples sign with.
#[derive(Clone)]
pub struct AccessApiConnector {
    api: Arc<dyn AccessApi>,
    private_key: PrivateKey,
    scripts: ScriptLoader,
    poll_interval: Duration,
    seal_timeout: Option<Duration>,
    /// Hash algorithm given to keys of newly created accounts.
    key_hash_algorithm: HashAlgorithm,
}

impl AccessApiConnector {
    pub fn new(api: Arc<dyn AccessApi>, private_key: PrivateKey) -> Self {
        Self::with_polling(api, private_key, &PollingConfig::default())
    }

    pub fn with_polling(api: Arc<dyn AccessApi>, private_key: PrivateKey, polling: &PollingConfig) -> Self {
        Self {
            api,
            private_key,
            scripts: ScriptLoader::embedded(),
            poll_interval: Duration::from_millis(polling.interval_ms),
            seal_timeout: polling.timeout_secs.map(Duration::from_secs),
            key_hash_algorithm: HashAlgorithm::Sha3_256,
        }
    }

    pub fn with_scripts(mut self, scripts: ScriptLoader) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn with_key_hash_algorithm(mut self, hash_algorithm: HashAlgorithm) -> Self {
        self.key_hash_algorithm = hash_algorithm;
        self
    }

    pub fn api(&self) -> &Arc<dyn AccessApi> {
        &self.api
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn scripts(&self) -> &ScriptLoader {
        &self.scripts
    }

    /// Id of the latest sealed block, used as the reference block.
    pub async fn latest_block_id(&self) -> ExampleResult<FlowId> {
        Ok(self.api.get_latest_block_header(true).await?.id)
    }

    pub async fn get_account(&self, address: FlowAddress) -> ExampleResult<Account> {
        Ok(self.api.get_account_at_latest_block(address).await?)
    }

    pub async fn get_account_balance(&self, address: FlowAddress) -> ExampleResult<UFix64> {
        Ok(self.get_account(address).await?.balance)
    }

    /// Key `index` of `address`; an index the account does not have is an error.
    pub async fn get_account_key(&self, address: FlowAddress, index: u32) -> ExampleResult<AccountKey> {
        let account = self.get_account(address).await?;
        account
            .key(index)
            .cloned()
            .ok_or(ExampleError::KeyIndexOutOfRange { address, index })
    }

    /// Transaction result; a non-empty error message is an error.
    pub async fn get_transaction_result(&self, id: FlowId) -> ExampleResult<TransactionResult> {
        let result = self.api.get_transaction_result_by_id(id).await?;
        if !result.error_message.is_empty() {
            return Err(ExampleError::TransactionFailed {
                id,
                message: result.error_message,
            });
        }
        Ok(result)
    }

    /// Poll until the transaction is sealed.
    ///
    /// Polls forever unless a seal timeout is configured. An expired
    /// transaction never seals and is reported as an error.
    pub async fn wait_for_seal(&self, id: FlowId) -> ExampleResult<TransactionResult> {
        let poll = async {
            loop {
                let result = self.get_transaction_result(id).await?;
                match result.status {
                    TransactionStatus::Sealed => {
                        tracing::info!(tx_id = %id, block_height = result.block_height, "Transaction sealed");
                        return Ok(result);
                    }
                    TransactionStatus::Expired => return Err(ExampleError::Expired { id }),
                    status => {
                        tracing::debug!(tx_id = %id, status = ?status, "Waiting for seal");
                    }
                }
                sleep(self.poll_interval).await;
            }
        };

        match self.seal_timeout {
            Some(limit) => timeout(limit, poll).await.map_err(|_| ExampleError::SealTimeout {
                id,
                seconds: limit.as_secs(),
            })?,
            None => poll.await,
        }
    }

    /// Signer for `key` backed by the connector's private key.
    pub fn signer_for(&self, key: &AccountKey) -> ExampleResult<KeySigner> {
        Ok(get_signer(&self.private_key, key.hash_algo)?)
    }

    /// Unsigned transaction proposed and paid by `payer` key 0, authorized by `payer`.
    pub async fn single_party_transaction(
        &self,
        payer: FlowAddress,
        script: Vec<u8>,
        gas_limit: u64,
    ) -> ExampleResult<(Transaction, AccountKey)> {
        let payer_key = self.get_account_key(payer, 0).await?;
        let tx = Transaction::new(
            script,
            self.latest_block_id().await?,
            gas_limit,
            ProposalKey {
                address: payer,
                key_index: payer_key.index,
                sequence_number: payer_key.sequence_number,
            },
            payer,
        )
        .with_authorizer(payer);
        Ok((tx, payer_key))
    }

    /// Submit a signed transaction.
    pub async fn send_transaction(&self, tx: &Transaction) -> ExampleResult<FlowId> {
        let id = self.api.send_transaction(tx).await?;
        tracing::info!(tx_id = %id, payer = %tx.payer, "Transaction submitted");
        Ok(id)
    }

    /// Submit and wait for the seal.
    pub async fn send_and_wait(&self, tx: &Transaction) -> ExampleResult<TransactionResult> {
        let id = self.send_transaction(tx).await?;
        self.wait_for_seal(id).await
    }

    /// Submit `script_name` with a public key argument pair, signed by `payer` key 0.
    pub async fn send_sample_transaction(
        &self,
        payer: FlowAddress,
        public_key: &PublicKey,
        script_name: &str,
        gas_limit: u64,
    ) -> ExampleResult<FlowId> {
        let script = self.scripts.load_script(script_name)?;
        let (tx, payer_key) = self.single_party_transaction(payer, script, gas_limit).await?;
        let mut tx = tx.with_arguments(&[
            CadenceValue::string(public_key.to_hex()),
            CadenceValue::uint8(public_key.algorithm().cadence_index()),
            CadenceValue::uint8(self.key_hash_algorithm.cadence_index()),
        ])?;

        let signer = self.signer_for(&payer_key)?;
        tx.add_envelope_signature(payer, payer_key.index, &signer)?;

        self.send_transaction(&tx).await
    }

    /// Move FLOW from `sender` to `recipient` and wait for the seal.
    ///
    /// `amount` must be written with exactly eight decimal places, e.g. `10.00000000`.
    pub async fn transfer_tokens(
        &self,
        sender: FlowAddress,
        recipient: FlowAddress,
        amount: &str,
    ) -> ExampleResult<TransactionResult> {
        let amount = UFix64::parse_exact(amount)
            .map_err(|_| ExampleError::InvalidAmountScale(amount.to_string()))?;

        let script = self.scripts.load_script("cadence/transfer_flow.cdc")?;
        let (tx, sender_key) = self
            .single_party_transaction(sender, script, DEFAULT_GAS_LIMIT)
            .await?;
        let mut tx = tx.with_arguments(&[CadenceValue::ufix64(amount), CadenceValue::address(recipient)])?;

        let signer = self.signer_for(&sender_key)?;
        tx.add_envelope_signature(sender, sender_key.index, &signer)?;

        tracing::info!(sender = %sender, recipient = %recipient, amount = %amount, "Transferring tokens");
        self.send_and_wait(&tx).await
    }
}

impl std::fmt::Debug for AccessApiConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessApiConnector")
            .field("poll_interval", &self.poll_interval)
            .field("seal_timeout", &self.seal_timeout)
            .finish_non_exhaustive()
    }
}
