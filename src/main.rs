//! Command line runner for the Flow Access API examples.
//!
//! ```text
//! flow-examples [--config flow-examples.toml] <example> [args]
//!     → config (TOML + defaults, validated)
//!     → RestAccessApi (HTTP + WebSocket access node binding)
//!     → example
//!     → pretty JSON on stdout, logs on stderr
//! ```
//!
//! Signing examples read the service account's private key from the
//! environment variable named by `account.private_key_env`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use flow_examples::config::{load_config, validation::validate_config, ConfigError, ExamplesConfig};
use flow_examples::connector::AccessApiConnector;
use flow_examples::examples::*;
use flow_examples::observability::init_logging;
use flow_examples::scripts::ScriptLoader;
use flow_examples::sdk::crypto::generate_key_pair;
use flow_examples::sdk::{AccessApi, EventFilter, FlowAddress, FlowId, PrivateKey, RestAccessApi};
use flow_examples::{ExampleResult, Shutdown};

#[derive(Parser)]
#[command(name = "flow-examples")]
#[command(about = "Runnable examples for the Flow Access API", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults target a local emulator.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `access.rest_url`.
    #[arg(long)]
    rest_url: Option<String>,

    /// Override `observability.log_level`.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SignVariant {
    SinglePartySingle,
    SinglePartyMulti,
    MultiPartySingle,
    MultiPartyMulti,
    TwoAuthorizers,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account; generates a new P-256 key unless one is given
    CreateAccount {
        #[arg(long)]
        public_key: Option<String>,
    },
    /// Add a copy of key 0 to the service account
    AddKey,
    /// Deploy a contract to the service account
    DeployContract {
        #[arg(long, default_value = "GreatToken")]
        name: String,
        #[arg(long, default_value = "cadence/great_token.cdc")]
        script: String,
    },
    /// Run the simple and complex scripts
    ExecuteScript,
    /// Account at the latest block or a height
    GetAccount {
        address: FlowAddress,
        #[arg(long)]
        height: Option<u64>,
    },
    GetAccountBalance {
        address: FlowAddress,
        #[arg(long)]
        height: Option<u64>,
    },
    /// One key with --index, otherwise all keys
    GetAccountKeys {
        address: FlowAddress,
        #[arg(long)]
        index: Option<u32>,
        #[arg(long)]
        height: Option<u64>,
    },
    /// Latest sealed block unless --id or --height is given
    GetBlock {
        #[arg(long, conflicts_with = "height")]
        id: Option<FlowId>,
        #[arg(long)]
        height: Option<u64>,
    },
    GetCollection {
        id: FlowId,
        /// Fetch the transactions too
        #[arg(long)]
        full: bool,
    },
    /// Events by height range or by block ids
    GetEvents {
        #[arg(long, default_value = "flow.AccountCreated")]
        event_type: String,
        #[arg(long, requires = "end")]
        start: Option<u64>,
        #[arg(long)]
        end: Option<u64>,
        #[arg(long = "block-id")]
        block_ids: Vec<FlowId>,
    },
    GetExecutionResult {
        block_id: FlowId,
    },
    GetNetworkParameters,
    GetNodeVersionInfo,
    /// Protocol state snapshot at the latest sealed block, a block id or a height
    GetProtocolState {
        #[arg(long, conflicts_with = "height")]
        block_id: Option<FlowId>,
        #[arg(long)]
        height: Option<u64>,
    },
    GetTransaction {
        id: FlowId,
        /// Fetch the result instead of the body
        #[arg(long)]
        result: bool,
    },
    /// Send the simple transaction, or the greeting transaction with --greeting
    SendTransaction {
        #[arg(long)]
        greeting: Option<String>,
    },
    /// Send a transaction with one of the signing patterns
    SignTransaction {
        #[arg(value_enum)]
        variant: SignVariant,
        /// Second account for the multi-party patterns
        #[arg(long)]
        other: Option<FlowAddress>,
        /// Environment variable with the second account's private key
        #[arg(long, default_value = "FLOW_OTHER_PRIVATE_KEY")]
        other_key_env: String,
    },
    /// Transfer FLOW from the service account
    Transfer {
        recipient: FlowAddress,
        /// Amount with exactly 8 decimals, e.g. 10.00000000
        amount: String,
    },
    /// Stream events from the latest sealed block
    SubscribeEvents {
        #[arg(long = "event-type")]
        event_types: Vec<String>,
        #[arg(long)]
        max_batches: Option<usize>,
        /// Resubscribe from the last height when the stream drops
        #[arg(long)]
        reconnect: bool,
    },
    /// Stream block execution data from the latest sealed block
    SubscribeExecutionData {
        #[arg(long)]
        max_blocks: Option<usize>,
    },
    /// On-chain signature checks
    VerifySignature {
        #[command(subcommand)]
        check: SignatureCheck,
    },
}

#[derive(Subcommand)]
enum SignatureCheck {
    /// Two one-off keys of weight 0.5 sign a transfer message
    User { bob: FlowAddress },
    /// Keys 0 and 1 of the service account must both verify
    ValidateAll,
    /// Any service account key verifies the message
    ValidateAny {
        #[arg(long, default_value = "ananas")]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ExamplesConfig::default(),
    };
    if let Some(url) = &cli.rest_url {
        config.access.rest_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability.log_level);
    tracing::debug!(rest_url = %config.access.rest_url, "Configuration loaded");

    let api: Arc<dyn AccessApi> = Arc::new(RestAccessApi::new(config.access.clone()).await?);

    if let Err(e) = run(cli.command, &config, api).await {
        tracing::error!(error = %e, "Example failed");
        return Err(e.into());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> ExampleResult<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{}", text);
    Ok(())
}

fn service_address(config: &ExamplesConfig) -> ExampleResult<FlowAddress> {
    Ok(FlowAddress::from_hex(&config.account.address)?)
}

fn service_key(config: &ExamplesConfig) -> ExampleResult<PrivateKey> {
    Ok(PrivateKey::from_env(
        &config.account.private_key_env,
        config.account.signature_algorithm,
    )?)
}

fn connector(config: &ExamplesConfig, api: Arc<dyn AccessApi>) -> ExampleResult<AccessApiConnector> {
    Ok(AccessApiConnector::with_polling(api, service_key(config)?, &config.polling)
        .with_scripts(ScriptLoader::from_config(&config.scripts))
        .with_key_hash_algorithm(config.account.hash_algorithm))
}

async fn run(command: Commands, config: &ExamplesConfig, api: Arc<dyn AccessApi>) -> ExampleResult<()> {
    let scripts = ScriptLoader::from_config(&config.scripts);
    let gas_limit = config.transactions.gas_limit;

    match command {
        Commands::CreateAccount { public_key } => {
            let example = CreateAccountExample::new(connector(config, api)?);
            let payer = service_address(config)?;
            let (public_key, private_key) = match public_key {
                Some(hex) => (
                    flow_examples::sdk::PublicKey::from_hex(&hex, config.account.signature_algorithm)?,
                    None,
                ),
                None => {
                    let pair = generate_key_pair(config.account.signature_algorithm);
                    (pair.public_key, Some(pair.private_key.to_hex()))
                }
            };
            let address = example.create_account(payer, &public_key).await?;
            print_json(&serde_json::json!({
                "address": address,
                "public_key": public_key.to_hex(),
                "private_key": private_key,
            }))
        }
        Commands::AddKey => {
            let example = AddAccountKeyExample::new(connector(config, api)?);
            let result = example
                .add_key_to_account(service_address(config)?, "cadence/add_key.cdc", gas_limit)
                .await?;
            print_json(&result)
        }
        Commands::DeployContract { name, script } => {
            let example = DeployContractExample::new(connector(config, api)?);
            let result = example
                .deploy_contract(
                    service_address(config)?,
                    &name,
                    &script,
                    config.transactions.deploy_gas_limit,
                )
                .await?;
            print_json(&result)
        }
        Commands::ExecuteScript => {
            let example = ExecuteScriptExample::new(api, scripts);
            let simple = example.execute_simple_script().await?.value()?;
            let user = example.execute_complex_script().await?;
            print_json(&serde_json::json!({ "simple": simple, "complex": user }))
        }
        Commands::GetAccount { address, height } => {
            let example = GetAccountExample::new(api);
            let account = match height {
                Some(h) => example.get_account_at_block_height(address, h).await?,
                None => example.get_account_at_latest_block(address).await?,
            };
            print_json(&account)
        }
        Commands::GetAccountBalance { address, height } => {
            let example = GetAccountBalanceExample::new(api);
            let balance = match height {
                Some(h) => example.get_balance_at_block_height(address, h).await?,
                None => example.get_balance_at_latest_block(address).await?,
            };
            print_json(&serde_json::json!({ "address": address, "balance": balance }))
        }
        Commands::GetAccountKeys { address, index, height } => {
            let example = GetAccountKeysExample::new(api);
            match (index, height) {
                (Some(i), Some(h)) => print_json(&example.get_account_key_at_block_height(address, i, h).await?),
                (Some(i), None) => print_json(&example.get_account_key_at_latest_block(address, i).await?),
                (None, Some(h)) => print_json(&example.get_account_keys_at_block_height(address, h).await?),
                (None, None) => print_json(&example.get_account_keys_at_latest_block(address).await?),
            }
        }
        Commands::GetBlock { id, height } => {
            let example = GetBlockExample::new(api);
            let block = match (id, height) {
                (Some(id), _) => example.get_block_by_id(id).await?,
                (None, Some(h)) => example.get_block_by_height(h).await?,
                (None, None) => example.get_latest_sealed_block().await?,
            };
            print_json(&block)
        }
        Commands::GetCollection { id, full } => {
            let example = GetCollectionExample::new(api);
            if full {
                print_json(&example.get_full_collection_by_id(id).await?)
            } else {
                print_json(&example.get_collection_by_id(id).await?)
            }
        }
        Commands::GetEvents { event_type, start, end, block_ids } => {
            let example = GetEventsExample::new(api);
            let events = match (start, end) {
                (Some(start), Some(end)) => example.get_events_for_height_range(&event_type, start, end).await?,
                _ => example.get_events_for_block_ids(&event_type, &block_ids).await?,
            };
            print_json(&events)
        }
        Commands::GetExecutionResult { block_id } => {
            let example = GetExecutionDataExample::new(api);
            print_json(&example.get_execution_result_by_block_id(block_id).await?)
        }
        Commands::GetNetworkParameters => {
            let chain_id = GetNetworkParametersExample::new(api).get_network_parameters().await?;
            print_json(&serde_json::json!({ "chain_id": chain_id }))
        }
        Commands::GetNodeVersionInfo => {
            print_json(&GetNodeVersionInfoExample::new(api).get_node_version_info().await?)
        }
        Commands::GetProtocolState { block_id, height } => {
            let example = GetProtocolStateExample::new(api);
            let snapshot = match (block_id, height) {
                (Some(id), _) => example.get_protocol_state_snapshot_by_block_id(id).await?,
                (None, Some(h)) => example.get_protocol_state_snapshot_by_height(h).await?,
                (None, None) => example.get_latest_protocol_state_snapshot().await?,
            };
            print_json(&snapshot)
        }
        Commands::GetTransaction { id, result } => {
            let example = GetTransactionExample::new(api);
            if result {
                print_json(&example.get_transaction_result(id).await?)
            } else {
                print_json(&example.get_transaction(id).await?)
            }
        }
        Commands::SendTransaction { greeting } => {
            let example = SendTransactionExample::new(connector(config, api)?);
            let payer = service_address(config)?;
            let result = match greeting {
                Some(greeting) => {
                    example
                        .send_complex_transaction_with_arguments(
                            payer,
                            "cadence/greeting_script.cdc",
                            gas_limit,
                            &greeting,
                        )
                        .await?
                }
                None => {
                    example
                        .send_simple_transaction(payer, "cadence/simple_transaction.cdc", gas_limit)
                        .await?
                }
            };
            print_json(&result)
        }
        Commands::SignTransaction { variant, other, other_key_env } => {
            let connector = connector(config, api)?;
            let own_key = connector.private_key().clone();
            let example = SignTransactionExample::new(connector);
            let payer = service_address(config)?;
            let other_party = || -> ExampleResult<(FlowAddress, PrivateKey)> {
                let address = other.ok_or_else(|| {
                    flow_examples::ExampleError::InvalidArgument(
                        "--other is required for multi-party signing".to_string(),
                    )
                })?;
                let key = PrivateKey::from_env(&other_key_env, config.account.signature_algorithm)?;
                Ok((address, key))
            };

            let script = "cadence/simple_transaction.cdc";
            let result = match variant {
                SignVariant::SinglePartySingle => {
                    example.single_party_single_signature(payer, script, gas_limit).await?
                }
                SignVariant::SinglePartyMulti => {
                    example
                        .single_party_multi_signature(payer, script, config.transactions.deploy_gas_limit)
                        .await?
                }
                SignVariant::MultiPartySingle => {
                    let (authorizer, authorizer_key) = other_party()?;
                    example
                        .multi_party_single_signature(&authorizer_key, &own_key, payer, authorizer, script, gas_limit)
                        .await?
                }
                SignVariant::MultiPartyMulti => {
                    let (authorizer, authorizer_key) = other_party()?;
                    example
                        .multi_party_multi_signature(
                            &[authorizer_key.clone(), authorizer_key],
                            &[own_key.clone(), own_key],
                            payer,
                            authorizer,
                            script,
                            gas_limit,
                        )
                        .await?
                }
                SignVariant::TwoAuthorizers => {
                    let (first, first_key) = other_party()?;
                    example
                        .multi_party_two_authorizers(
                            &first_key,
                            &own_key,
                            payer,
                            first,
                            payer,
                            "cadence/simple_transaction_2_authorizers.cdc",
                            gas_limit,
                        )
                        .await?
                }
            };
            print_json(&result)
        }
        Commands::Transfer { recipient, amount } => {
            let connector = connector(config, api)?;
            let result = connector
                .transfer_tokens(service_address(config)?, recipient, &amount)
                .await?;
            print_json(&result)
        }
        Commands::SubscribeEvents { event_types, max_batches, reconnect } => {
            let filter = EventFilter {
                event_types,
                ..Default::default()
            };
            let shutdown = Shutdown::new();
            shutdown.trigger_on_ctrl_c();

            let received = if reconnect {
                SubscribeEventsReconnectExample::new(api, config.streaming.clone())
                    .stream_events(filter, max_batches, shutdown.subscribe())
                    .await?
            } else {
                let example = SubscribeEventsExample::new(api);
                let subscription = example.subscribe_to_latest_block_events(filter).await?;
                example.consume(subscription, max_batches, shutdown.subscribe()).await
            };
            print_json(&received)
        }
        Commands::SubscribeExecutionData { max_blocks } => {
            let shutdown = Shutdown::new();
            shutdown.trigger_on_ctrl_c();
            let received = SubscribeExecutionDataExample::new(api)
                .stream_execution_data(max_blocks, shutdown.subscribe())
                .await?;
            print_json(&received)
        }
        Commands::VerifySignature { check } => {
            let example = VerifySignatureExample::new(api, scripts);
            let alice = service_address(config)?;
            match check {
                SignatureCheck::User { bob } => print_json(&example.user_signature(alice, bob).await?),
                SignatureCheck::ValidateAll => {
                    print_json(&example.validate_all(alice, &service_key(config)?).await?)
                }
                SignatureCheck::ValidateAny { message } => {
                    let valid = example.validate_any(alice, &service_key(config)?, &message).await?;
                    print_json(&serde_json::json!({ "valid": valid }))
                }
            }
        }
    }
}
