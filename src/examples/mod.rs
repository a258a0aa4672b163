//! Example programs, one type per scenario.
//!
//! Every example holds an injected [`AccessApi`](crate::sdk::AccessApi)
//! handle, directly or through an
//! [`AccessApiConnector`](crate::connector::AccessApiConnector) when it signs.

pub mod accounts;
pub mod add_key;
pub mod blocks;
pub mod create_account;
pub mod deploy_contract;
pub mod events;
pub mod execute_script;
pub mod network;
pub mod protocol_state;
pub mod send_transaction;
pub mod sign_transaction;
pub mod subscribe_events;
pub mod subscribe_events_reconnect;
pub mod subscribe_execution_data;
pub mod transactions;
pub mod verify_signature;

pub use accounts::{GetAccountBalanceExample, GetAccountExample, GetAccountKeysExample};
pub use add_key::AddAccountKeyExample;
pub use blocks::{GetBlockExample, GetCollectionExample, GetExecutionDataExample};
pub use create_account::CreateAccountExample;
pub use deploy_contract::DeployContractExample;
pub use events::GetEventsExample;
pub use execute_script::{ExecuteScriptExample, User};
pub use network::{GetNetworkParametersExample, GetNodeVersionInfoExample};
pub use protocol_state::GetProtocolStateExample;
pub use send_transaction::SendTransactionExample;
pub use sign_transaction::SignTransactionExample;
pub use subscribe_events::{ReceivedEvents, SubscribeEventsExample};
pub use subscribe_events_reconnect::SubscribeEventsReconnectExample;
pub use subscribe_execution_data::{ReceivedExecutionData, SubscribeExecutionDataExample};
pub use transactions::GetTransactionExample;
pub use verify_signature::VerifySignatureExample;
