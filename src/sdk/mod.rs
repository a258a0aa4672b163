//! Flow access layer used by the examples.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key)
//!     → crypto.rs (key loading, signer)
//!     → transaction.rs (canonical forms, payload/envelope signatures)
//!     → access.rs (AccessApi client handle)
//!     → rest.rs (HTTP + WebSocket binding with timeouts)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables or explicit hex
//! - Never log private keys
//! - All access calls have configurable timeouts

pub mod access;
pub mod cadence;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod rest;
pub mod transaction;
pub mod types;

pub use access::{
    AccessApi, AccessApiExt, EventFilter, EventSubscription, ExecutionDataSubscription,
    ScriptRequest, ScriptResponse, ScriptTarget, Subscription, SubscriptionSink,
};
pub use cadence::{CadenceError, CadenceValue};
pub use crypto::{
    CryptoError, HashAlgorithm, KeyPair, PrivateKey, PublicKey, SignatureAlgorithm, Signer,
};
pub use error::{AccessError, AccessResult, FlowErrorCode};
pub use rest::RestAccessApi;
pub use transaction::{ProposalKey, Transaction, TransactionError, TransactionSignature};
pub use types::{
    Account, AccountKey, Block, BlockEvents, BlockExecutionData, BlockHeader, ChainId,
    ChunkExecutionData, Collection, Event, EventResult, ExecutionDataTransactionResult,
    ExecutionResult, FlowAddress, FlowId, ModelError, NodeVersionInfo, ProtocolSnapshot,
    TransactionResult, TransactionStatus, UFix64,
};
