//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the examples.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sdk::crypto::{HashAlgorithm, SignatureAlgorithm};

/// Root configuration for the example runner.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ExamplesConfig {
    /// Access node connection settings.
    pub access: AccessConfig,

    /// Service account used to pay for and sign example transactions.
    pub account: AccountConfig,

    /// Transaction defaults.
    pub transactions: TransactionConfig,

    /// Seal polling.
    pub polling: PollingConfig,

    /// Event streaming.
    pub streaming: StreamingConfig,

    /// Cadence source lookup.
    pub scripts: ScriptsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Access node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// HTTP Access API base URL.
    pub rest_url: String,

    /// Failover HTTP Access API base URLs.
    pub failover_urls: Vec<String>,

    /// Explicit WebSocket URL; derived from `rest_url` when absent.
    pub ws_url: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Expected chain (e.g. "flow-emulator"); checked at startup when set.
    pub chain_id: Option<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            rest_url: "http://127.0.0.1:8888".to_string(),
            failover_urls: Vec::new(),
            ws_url: None,
            request_timeout_secs: 10,
            chain_id: None,
        }
    }
}

/// Service account configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Account address (hex, optional `0x`).
    pub address: String,

    /// Environment variable holding the hex private key.
    pub private_key_env: String,

    /// Signature algorithm of the private key.
    pub signature_algorithm: SignatureAlgorithm,

    /// Hash algorithm of the key given to newly created accounts.
    pub hash_algorithm: HashAlgorithm,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            // emulator service account
            address: "f8d6e0586b0a20c7".to_string(),
            private_key_env: "FLOW_PRIVATE_KEY".to_string(),
            signature_algorithm: SignatureAlgorithm::EcdsaP256,
            hash_algorithm: HashAlgorithm::Sha3_256,
        }
    }
}

/// Transaction defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas limit for example transactions.
    pub gas_limit: u64,

    /// Gas limit for contract deployment.
    pub deploy_gas_limit: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_limit: 500,
            deploy_gas_limit: 1000,
        }
    }
}

/// Seal polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between transaction result polls in milliseconds.
    pub interval_ms: u64,

    /// Give up after this many seconds. Polls forever when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            timeout_secs: None,
        }
    }
}

/// Event streaming configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Idle wait on the stream before checking again, in milliseconds.
    pub receive_timeout_ms: u64,

    /// Consecutive failed reconnects before giving up.
    pub max_reconnect_attempts: u32,

    /// Base delay for reconnect backoff in milliseconds.
    pub reconnect_base_delay_ms: u64,

    /// Maximum reconnect backoff in milliseconds.
    pub reconnect_max_delay_ms: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: 1000,
            max_reconnect_attempts: 5,
            reconnect_base_delay_ms: 200,
            reconnect_max_delay_ms: 5000,
        }
    }
}

/// Cadence source lookup.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Directory whose files override the embedded sources.
    pub directory: Option<PathBuf>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
