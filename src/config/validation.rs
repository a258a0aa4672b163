//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs, addresses and value ranges
//!
//! Returns all validation errors, not just the first.

use thiserror::Error;

use crate::config::schema::ExamplesConfig;
use crate::sdk::types::{ChainId, FlowAddress};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every section, collecting all problems.
pub fn validate_config(config: &ExamplesConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.access.rest_url) {
        errors.push(ValidationError::new("access.rest_url", format!("invalid URL: {}", e)));
    }
    for url in &config.access.failover_urls {
        if url::Url::parse(url).is_err() {
            errors.push(ValidationError::new("access.failover_urls", format!("invalid URL '{}'", url)));
        }
    }
    if let Some(ws) = &config.access.ws_url {
        match url::Url::parse(ws) {
            Ok(u) if u.scheme() == "ws" || u.scheme() == "wss" => {}
            _ => errors.push(ValidationError::new("access.ws_url", format!("'{}' is not a ws:// or wss:// URL", ws))),
        }
    }
    if config.access.request_timeout_secs == 0 {
        errors.push(ValidationError::new("access.request_timeout_secs", "must be greater than 0"));
    }
    if let Some(chain) = &config.access.chain_id {
        if ChainId::from_name(chain) == ChainId::Unknown {
            errors.push(ValidationError::new("access.chain_id", format!("unknown chain '{}'", chain)));
        }
    }

    if let Err(e) = FlowAddress::from_hex(&config.account.address) {
        errors.push(ValidationError::new("account.address", e.to_string()));
    }
    if config.account.private_key_env.trim().is_empty() {
        errors.push(ValidationError::new("account.private_key_env", "must name an environment variable"));
    }
    if config.account.hash_algorithm.code().is_none() {
        errors.push(ValidationError::new(
            "account.hash_algorithm",
            format!("{} cannot be used for account keys", config.account.hash_algorithm),
        ));
    }

    if config.transactions.gas_limit == 0 {
        errors.push(ValidationError::new("transactions.gas_limit", "must be greater than 0"));
    }
    if config.transactions.deploy_gas_limit == 0 {
        errors.push(ValidationError::new("transactions.deploy_gas_limit", "must be greater than 0"));
    }

    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::new("polling.interval_ms", "must be greater than 0"));
    }
    if config.polling.timeout_secs == Some(0) {
        errors.push(ValidationError::new("polling.timeout_secs", "must be greater than 0 when set"));
    }

    if config.streaming.receive_timeout_ms == 0 {
        errors.push(ValidationError::new("streaming.receive_timeout_ms", "must be greater than 0"));
    }
    if config.streaming.max_reconnect_attempts == 0 {
        errors.push(ValidationError::new("streaming.max_reconnect_attempts", "must be at least 1"));
    }
    if config.streaming.reconnect_base_delay_ms > config.streaming.reconnect_max_delay_ms {
        errors.push(ValidationError::new(
            "streaming.reconnect_base_delay_ms",
            "must not exceed reconnect_max_delay_ms",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
