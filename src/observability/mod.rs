//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! connector / examples / sdk::rest
//!     → tracing macros (tx_id, address, height fields)
//!     → logging.rs (EnvFilter + fmt layer on stderr)
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted strings
//! - Key material is never a field; only addresses and key indexes

pub mod logging;

pub use logging::init_logging;
