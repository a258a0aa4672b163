//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Ctrl+C → shutdown.rs (broadcast) → streaming examples stop and cancel their subscription
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
