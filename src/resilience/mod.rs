//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Event stream drops or errors:
//!     → backoff.rs (ReconnectPolicy counts attempts, computes delay)
//!     → resubscribe from the last seen height
//!     → successful receive resets the counter
//! ```
//!
//! Request deadlines live with the access client (`sdk::rest`).

pub mod backoff;

pub use backoff::{calculate_backoff, ReconnectPolicy};
