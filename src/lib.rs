//! Flow Access API usage examples.
//!
//! Each example takes an injected [`sdk::AccessApi`] handle and runs one
//! linear sequence: fetch account and key, build the request, sign, submit,
//! wait for the seal, extract the response.

pub mod config;
pub mod connector;
pub mod error;
pub mod examples;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod scripts;
pub mod sdk;

pub use config::schema::ExamplesConfig;
pub use connector::AccessApiConnector;
pub use error::{ExampleError, ExampleResult};
pub use lifecycle::Shutdown;
