//! Client library for confidential compute kettles.

pub mod abi;
pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use blockchain::{ConfidentialSession, KettleClient, KettleError, KettleResult};
pub use config::schema::ClientConfig;
pub use lifecycle::Shutdown;
