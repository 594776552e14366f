//! AWS collaborators for the seedbomb provisioning consumer.
//!
//! This crate provides feature-gated adapters over AWS services:
//!
//! - **SQS** (`sqs` feature): long-poll the provisioning queue and
//!   acknowledge (delete) processed messages
//! - **Secrets Manager** (`secretsmanager` feature): fetch the dispatch
//!   bearer token on every invocation
//!
//! All adapters share a common [`AwsBaseConfig`](config::AwsBaseConfig) for
//! region, endpoint override, and optional STS assume-role credentials.

pub mod auth;
pub mod config;
pub mod error;

#[cfg(feature = "sqs")]
pub mod sqs;

#[cfg(feature = "secretsmanager")]
pub mod secrets;

// Re-exports for convenience.
pub use config::AwsBaseConfig;
pub use error::AwsError;

#[cfg(feature = "sqs")]
pub use sqs::{SqsAcknowledger, SqsConfig, SqsReceiver};

#[cfg(feature = "secretsmanager")]
pub use secrets::{SecretsManagerConfig, SecretsManagerCredentialProvider};
