//! `algorand-http` is an async HTTP client for the Algorand node (algod)
//! and indexer v2 REST APIs.
//!
//! Endpoint wrappers are thin path/query builders over one request
//! execution engine that centralizes:
//! - token-bucket rate limiting ([`RateLimiter`])
//! - bounded or unbounded retry with exponential backoff ([`RetryPolicy`])
//! - binary vs. JSON payload handling with content-type defaulting
//! - precision-safe integer decoding of responses ([`IntDecoding`])

mod algod;
mod decode;
mod error;
mod indexer;
mod limiter;
mod options;
mod request;
mod retry;
mod transport;
mod value;

pub use algod::{
    AccountApplicationInformation, AccountAssetInformation, AlgodClient, ApplicationInformation,
    AssetInformation, Compile, Dryrun, GetBlock, HealthCheck, LightBlockHeaderProof,
    SendRawTransaction, StateProof, StatusAfterBlock,
};
pub use decode::{decode_body, BigIntFields, IntDecoding};
pub use error::AlgorandError;
pub use indexer::{IndexerClient, LookupApplicationLogs, LookupBlock};
pub use limiter::{RateLimiter, RateLimiterConfig};
pub use options::ClientOptions;
pub use request::SignedTransactions;
pub use retry::RetryPolicy;
pub use value::Value;

pub type Result<T> = std::result::Result<T, AlgorandError>;
