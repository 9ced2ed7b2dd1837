use crate::{BigIntFields, IntDecoding, RetryPolicy};

/// Configures HTTP timeout, retry behavior and response decoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry budget and backoff applied to retryable failures.
    pub retry: RetryPolicy,
    /// Default integer decoding mode for JSON responses; individual
    /// requests may override it.
    pub int_decoding: IntDecoding,
    /// Allow-list consulted under [`IntDecoding::MixedBigInt`].
    pub big_int_fields: BigIntFields,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry: RetryPolicy::default(),
            int_decoding: IntDecoding::default(),
            big_int_fields: BigIntFields::default(),
        }
    }
}
