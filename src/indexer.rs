use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;

use crate::{
    request::EndpointRequest, transport::HttpTransport, ClientOptions, IntDecoding, RateLimiter,
    Result, Value,
};

const INDEXER_TOKEN_HEADER: &str = "x-indexer-api-token";

/// HTTP client for an Algorand indexer's REST API.
///
/// Same execution model as [`AlgodClient`](crate::AlgodClient): wrappers
/// share the client's options and rate limiter and run through the common
/// retry/decoding engine.
#[derive(Clone, Debug)]
pub struct IndexerClient {
    transport: HttpTransport,
    options: ClientOptions,
    limiter: Option<RateLimiter>,
}

impl IndexerClient {
    /// Creates a client for the indexer at `base_url` using an API token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::build(base_url, Some(token.into()))
    }

    /// Creates a client for a public endpoint that requires no token.
    pub fn without_token(base_url: impl Into<String>) -> Self {
        Self::build(base_url, None)
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `INDEXER_URL`: indexer base URL
    /// - `INDEXER_TOKEN`: API token, optional for public endpoints
    ///
    /// Returns an error if `INDEXER_URL` is missing or empty.
    pub fn from_env() -> std::result::Result<Self, String> {
        let url = std::env::var("INDEXER_URL")
            .map_err(|_| "missing INDEXER_URL environment variable".to_owned())?;
        if url.trim().is_empty() {
            return Err("INDEXER_URL is set but empty".to_owned());
        }
        let token = std::env::var("INDEXER_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Ok(Self::build(url, token))
    }

    fn build(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            transport: HttpTransport::new(base_url, INDEXER_TOKEN_HEADER, token),
            options: ClientOptions::default(),
            limiter: None,
        }
    }

    /// Applies client options such as timeout, retry and decoding defaults.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Shares a rate limiter with every request made through this client.
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    fn request(&self, method: Method, path: impl Into<String>) -> EndpointRequest<'_> {
        EndpointRequest::new(
            &self.transport,
            &self.options,
            self.limiter.clone(),
            method,
            path,
        )
    }

    /// `GET /v2/blocks/{round}`: the indexed block for a round.
    pub fn lookup_block(&self, round: u64) -> LookupBlock<'_> {
        LookupBlock {
            inner: self.request(Method::GET, format!("/v2/blocks/{round}")),
        }
    }

    /// `GET /v2/applications/{application_id}/logs`: log messages emitted
    /// by an application, newest page first.
    pub fn lookup_application_logs(&self, application_id: u64) -> LookupApplicationLogs<'_> {
        LookupApplicationLogs {
            inner: self.request(
                Method::GET,
                format!("/v2/applications/{application_id}/logs"),
            ),
        }
    }
}

/// Request wrapper for `GET /v2/blocks/{round}`.
#[derive(Debug)]
pub struct LookupBlock<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> LookupBlock<'a> {
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.inner.insert_header(name, value);
        self
    }

    pub fn retry_if_failed(mut self, retry: bool) -> Self {
        self.inner.set_retry_if_failed(retry);
        self
    }

    pub fn int_decoding(mut self, mode: IntDecoding) -> Self {
        self.inner.set_int_decoding(mode);
        self
    }

    pub async fn execute(self) -> Result<Value> {
        self.inner.execute().await
    }
}

/// Request wrapper for `GET /v2/applications/{application_id}/logs`.
#[derive(Debug)]
pub struct LookupApplicationLogs<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> LookupApplicationLogs<'a> {
    /// Maximum number of results to return.
    pub fn limit(mut self, limit: u64) -> Self {
        self.inner.upsert_query("limit", limit);
        self
    }

    /// Includes results at or after the given round.
    pub fn min_round(mut self, round: u64) -> Self {
        self.inner.upsert_query("min-round", round);
        self
    }

    /// Includes results at or before the given round.
    pub fn max_round(mut self, round: u64) -> Self {
        self.inner.upsert_query("max-round", round);
        self
    }

    /// Continues a paginated lookup from the token returned by the
    /// previous page.
    pub fn next_token(mut self, token: impl ToString) -> Self {
        self.inner.upsert_query("next", token);
        self
    }

    /// Only includes transactions with this sender address.
    pub fn sender(mut self, address: impl ToString) -> Self {
        self.inner.upsert_query("sender-address", address);
        self
    }

    /// Lookup the specific transaction by ID.
    pub fn txid(mut self, txid: impl ToString) -> Self {
        self.inner.upsert_query("txid", txid);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.inner.insert_header(name, value);
        self
    }

    pub fn retry_if_failed(mut self, retry: bool) -> Self {
        self.inner.set_retry_if_failed(retry);
        self
    }

    pub fn int_decoding(mut self, mode: IntDecoding) -> Self {
        self.inner.set_int_decoding(mode);
        self
    }

    pub async fn execute(self) -> Result<Value> {
        self.inner.execute().await
    }
}
