use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;

use crate::{
    request::{EndpointRequest, Payload, ResponseKind, SignedTransactions},
    transport::HttpTransport,
    ClientOptions, IntDecoding, RateLimiter, Result, Value,
};

const ALGOD_TOKEN_HEADER: &str = "x-algo-api-token";

/// HTTP client for an Algorand node's REST API.
///
/// Each method returns a request wrapper: chain query builders on it, then
/// call `execute()`. Wrappers share the client's options and, when one is
/// configured, its rate limiter.
#[derive(Clone, Debug)]
pub struct AlgodClient {
    transport: HttpTransport,
    options: ClientOptions,
    limiter: Option<RateLimiter>,
}

impl AlgodClient {
    /// Creates a client for the node at `base_url` using an API token.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use algorand_http::AlgodClient;
    ///
    /// let algod = AlgodClient::new("http://localhost:4001", "my-api-token");
    /// ```
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
    /// - `ALGOD_URL`: node base URL (e.g. `http://localhost:4001`)
    /// - `ALGOD_TOKEN`: API token, optional for public endpoints
    ///
    /// Returns an error if `ALGOD_URL` is missing or empty.
    pub fn from_env() -> std::result::Result<Self, String> {
        let url = std::env::var("ALGOD_URL")
            .map_err(|_| "missing ALGOD_URL environment variable".to_owned())?;
        if url.trim().is_empty() {
            return Err("ALGOD_URL is set but empty".to_owned());
        }
        let token = std::env::var("ALGOD_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Ok(Self::build(url, token))
    }

    fn build(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            transport: HttpTransport::new(base_url, ALGOD_TOKEN_HEADER, token),
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
    /// Clones of the same limiter drain one bucket, so it can also be
    /// shared with other clients.
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

    /// `GET /health`: node liveness probe.
    pub fn health_check(&self) -> HealthCheck<'_> {
        let mut inner = self.request(Method::GET, "/health");
        inner.set_response(ResponseKind::Empty);
        HealthCheck { inner }
    }

    /// `GET /v2/blocks/{round}`: the block for a round as raw msgpack
    /// bytes. Decoding the block is left to the caller.
    pub fn block(&self, round: u64) -> GetBlock<'_> {
        let mut inner = self.request(Method::GET, format!("/v2/blocks/{round}"));
        inner.upsert_query("format", "msgpack");
        inner.set_response(ResponseKind::Raw);
        GetBlock { inner }
    }

    /// `POST /v2/teal/compile`: compiles TEAL source. The node must have
    /// the developer API enabled.
    pub fn compile(&self, source: impl AsRef<[u8]>) -> Compile<'_> {
        let mut inner = self.request(Method::POST, "/v2/teal/compile");
        inner.set_payload(Payload::Binary {
            bytes: source.as_ref().to_vec(),
            default_content_type: "text/plain",
        });
        Compile { inner }
    }

    /// `POST /v2/teal/dryrun`: simulates execution of a caller-encoded
    /// dryrun request blob.
    pub fn dryrun(&self, blob: impl AsRef<[u8]>) -> Dryrun<'_> {
        let mut inner = self.request(Method::POST, "/v2/teal/dryrun");
        inner.set_payload(Payload::Binary {
            bytes: blob.as_ref().to_vec(),
            default_content_type: "text/plain",
        });
        Dryrun { inner }
    }

    /// `POST /v2/teal/dryrun` with the request given as JSON. The node
    /// accepts both encodings; this one skips client-side encoding and is
    /// serialized by the transport with `application/json`.
    pub fn dryrun_json(&self, request: serde_json::Value) -> Dryrun<'_> {
        let mut inner = self.request(Method::POST, "/v2/teal/dryrun");
        inner.set_payload(Payload::Json(request));
        Dryrun { inner }
    }

    /// `POST /v2/transactions`: broadcasts one signed transaction or a
    /// flattened group. An empty group fails validation here, before any
    /// rate-limit token is consumed or network call made.
    pub fn send_raw_transaction(
        &self,
        stx_or_group: impl Into<SignedTransactions>,
    ) -> Result<SendRawTransaction<'_>> {
        let bytes = stx_or_group.into().into_body()?;
        let mut inner = self.request(Method::POST, "/v2/transactions");
        inner.set_payload(Payload::Binary {
            bytes,
            default_content_type: "application/x-binary",
        });
        Ok(SendRawTransaction { inner })
    }

    /// `GET /v2/status/wait-for-block-after/{round}`: blocks server-side
    /// until a round after the given one, then reports node status.
    pub fn status_after_block(&self, round: u64) -> StatusAfterBlock<'_> {
        StatusAfterBlock {
            inner: self.request(
                Method::GET,
                format!("/v2/status/wait-for-block-after/{round}"),
            ),
        }
    }

    /// `GET /v2/accounts/{address}/applications/{application_id}`: an
    /// account's state for one application.
    pub fn account_application_information(
        &self,
        address: &str,
        application_id: u64,
    ) -> AccountApplicationInformation<'_> {
        AccountApplicationInformation {
            inner: self.request(
                Method::GET,
                format!("/v2/accounts/{address}/applications/{application_id}"),
            ),
        }
    }

    /// `GET /v2/accounts/{address}/assets/{asset_id}`: an account's holding
    /// of one asset.
    pub fn account_asset_information(
        &self,
        address: &str,
        asset_id: u64,
    ) -> AccountAssetInformation<'_> {
        AccountAssetInformation {
            inner: self.request(
                Method::GET,
                format!("/v2/accounts/{address}/assets/{asset_id}"),
            ),
        }
    }

    /// `GET /v2/applications/{application_id}`: application parameters and
    /// global state.
    pub fn application_information(&self, application_id: u64) -> ApplicationInformation<'_> {
        ApplicationInformation {
            inner: self.request(Method::GET, format!("/v2/applications/{application_id}")),
        }
    }

    /// `GET /v2/assets/{asset_id}`: asset parameters.
    pub fn asset_information(&self, asset_id: u64) -> AssetInformation<'_> {
        AssetInformation {
            inner: self.request(Method::GET, format!("/v2/assets/{asset_id}")),
        }
    }

    /// `GET /v2/blocks/{round}/lightheader/proof`: proof for a light block
    /// header in the round's vector commitment.
    pub fn light_block_header_proof(&self, round: u64) -> LightBlockHeaderProof<'_> {
        LightBlockHeaderProof {
            inner: self.request(Method::GET, format!("/v2/blocks/{round}/lightheader/proof")),
        }
    }

    /// `GET /v2/stateproofs/{round}`: the state proof covering a round.
    pub fn state_proof(&self, round: u64) -> StateProof<'_> {
        StateProof {
            inner: self.request(Method::GET, format!("/v2/stateproofs/{round}")),
        }
    }
}

/// Request wrapper for `GET /health`.
#[derive(Debug)]
pub struct HealthCheck<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> HealthCheck<'a> {
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.inner.insert_header(name, value);
        self
    }

    pub fn retry_if_failed(mut self, retry: bool) -> Self {
        self.inner.set_retry_if_failed(retry);
        self
    }

    /// Succeeds on any ok status; any other outcome is treated as
    /// transient and retried under the client's policy.
    pub async fn execute(self) -> Result<()> {
        self.inner.execute_empty().await
    }
}

/// Request wrapper for `GET /v2/blocks/{round}` in msgpack format.
#[derive(Debug)]
pub struct GetBlock<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> GetBlock<'a> {
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.inner.insert_header(name, value);
        self
    }

    pub fn retry_if_failed(mut self, retry: bool) -> Self {
        self.inner.set_retry_if_failed(retry);
        self
    }

    /// Returns the undecoded msgpack block bytes.
    pub async fn execute(self) -> Result<Vec<u8>> {
        self.inner.execute_raw().await
    }
}

/// Request wrapper for `POST /v2/teal/compile`.
#[derive(Debug)]
pub struct Compile<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> Compile<'a> {
    /// Requests a source map alongside the compiled program.
    pub fn sourcemap(mut self, map: bool) -> Self {
        self.inner.upsert_query("sourcemap", map);
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

/// Request wrapper for `POST /v2/teal/dryrun`.
#[derive(Debug)]
pub struct Dryrun<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> Dryrun<'a> {
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

/// Request wrapper for `POST /v2/transactions`.
#[derive(Debug)]
pub struct SendRawTransaction<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> SendRawTransaction<'a> {
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

    /// Broadcasts the transaction bytes; the response carries the `txId`.
    pub async fn execute(self) -> Result<Value> {
        self.inner.execute().await
    }
}

/// Request wrapper for `GET /v2/status/wait-for-block-after/{round}`.
#[derive(Debug)]
pub struct StatusAfterBlock<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> StatusAfterBlock<'a> {
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

/// Request wrapper for `GET /v2/accounts/{address}/applications/{id}`.
#[derive(Debug)]
pub struct AccountApplicationInformation<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> AccountApplicationInformation<'a> {
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

/// Request wrapper for `GET /v2/accounts/{address}/assets/{id}`.
#[derive(Debug)]
pub struct AccountAssetInformation<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> AccountAssetInformation<'a> {
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

/// Request wrapper for `GET /v2/applications/{application_id}`.
#[derive(Debug)]
pub struct ApplicationInformation<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> ApplicationInformation<'a> {
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

/// Request wrapper for `GET /v2/assets/{asset_id}`.
#[derive(Debug)]
pub struct AssetInformation<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> AssetInformation<'a> {
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

/// Request wrapper for `GET /v2/blocks/{round}/lightheader/proof`.
#[derive(Debug)]
pub struct LightBlockHeaderProof<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> LightBlockHeaderProof<'a> {
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

/// Request wrapper for `GET /v2/stateproofs/{round}`.
#[derive(Debug)]
pub struct StateProof<'a> {
    inner: EndpointRequest<'a>,
}

impl<'a> StateProof<'a> {
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

#[cfg(test)]
mod tests {
    use super::AlgodClient;
    use crate::AlgorandError;

    fn test_client() -> AlgodClient {
        AlgodClient::new("http://localhost:4001", "token")
    }

    #[test]
    fn block_path_includes_round_and_requests_msgpack() {
        let client = test_client();
        let request = client.block(18309917);
        assert_eq!(request.inner.path(), "/v2/blocks/18309917");
        assert_eq!(
            request.inner.query(),
            [("format".to_owned(), "msgpack".to_owned())]
        );
    }

    #[test]
    fn status_after_block_path_includes_round() {
        let client = test_client();
        let request = client.status_after_block(18309917);
        assert_eq!(
            request.inner.path(),
            "/v2/status/wait-for-block-after/18309917"
        );
        assert!(request.inner.query().is_empty());
    }

    #[test]
    fn account_lookups_embed_address_and_id() {
        let client = test_client();

        let request = client.account_application_information("ADDR", 60553466);
        assert_eq!(
            request.inner.path(),
            "/v2/accounts/ADDR/applications/60553466"
        );

        let request = client.account_asset_information("ADDR", 408947);
        assert_eq!(request.inner.path(), "/v2/accounts/ADDR/assets/408947");
    }

    #[test]
    fn proof_paths_embed_round() {
        let client = test_client();
        assert_eq!(
            client.light_block_header_proof(7).inner.path(),
            "/v2/blocks/7/lightheader/proof"
        );
        assert_eq!(client.state_proof(7).inner.path(), "/v2/stateproofs/7");
    }

    #[test]
    fn compile_sourcemap_toggle_is_a_query_parameter() {
        let client = test_client();
        let request = client.compile("int 1").sourcemap(true);
        assert_eq!(
            request.inner.query(),
            [("sourcemap".to_owned(), "true".to_owned())]
        );
    }

    #[test]
    fn empty_transaction_group_fails_before_any_request_exists() {
        let err = test_client()
            .send_raw_transaction(Vec::<Vec<u8>>::new())
            .expect_err("must fail validation");
        assert!(matches!(err, AlgorandError::Validation(_)));
    }
}
