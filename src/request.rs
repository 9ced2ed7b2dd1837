use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tokio::time::sleep;

use crate::{
    decode::decode_body,
    transport::{HttpTransport, TransportResponse},
    AlgorandError, ClientOptions, IntDecoding, RateLimiter, Result, Value,
};

/// Request body attached to an endpoint call.
#[derive(Clone, Debug)]
pub(crate) enum Payload {
    Empty,
    Json(serde_json::Value),
    /// Raw bytes; `default_content_type` applies only when the caller has
    /// not supplied a `Content-Type` of their own.
    Binary {
        bytes: Vec<u8>,
        default_content_type: &'static str,
    },
}

/// How the engine interprets a successful transport response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ResponseKind {
    /// 2xx body is JSON, decoded under the request's [`IntDecoding`].
    Json,
    /// 2xx body is returned verbatim; integer decoding is bypassed.
    Raw,
    /// Only the status matters, and any non-ok status counts as transient.
    Empty,
}

/// One encoded signed transaction, or a group to broadcast atomically.
///
/// A group is validated and flattened into a single wire body before any
/// network activity; broadcasting an empty group is a validation error.
#[derive(Clone, Debug)]
pub enum SignedTransactions {
    Single(Vec<u8>),
    Batch(Vec<Vec<u8>>),
}

impl SignedTransactions {
    pub(crate) fn into_body(self) -> Result<Vec<u8>> {
        match self {
            Self::Single(bytes) => Ok(bytes),
            Self::Batch(group) => {
                if group.is_empty() {
                    return Err(AlgorandError::Validation(
                        "transaction group is empty".to_owned(),
                    ));
                }
                let total = group.iter().map(Vec::len).sum();
                let mut body = Vec::with_capacity(total);
                for stx in &group {
                    body.extend_from_slice(stx);
                }
                Ok(body)
            }
        }
    }
}

impl From<Vec<u8>> for SignedTransactions {
    fn from(stx: Vec<u8>) -> Self {
        Self::Single(stx)
    }
}

impl From<&[u8]> for SignedTransactions {
    fn from(stx: &[u8]) -> Self {
        Self::Single(stx.to_vec())
    }
}

impl From<Vec<Vec<u8>>> for SignedTransactions {
    fn from(group: Vec<Vec<u8>>) -> Self {
        Self::Batch(group)
    }
}

/// Shared request descriptor behind every endpoint wrapper.
///
/// Holds the resolved method and path, accumulated query parameters, the
/// payload and the execution knobs. Execution consumes the descriptor and
/// runs the loop: acquire a rate-limit token, call the transport, then
/// decode or schedule a retry.
#[derive(Debug)]
pub(crate) struct EndpointRequest<'a> {
    transport: &'a HttpTransport,
    options: &'a ClientOptions,
    limiter: Option<RateLimiter>,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    payload: Payload,
    response: ResponseKind,
    int_decoding: IntDecoding,
    headers: HeaderMap,
    retry_if_failed: bool,
}

impl<'a> EndpointRequest<'a> {
    pub fn new(
        transport: &'a HttpTransport,
        options: &'a ClientOptions,
        limiter: Option<RateLimiter>,
        method: Method,
        path: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            options,
            limiter,
            method,
            path: path.into(),
            query: Vec::new(),
            payload: Payload::Empty,
            response: ResponseKind::Json,
            int_decoding: options.int_decoding,
            headers: HeaderMap::new(),
            retry_if_failed: true,
        }
    }

    /// Inserts or replaces a query parameter. Parameters are never removed
    /// once set; a repeated key overwrites in place, keeping insertion order.
    pub fn upsert_query(&mut self, key: &'static str, value: impl ToString) {
        let value = value.to_string();
        if let Some(entry) = self.query.iter_mut().find(|(existing, _)| existing == key) {
            entry.1 = value;
        } else {
            self.query.push((key.to_owned(), value));
        }
    }

    pub fn set_payload(&mut self, payload: Payload) {
        self.payload = payload;
    }

    pub fn set_response(&mut self, response: ResponseKind) {
        self.response = response;
    }

    pub fn set_int_decoding(&mut self, mode: IntDecoding) {
        self.int_decoding = mode;
    }

    pub fn set_retry_if_failed(&mut self, retry: bool) {
        self.retry_if_failed = retry;
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Executes and decodes a JSON response.
    pub async fn execute(self) -> Result<Value> {
        let response = self.dispatch().await?;
        let body = std::str::from_utf8(&response.body)
            .map_err(|_| AlgorandError::Decode("response body is not valid UTF-8".to_owned()))?;
        decode_body(body, self.int_decoding, &self.options.big_int_fields)
    }

    /// Executes and returns the response body verbatim.
    pub async fn execute_raw(self) -> Result<Vec<u8>> {
        let response = self.dispatch().await?;
        Ok(response.body)
    }

    /// Executes and discards the body, keeping only the ok/not-ok outcome.
    pub async fn execute_empty(self) -> Result<()> {
        self.dispatch().await.map(|_| ())
    }

    async fn dispatch(&self) -> Result<TransportResponse> {
        let headers = self.resolved_headers();
        let timeout = Duration::from_millis(self.options.timeout_ms);
        let mut attempt: u32 = 0;

        loop {
            // One token per attempt, consumed before the wire call; a retry
            // pays again. A closed limiter aborts without retrying.
            if let Some(limiter) = &self.limiter {
                limiter.acquire().await?;
            }

            let outcome = self
                .transport
                .send(
                    self.method.clone(),
                    &self.path,
                    &self.query,
                    &headers,
                    &self.payload,
                    timeout,
                )
                .await;

            let failure = match outcome {
                Ok(response) if response.ok => return Ok(response),
                Ok(response) => AlgorandError::Http {
                    status: response.status,
                    body: String::from_utf8_lossy(&response.body).into_owned(),
                },
                Err(err) => err,
            };

            if !self.retry_if_failed || !self.failure_is_retryable(&failure) {
                return Err(failure);
            }

            match self.options.retry.backoff_delay(attempt) {
                Some(delay) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("retrying {} after {} ms", self.path, delay.as_millis());

                    sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(AlgorandError::exhausted(attempt + 1, failure)),
            }
        }
    }

    /// Caller headers plus the payload's default content type. `HeaderMap`
    /// keys are case-insensitive, so any caller-supplied `Content-Type`
    /// wins regardless of spelling.
    fn resolved_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        if let Payload::Binary {
            default_content_type,
            ..
        } = &self.payload
        {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(default_content_type));
            }
        }
        headers
    }

    fn failure_is_retryable(&self, failure: &AlgorandError) -> bool {
        match self.response {
            // Health-style endpoints treat every non-ok response as
            // transient, not just the usual retryable statuses.
            ResponseKind::Empty => matches!(
                failure,
                AlgorandError::Transport(_) | AlgorandError::Http { .. }
            ),
            _ => failure.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, CONTENT_TYPE};
    use reqwest::Method;

    use super::{EndpointRequest, Payload, SignedTransactions};
    use crate::{transport::HttpTransport, AlgorandError, ClientOptions};

    fn test_transport() -> HttpTransport {
        HttpTransport::new("http://localhost:1", "x-algo-api-token", None)
    }

    #[test]
    fn upsert_query_overwrites_in_place() {
        let transport = test_transport();
        let options = ClientOptions::default();
        let mut request =
            EndpointRequest::new(&transport, &options, None, Method::GET, "/v2/blocks/1");

        request.upsert_query("limit", 10u64);
        request.upsert_query("min-round", 100u64);
        request.upsert_query("limit", 20u64);

        assert_eq!(
            request.query,
            vec![
                ("limit".to_owned(), "20".to_owned()),
                ("min-round".to_owned(), "100".to_owned()),
            ]
        );
    }

    #[test]
    fn binary_payload_defaults_content_type_without_overriding() {
        let transport = test_transport();
        let options = ClientOptions::default();

        let mut request =
            EndpointRequest::new(&transport, &options, None, Method::POST, "/v2/teal/compile");
        request.set_payload(Payload::Binary {
            bytes: b"int 1".to_vec(),
            default_content_type: "text/plain",
        });
        assert_eq!(
            request.resolved_headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("text/plain"))
        );

        request.insert_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert_eq!(
            request.resolved_headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
    }

    #[test]
    fn empty_payload_adds_no_content_type() {
        let transport = test_transport();
        let options = ClientOptions::default();
        let request = EndpointRequest::new(&transport, &options, None, Method::GET, "/health");

        assert!(request.resolved_headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn transaction_group_flattens_in_order() {
        let group = SignedTransactions::Batch(vec![vec![1, 2], vec![3], vec![4, 5]]);
        assert_eq!(
            group.into_body().expect("group must flatten"),
            vec![1, 2, 3, 4, 5]
        );

        let single = SignedTransactions::from(vec![9, 9]);
        assert_eq!(single.into_body().expect("must pass through"), vec![9, 9]);
    }

    #[test]
    fn empty_transaction_group_is_rejected() {
        let err = SignedTransactions::Batch(Vec::new())
            .into_body()
            .expect_err("must fail");
        assert!(matches!(err, AlgorandError::Validation(_)));
    }
}
