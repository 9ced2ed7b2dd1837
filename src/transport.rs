use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;

use crate::{request::Payload, AlgorandError};

/// Raw transport outcome: status plus undecoded body bytes.
#[derive(Clone, Debug)]
pub(crate) struct TransportResponse {
    pub status: u16,
    pub ok: bool,
    pub body: Vec<u8>,
}

/// Joins a service base URL with an endpoint path.
///
/// Example: `"https://mainnet-api.4160.nodely.dev/"` + `"/health"` →
/// `"https://mainnet-api.4160.nodely.dev/health"`
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// reqwest-backed transport bound to one service base URL.
///
/// Carries the service's API-token header (`X-Algo-API-Token` for algod,
/// `X-Indexer-API-Token` for the indexer) on every request when a token is
/// configured.
#[derive(Clone)]
pub(crate) struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token_header: &'static str,
    token: Option<String>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("token_header", &self.token_header)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        token_header: &'static str,
        token: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token_header,
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs one HTTP attempt. Header precedence: the caller-resolved map
    /// wins over anything a payload applies, and the token header wins last.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        headers: &HeaderMap,
        payload: &Payload,
        timeout: Duration,
    ) -> Result<TransportResponse, AlgorandError> {
        let url = join_url(&self.base_url, path);
        let mut builder = self.http.request(method, url).timeout(timeout);

        if !query.is_empty() {
            builder = builder.query(query);
        }

        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(value),
            Payload::Binary { bytes, .. } => builder.body(bytes.clone()),
        };

        builder = builder.headers(headers.clone());
        if let Some(token) = &self.token {
            builder = builder.header(self.token_header, token);
        }

        let response = builder.send().await.map_err(AlgorandError::Transport)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(AlgorandError::Transport)?
            .to_vec();

        Ok(TransportResponse {
            status: status.as_u16(),
            ok: status.is_success(),
            body,
        })
    }
}
