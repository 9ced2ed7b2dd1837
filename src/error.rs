/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum AlgorandError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Caller-supplied argument rejected before any network activity.
    #[error("invalid request: {0}")]
    Validation(String),
    /// Integer literal outside the safe range under [`IntDecoding::Safe`].
    ///
    /// [`IntDecoding::Safe`]: crate::IntDecoding::Safe
    #[error("integer literal {literal} exceeds the safe integer range")]
    Precision { literal: String },
    /// Response decoding or body-shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// Retry budget exhausted; wraps the final attempt's failure.
    #[error("request failed after {attempts} attempts")]
    RetryExhausted {
        /// Total attempts made, the initial call included.
        attempts: u32,
        #[source]
        source: Box<AlgorandError>,
    },
    /// The shared rate limiter was closed; no token will ever be granted.
    #[error("rate limiter is closed")]
    LimiterClosed,
}

impl AlgorandError {
    /// Whether a later attempt of the same request could succeed.
    ///
    /// Covers connection-level `reqwest` failures (timeout, connect, request
    /// and body errors) and the HTTP statuses a node returns under transient
    /// load. Validation, precision and decode failures are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => {
                err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
            }
            Self::Http { status, .. } => matches!(*status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    pub(crate) fn exhausted(attempts: u32, source: AlgorandError) -> Self {
        Self::RetryExhausted {
            attempts,
            source: Box::new(source),
        }
    }
}
