//! Plugix AI API client.
//!
//! ## Architecture
//!
//! ```text
//! PlugixClient ── builds ──▶ HttpRequest ── HttpTransport::send ──▶ HttpResponse
//!      ▲                                                               │
//!      └────────── ApiData / ApiError ◀── ApiEnvelope::into_result ◀──┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plugix::api::PlugixClient;
//!
//! let client = PlugixClient::new(&config)?;
//! let health = client.health()?;
//! let usage = client.usage()?;
//! ```

mod client;
mod envelope;
mod transport;

pub use client::{
    endpoints, ApiError, ApiResult, DescriptionOptions, PlugixClient, RequestContext, SeoOptions,
    TranslateOptions,
};
pub use envelope::{ApiData, ApiEnvelope, EnvelopeError, Unwrapped, UNKNOWN_ERROR};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};

#[cfg(test)]
pub(crate) mod testing {
    //! Recording transport for unit tests.

    use std::collections::VecDeque;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::{HttpRequest, HttpResponse, HttpTransport, TransportError};

    /// Replays scripted responses and records every request.
    ///
    /// Once the script runs out, the last scripted success is repeated.
    pub struct StubTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        fallback: Mutex<Option<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl StubTransport {
        pub fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                fallback: Mutex::new(None),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn replying(body: &str) -> Arc<Self> {
            Self::new(vec![Ok(HttpResponse::new(200, body))])
        }

        pub fn push(&self, response: Result<HttpResponse, TransportError>) {
            self.responses.lock().push_back(response);
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.lock().last().cloned()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    impl HttpTransport for StubTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().push(request.clone());

            match self.responses.lock().pop_front() {
                Some(Ok(response)) => {
                    *self.fallback.lock() = Some(response.clone());
                    Ok(response)
                }
                Some(Err(e)) => Err(e),
                None => self
                    .fallback
                    .lock()
                    .clone()
                    .ok_or_else(|| TransportError::Connection("no scripted response".to_string())),
            }
        }
    }
}
