//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and maps `HttpResponse` values; the host
//! executes the round trip, either by hand or by implementing `Transport`
//! so that the endpoint namespaces can drive it directly.
//!
//! All fields use owned types (`String`, `Vec`) so values can be handed to
//! any HTTP stack without lifetime concerns.

use crate::error::ApiError;

/// HTTP method for a request. The service is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// An HTTP request described as plain data.
///
/// `url` is fully encoded, query string and API key included.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// The request URL with the `_key` parameter masked, for logs.
    pub fn redacted_url(&self) -> String {
        redact_key(&self.url)
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.redacted_url())
            .field("headers", &self.headers)
            .finish()
    }
}

/// An HTTP response described as plain data.
///
/// `url` is the URL that was actually requested; error messages for
/// 404/405 report it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one request/response round trip on behalf of the client.
///
/// Implementations must return non-2xx responses as `Ok` data so the core
/// can map status codes itself; only socket-level failures are `Err`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

pub(crate) fn redact_key(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    if k == "_key" {
                        (k.into_owned(), "REDACTED".to_string())
                    } else {
                        (k.into_owned(), v.into_owned())
                    }
                })
                .collect();
            if !pairs.is_empty() {
                parsed.query_pairs_mut().clear().extend_pairs(pairs);
            }
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
