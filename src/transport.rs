//! HTTP transport seam.
//!
//! Every network exchange in the workflow goes through [`Transport::send`].
//! Production code uses [`ReqwestTransport`]; tests substitute a scripted
//! backend that records the order of calls and verifies signatures, so the
//! orchestration can be exercised without sockets.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{Doc2MdError, TransportError};

/// Longest response body excerpt kept in a [`TransportError::Status`].
const ERROR_BODY_LIMIT: usize = 512;

/// A fully prepared HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a non-2xx response into [`TransportError::Status`].
    pub fn error_for_status(self) -> Result<Self, TransportError> {
        if self.is_success() {
            return Ok(self);
        }
        let mut body = self.text();
        if body.len() > ERROR_BODY_LIMIT {
            let mut cut = ERROR_BODY_LIMIT;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
            body.push('\u{2026}');
        }
        Err(TransportError::Status {
            status: self.status,
            body,
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Sends one HTTP request.
///
/// Implementations return `Ok` for any response the server produced,
/// including error statuses; `Err` is reserved for exchanges that never
/// completed.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, Doc2MdError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("doc2md/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Doc2MdError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (custom proxies, TLS roots, …).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let sends_body = !body.is_empty() || method == Method::PUT || method == Method::POST;
        let mut builder = self.client.request(method, &url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        if sends_body {
            builder = builder.body(body);
        }

        let classify = |e: reqwest::Error| -> TransportError {
            if e.is_timeout() {
                TransportError::Timeout {
                    secs: timeout.map(|t| t.as_secs()).unwrap_or(0),
                }
            } else if e.is_builder() {
                TransportError::InvalidUrl {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            } else {
                TransportError::Network(e.to_string())
            }
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let r = HttpRequest::new(Method::GET, "http://x/y").header("X-API-Signature", "abc");
        assert_eq!(r.header_value("x-api-signature"), Some("abc"));
        assert_eq!(r.header_value("X-API-Timestamp"), None);
    }

    #[test]
    fn error_for_status_keeps_body_excerpt() {
        let err = HttpResponse::new(500, "boom").error_for_status().unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                status: 500,
                body: "boom".into()
            }
        );
        assert!(HttpResponse::new(204, "").error_for_status().is_ok());
    }

    #[test]
    fn error_body_is_truncated_on_char_boundary() {
        let long = "é".repeat(ERROR_BODY_LIMIT);
        let err = HttpResponse::new(502, long).error_for_status().unwrap_err();
        match err {
            TransportError::Status { body, .. } => {
                assert!(body.ends_with('\u{2026}'));
                assert!(body.len() <= ERROR_BODY_LIMIT + '\u{2026}'.len_utf8());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn json_decode_errors_are_reported() {
        let r = HttpResponse::new(200, "not json");
        let e = r.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(e, TransportError::Decode(_)));
    }
}
