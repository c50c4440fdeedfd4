//! HTTP transport seam.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, with cookies
//! included on every request.
//! Server-side (SSR) and native tests: [`BrowserTransport`] fails every call,
//! and tests substitute their own [`Transport`] implementation.
//!
//! TRADE-OFFS
//! ==========
//! The transport only moves bytes. Status classification, credential handling
//! and JSON decoding live in `api`/`response` so they stay testable off-browser.

#![allow(clippy::unused_async)]

use async_trait::async_trait;

use super::request::Method;

/// A fully resolved outbound HTTP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw HTTP response as seen by the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Connectivity-level failure: no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends one HTTP request. Enables mocking in tests.
#[async_trait(?Send)]
pub trait Transport: Send + Sync {
    /// Send `request` and return the raw response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the request could not be completed.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `fetch`-backed transport for the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        #[cfg(feature = "hydrate")]
        {
            use gloo_net::http::{Request, RequestBuilder};

            let builder: RequestBuilder = match request.method {
                Method::Get => Request::get(&request.url),
                Method::Post => Request::post(&request.url),
                Method::Put => Request::put(&request.url),
                Method::Patch => Request::patch(&request.url),
                Method::Delete => Request::delete(&request.url),
            };
            let mut builder = builder.credentials(web_sys::RequestCredentials::Include);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            let outgoing = match request.body {
                Some(body) => builder.body(body),
                None => builder.build(),
            }
            .map_err(|e| TransportError(e.to_string()))?;

            let resp = outgoing.send().await.map_err(|e| TransportError(e.to_string()))?;
            let status = resp.status();
            let status_text = resp.status_text();
            let content_type = resp.headers().get("content-type");
            // 204 has no body to read.
            let body = if status == 204 {
                String::new()
            } else {
                resp.text().await.map_err(|e| TransportError(e.to_string()))?
            };
            Ok(HttpResponse { status, status_text, content_type, body })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = request;
            Err(TransportError("not available on server".to_owned()))
        }
    }
}
