//! Request descriptors: one API call before it reaches the transport.
//!
//! DESIGN
//! ======
//! A descriptor is built by an endpoint helper, then resolved against the
//! configured base URL and the current credential in [`RequestDescriptor::resolve`].
//! Header precedence: JSON content type, then caller overrides, then the bearer
//! credential.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use serde::Serialize;

use super::error::ApiError;
use super::transport::HttpRequest;
use crate::config::ApiConfig;

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP method for an API call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Path, method, body and header overrides for a single API call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestDescriptor {
    pub path: String,
    pub method: Method,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { path: path.into(), method, ..Self::default() }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Json`] if `body` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Add or replace a header override. Names compare case-insensitively.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        set_header(&mut self.headers, name, value);
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present.
    #[must_use]
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Path plus the percent-encoded query string, if any.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path)
    }

    /// Resolve into a transport request for `config`, attaching `credential` when present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Json`] if the body fails to serialize.
    pub fn resolve(&self, config: &ApiConfig, credential: Option<&str>) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![(CONTENT_TYPE_HEADER.to_owned(), JSON_CONTENT_TYPE.to_owned())];
        for (name, value) in &self.headers {
            set_header(&mut headers, name, value);
        }
        if let Some(token) = credential {
            set_header(&mut headers, AUTHORIZATION_HEADER, &bearer(token));
        }
        let body = self.body.as_ref().map(serde_json::to_string).transpose()?;
        Ok(HttpRequest { method: self.method, url: config.endpoint(&self.path_and_query()), headers, body })
    }
}

/// Format a bearer authorization value.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(existing) = headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        existing.1 = value.to_owned();
    } else {
        headers.push((name.to_owned(), value.to_owned()));
    }
}
