//! API endpoint configuration.
//!
//! The base URL is baked in at build time from `API_BASE_URL` (or the legacy
//! `NEXT_PUBLIC_API_URL`), since a WASM bundle has no process environment to
//! read at runtime.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Base URL used when no build-time override is present.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Where API requests are sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Build a config for an explicit base URL. Trailing slashes are trimmed.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self { base_url: base_url.trim().trim_end_matches('/').to_owned() }
    }

    /// Build the config from build-time environment values.
    ///
    /// - `API_BASE_URL`: preferred
    /// - `NEXT_PUBLIC_API_URL`: accepted for existing deployments
    ///
    /// Falls back to [`DEFAULT_API_BASE_URL`] when neither is set or both are blank.
    pub fn from_env() -> Self {
        Self::new(resolve_base_url(option_env!("API_BASE_URL"), option_env!("NEXT_PUBLIC_API_URL")))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if path.is_empty() || path.starts_with('/') || path.starts_with('?') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn resolve_base_url<'a>(primary: Option<&'a str>, legacy: Option<&'a str>) -> &'a str {
    [primary, legacy]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_API_BASE_URL)
}
