//! Scripted transport and response builders shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::api::ApiClient;
use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::config::ApiConfig;
use crate::state::storage::MemoryStorage;

pub const TEST_BASE_URL: &str = "http://api.test/api/v1";

/// Transport that replays queued responses in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self { responses: Mutex::new(responses.into()), requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_owned())))
    }
}

/// A response with a JSON body.
pub fn json(status: u16, body: serde_json::Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        status_text: status_text(status).to_owned(),
        content_type: Some("application/json".to_owned()),
        body: body.to_string(),
    })
}

/// A response with an arbitrary raw body.
pub fn raw(status: u16, content_type: &str, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        status_text: status_text(status).to_owned(),
        content_type: Some(content_type.to_owned()),
        body: body.to_owned(),
    })
}

pub fn no_content() -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse { status: 204, status_text: "No Content".to_owned(), content_type: None, body: String::new() })
}

pub fn network_error(message: &str) -> Result<HttpResponse, TransportError> {
    Err(TransportError(message.to_owned()))
}

pub fn unauthorized() -> Result<HttpResponse, TransportError> {
    json(401, serde_json::json!({ "detail": "Could not validate credentials" }))
}

pub fn user_json(id: i64, email: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "email": email, "full_name": "Test User", "role": "student" })
}

/// API client over `transport` and `storage` with the test base URL.
pub fn client(transport: &Arc<MockTransport>, storage: &Arc<MemoryStorage>) -> ApiClient {
    ApiClient::new(ApiConfig::new(TEST_BASE_URL), transport.clone(), storage.clone())
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}
