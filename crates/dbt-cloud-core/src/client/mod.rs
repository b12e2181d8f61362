//! Execution dispatcher
//!
//! [`Client`] turns one constructed command into exactly one HTTP request
//! and hands back the raw response. It never retries and never interprets
//! status codes; callers decide what a non-2xx response means.
//!
//! The [`Transport`] seam exists so everything above it can be exercised
//! against scripted responses.

use crate::command::Command;
use crate::config::Settings;
use crate::error::{DbtCloudError, DbtCloudResult};
use crate::redact::sanitize_error_text;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// One fully-assembled HTTP request, ready for a [`Transport`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Headers including `Authorization`. Never logged verbatim.
    pub headers: Vec<(HeaderName, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// The raw result of one HTTP call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Raw body text; artifacts may be arbitrary non-JSON files.
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> DbtCloudResult<Value> {
        serde_json::from_str(&self.body)
            .map_err(|e| DbtCloudError::Json(format!("response body is not JSON: {e}")))
    }

    /// The `data` object or array of a platform response envelope.
    pub fn data(&self) -> DbtCloudResult<Value> {
        let mut json = self.json()?;
        match json.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Err(DbtCloudError::Json(
                "response body has no `data` field".to_string(),
            )),
        }
    }

    /// Value of a response header, if present and valid UTF-8.
    pub fn header(&self, name: &HeaderName) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// The wire seam: sends one request, returns one response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> DbtCloudResult<ApiResponse>;
}

/// Production transport over a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> DbtCloudResult<ApiResponse> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let value = HeaderValue::from_str(value)
                .map_err(|_| DbtCloudError::Http(format!("invalid value for header {name}")))?;
            headers.insert(name.clone(), value);
        }

        let mut builder = self
            .http
            .request(request.method, &request.url)
            .headers(headers)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DbtCloudError::Http(sanitize_error_text(&e.to_string())))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| DbtCloudError::Http(sanitize_error_text(&e.to_string())))?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

/// Dispatcher binding [`Settings`] to a [`Transport`].
#[derive(Clone)]
pub struct Client {
    settings: Settings,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Client over the production HTTP transport.
    pub fn new(settings: Settings) -> Self {
        Self::with_transport(settings, Arc::new(HttpTransport::default()))
    }

    /// Client over an arbitrary transport (scripted in tests).
    pub fn with_transport(settings: Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Issue exactly one request for `command`.
    ///
    /// Fails with a local validation error, before the transport is
    /// touched, when the settings carry no API token.
    pub async fn execute<C: Command + ?Sized>(&self, command: &C) -> DbtCloudResult<ApiResponse> {
        let api_token = self.settings.require_api_token()?;
        let mut headers = vec![(AUTHORIZATION, command.auth().header_value(api_token))];
        headers.extend(command.headers());

        let request = ApiRequest {
            method: command.method(),
            url: command.url(&self.settings),
            headers,
            query: command
                .query()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            body: command.body(),
        };

        debug!(method = %request.method, url = %request.url, "dispatching request");
        let response = self.transport.send(request).await?;
        debug!(status = %response.status, "received response");
        Ok(response)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for crate-internal tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a fixed queue of responses and records every request.
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        pub requests: Mutex<Vec<ApiRequest>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedTransport {
        pub fn new(responses: Vec<ApiResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> DbtCloudResult<ApiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| DbtCloudError::Http("scripted transport exhausted".to_string()))
        }
    }

    /// A 200 response with the given JSON body.
    pub fn ok_response(body: Value) -> ApiResponse {
        ApiResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    /// A 200 response carrying a header alongside the JSON body.
    pub fn ok_response_with_header(body: Value, name: HeaderName, value: &str) -> ApiResponse {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        ApiResponse {
            status: StatusCode::OK,
            headers,
            body: body.to_string(),
        }
    }
}
