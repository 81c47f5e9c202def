use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Media type sent with every request
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// HTTP verbs used by the Cloud Conformity API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Outbound request descriptor
///
/// Everything a transport needs to perform one call. It is also the payload
/// of [`ApiError::NoResponse`](crate::ApiError::NoResponse), so callers can
/// inspect exactly what was sent. `Debug` output redacts the API key.
#[derive(Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub base_url: String,
    pub path: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a descriptor carrying the JSON:API content type and API key
    /// authorization headers.
    pub fn new(
        base_url: impl Into<String>,
        api_key: &str,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), JSON_API_CONTENT_TYPE.to_string());
        headers.insert("Authorization".to_string(), format!("ApiKey {}", api_key));

        Self {
            base_url: base_url.into(),
            path: path.into(),
            method,
            headers,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value by exact name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Base URL and path joined, without query string
    ///
    /// Trailing slashes on the base and leading slashes on the path collapse
    /// into one, so `/users/whoami` and `users/whoami` resolve alike.
    pub fn joined_url(&self) -> String {
        if self.path.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }

    /// Fully resolved URL including query parameters
    pub fn url(&self) -> Result<reqwest::Url, String> {
        let mut url = reqwest::Url::parse(&self.joined_url())
            .map_err(|e| format!("Invalid request URL '{}': {}", self.joined_url(), e))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("Authorization") {
                    (name.as_str(), "ApiKey <redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("ApiRequest")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("method", &self.method)
            .field("headers", &headers)
            .field("query", &self.query)
            .field("body", &self.body)
            .finish()
    }
}

/// Raw response as handed back by a transport, for any HTTP status
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body. Empty bodies are `Null`, non-JSON bodies a string.
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Build a response from raw body text
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self { status, body }
    }
}

/// Transport-level failures
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Request was sent but no usable response arrived. Covers connection
    /// failures, timeouts and bodies that could not be read after the status.
    NoResponse(String),
    /// Request could not be built or sent at all
    Setup(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NoResponse(msg) => write!(f, "No response: {}", msg),
            TransportError::Setup(msg) => write!(f, "Request setup failed: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::Setup(err.to_string())
        } else if err.is_timeout() {
            TransportError::NoResponse("Request timeout".to_string())
        } else if err.is_connect() {
            TransportError::NoResponse(format!("Connection failed: {}", err))
        } else {
            TransportError::NoResponse(err.to_string())
        }
    }
}

/// HTTP transport trait
///
/// Abstracts the network call so the client can be pointed at something
/// other than a real HTTP stack (recording doubles in tests, proxies, etc.).
/// Implementations return an [`ApiResponse`] for every status the server
/// answers with; only failures to get an answer are errors.
pub trait Transport: Send + Sync {
    /// Perform one request
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + '_>>;
}

/// Default transport backed by `reqwest`
///
/// No timeout or retry is configured; reqwest's defaults apply.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured reqwest client (proxies, custom TLS roots, ...)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + '_>> {
        Box::pin(async move {
            let url = request.url().map_err(TransportError::Setup)?;

            let mut builder = self.client.request(request.method.into(), url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                let bytes = serde_json::to_vec(body).map_err(|e| {
                    TransportError::Setup(format!("Failed to serialize request body: {}", e))
                })?;
                builder = builder.body(bytes);
            }

            let response = builder.send().await.map_err(|e| {
                tracing::error!("Failed to send {} {}: {}", request.method, request.path, e);
                TransportError::from(e)
            })?;

            let status = response.status().as_u16();
            // A status without a readable body is no usable answer
            let text = response
                .text()
                .await
                .map_err(|e| unreadable_body(status, e))?;

            Ok(ApiResponse::from_text(status, &text))
        })
    }
}

fn unreadable_body(status: u16, err: impl fmt::Display) -> TransportError {
    tracing::error!("Failed to read HTTP {} response body: {}", status, err);
    TransportError::NoResponse(format!(
        "Failed to read response body (HTTP {}): {}",
        status, err
    ))
}
