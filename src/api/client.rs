//! Plugix API client.
//!
//! Wraps authenticated calls to the Plugix AI service. Every response is a
//! [`ApiEnvelope`]; the client unwraps its `data` or turns it into an
//! [`ApiError`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use super::envelope::{ApiData, ApiEnvelope, Unwrapped};
use super::transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport, TransportError};
use crate::core::Config;

/// API endpoint paths.
pub mod endpoints {
    /// Route: POST /v1/ecommerce/descriptions
    pub const DESCRIPTIONS: &str = "/v1/ecommerce/descriptions";

    /// Route: POST /v1/ecommerce/translate
    pub const TRANSLATE: &str = "/v1/ecommerce/translate";

    /// Route: POST /v1/ecommerce/seo
    pub const SEO: &str = "/v1/ecommerce/seo";

    /// Route: POST /v1/chat/message
    pub const CHAT: &str = "/v1/chat/message";

    /// Route: GET /v1/health
    pub const HEALTH: &str = "/v1/health";

    /// Route: GET /v1/usage
    pub const USAGE: &str = "/v1/usage";
}

/// Error type for API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The envelope reported `success = false`.
    #[error("{message}")]
    Application { message: String },

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Immutable per-client request settings.
#[derive(Clone)]
pub struct RequestContext {
    api_key: String,
    base_url: String,
    platform: String,
}

impl RequestContext {
    /// Create a context. Trailing slashes are stripped from `base_url`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl AsRef<str>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            platform: platform.into(),
        }
    }

    /// Build a context from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.clone(), config.normalized_api_url(), config.platform.clone())
    }

    /// Normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-Platform".to_string(), self.platform.clone()),
        ]
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("platform", &self.platform)
            .finish()
    }
}

/// Options for description generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionOptions {
    pub tone: String,
    pub languages: Vec<String>,
    pub max_length: u32,
}

impl Default for DescriptionOptions {
    fn default() -> Self {
        Self { tone: "professional".to_string(), languages: vec!["en".to_string()], max_length: 500 }
    }
}

/// Options for translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub preserve_tone: bool,
    pub context: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self { preserve_tone: true, context: "ecommerce".to_string() }
    }
}

/// Which SEO fields to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeoOptions {
    pub meta_title: bool,
    pub meta_description: bool,
    pub keywords: bool,
}

impl Default for SeoOptions {
    fn default() -> Self {
        Self { meta_title: true, meta_description: true, keywords: true }
    }
}

/// Client for the Plugix AI API.
#[derive(Clone)]
pub struct PlugixClient {
    context: RequestContext,
    transport: Arc<dyn HttpTransport>,
}

impl PlugixClient {
    /// Create a client backed by a blocking `reqwest` transport.
    pub fn new(config: &Config) -> ApiResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(RequestContext::from_config(config), Arc::new(transport)))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(context: RequestContext, transport: Arc<dyn HttpTransport>) -> Self {
        Self { context, transport }
    }

    /// Generate AI product descriptions.
    pub fn generate_descriptions<T: Serialize>(
        &self,
        products: &[T],
        options: &DescriptionOptions,
    ) -> ApiResult<ApiData> {
        let products = encode(HttpMethod::Post, endpoints::DESCRIPTIONS, products)?;
        let body = object(json!({
            "products": products,
            "tone": options.tone,
            "languages": options.languages,
            "maxLength": options.max_length,
        }));
        self.call(HttpMethod::Post, endpoints::DESCRIPTIONS, Some(&body))
    }

    /// Translate content.
    pub fn translate<T: Serialize>(
        &self,
        content: &T,
        target_language: &str,
        options: &TranslateOptions,
    ) -> ApiResult<ApiData> {
        let content = encode(HttpMethod::Post, endpoints::TRANSLATE, content)?;
        let body = object(json!({
            "content": content,
            "targetLanguage": target_language,
            "preserveTone": options.preserve_tone,
            "context": options.context,
        }));
        self.call(HttpMethod::Post, endpoints::TRANSLATE, Some(&body))
    }

    /// Generate SEO metadata.
    pub fn generate_seo<T: Serialize>(
        &self,
        products: &[T],
        options: &SeoOptions,
    ) -> ApiResult<ApiData> {
        let products = encode(HttpMethod::Post, endpoints::SEO, products)?;
        let body = object(json!({
            "products": products,
            "generateMetaTitle": options.meta_title,
            "generateMetaDescription": options.meta_description,
            "generateKeywords": options.keywords,
        }));
        self.call(HttpMethod::Post, endpoints::SEO, Some(&body))
    }

    /// Chat with the AI about products.
    pub fn chat(&self, message: &str, context: &ApiData) -> ApiResult<ApiData> {
        let body = object(json!({ "message": message, "context": context }));
        self.call(HttpMethod::Post, endpoints::CHAT, Some(&body))
    }

    /// Get API health status.
    pub fn health(&self) -> ApiResult<ApiData> {
        self.call(HttpMethod::Get, endpoints::HEALTH, None)
    }

    /// Get usage statistics.
    pub fn usage(&self) -> ApiResult<ApiData> {
        self.call(HttpMethod::Get, endpoints::USAGE, None)
    }

    /// Make an API request and unwrap the envelope.
    ///
    /// The body is only sent for non-GET requests with a non-empty payload.
    pub fn call(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&ApiData>,
    ) -> ApiResult<ApiData> {
        let request = self.build_request(method, endpoint, body);

        self.execute(&request).inspect_err(|e| log_failure(method, endpoint, e))
    }

    fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&ApiData>,
    ) -> HttpRequest {
        let body = match (method, body) {
            (HttpMethod::Get, _) | (_, None) => None,
            (_, Some(map)) if map.is_empty() => None,
            (_, Some(map)) => Some(serde_json::Value::Object(map.clone())),
        };

        HttpRequest {
            method,
            url: format!("{}{}", self.context.base_url, endpoint),
            headers: self.context.headers(),
            body,
        }
    }

    fn execute(&self, request: &HttpRequest) -> ApiResult<ApiData> {
        tracing::debug!(method = %request.method, url = %request.url, "Plugix API request");

        let response = self.transport.send(request)?;

        match ApiEnvelope::parse(&response.body) {
            Ok(envelope) => match envelope.into_result() {
                Unwrapped::Failure(message) => Err(ApiError::Application { message }),
                Unwrapped::Data(data) if response.is_success() => Ok(data),
                Unwrapped::Data(_) => Err(ApiError::Http {
                    status: response.status,
                    message: "Unexpected success envelope on error status".to_string(),
                }),
            },
            Err(_) if !response.is_success() => {
                Err(ApiError::Http { status: response.status, message: snippet(&response.body) })
            }
            Err(e) => Err(ApiError::InvalidResponse(e.to_string())),
        }
    }
}

impl fmt::Debug for PlugixClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlugixClient").field("context", &self.context).finish()
    }
}

fn log_failure(method: HttpMethod, endpoint: &str, error: &ApiError) {
    tracing::error!(endpoint = endpoint, method = %method, error = %error, "Plugix API error");
}

// Serializes caller-supplied content, logging failures like a failed call.
fn encode<T: Serialize + ?Sized>(
    method: HttpMethod,
    endpoint: &str,
    value: &T,
) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(ApiError::from)
        .inspect_err(|e| log_failure(method, endpoint, e))
}

fn object(value: serde_json::Value) -> ApiData {
    match value {
        serde_json::Value::Object(map) => map,
        _ => ApiData::new(),
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX {
        return trimmed.to_string();
    }
    let mut short: String = trimmed.chars().take(MAX).collect();
    short.push('…');
    short
}
