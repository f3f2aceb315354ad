//! HTTP Client Module
//!
//! Transport abstraction for the storefront API plus its reqwest implementation.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FetchError, Result};

// == HTTP Client ==
/// Minimal capability the caching layer needs from the network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Idempotent read of `path` with query `params`, resolving to the parsed body.
    async fn fetch(&self, path: &str, params: &Value) -> Result<Value>;

    /// Mutating request with an optional JSON body.
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value>;
}

// == Reqwest Client ==
/// `HttpClient` backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestClient {
    /// Creates a client for `base_url` using the configured timeout.
    pub fn new(base_url: impl Into<String>, config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client for `config.api_base_url`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config)
    }

    fn url(&self, path: &str) -> Result<reqwest::Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        reqwest::Url::parse(&joined).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", joined, e)))
    }

    async fn read_body(path: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            warn!("{} answered {}", path, status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(FetchError::Decode)
    }
}

/// Flattens a params object into query pairs; null fields are skipped.
pub(crate) fn query_pairs(params: &Value) -> Result<Vec<(String, String)>> {
    match params {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect()),
        other => Err(FetchError::InvalidParams(format!(
            "query parameters must be an object, got {}",
            other
        ))),
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(&self, path: &str, params: &Value) -> Result<Value> {
        let url = self.url(path)?;
        let query = query_pairs(params)?;
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(url).query(&query).send().await?;
        Self::read_body(path, response).await
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::read_body(path, response).await
    }
}
