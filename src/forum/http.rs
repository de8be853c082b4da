//! `reqwest` transport for the Discourse JSON API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use tracing::{debug, trace};

use super::{ForumError, ForumTransport};
use crate::config::ForumConfig;
use crate::constants::{MAX_ERROR_BODY_CHARS, USER_AGENT};

/// Authenticated HTTP access to one forum.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    host: String,
}

impl HttpTransport {
    /// Build a transport that sends the API key headers with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are not valid header values or the
    /// HTTP client cannot be built.
    pub fn new(config: &ForumConfig) -> Result<Self, ForumError> {
        let mut headers = HeaderMap::new();
        headers.insert("Api-Key", header_value("Api-Key", &config.api_key)?);
        headers.insert("Api-Username", header_value("Api-Username", &config.api_username)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ForumError::Client(e.to_string()))?;

        Ok(Self {
            http,
            host: config.host.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.host)
    }
}

#[async_trait]
impl ForumTransport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value, ForumError> {
        debug!(path = %path, "GET forum API");
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|source| ForumError::Request {
                path: path.to_string(),
                source,
            })?;
        read_json(path, response).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ForumError> {
        debug!(path = %path, "POST forum API");
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|source| ForumError::Request {
                path: path.to_string(),
                source,
            })?;
        read_json(path, response).await
    }
}

async fn read_json(path: &str, response: reqwest::Response) -> Result<Value, ForumError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        return Err(ForumError::Status {
            path: path.to_string(),
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| ForumError::Request {
            path: path.to_string(),
            source,
        })?;
    trace!(path = %path, len = bytes.len(), "Forum API response");
    serde_json::from_slice(&bytes).map_err(|source| ForumError::Decode {
        path: path.to_string(),
        source,
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ForumError> {
    HeaderValue::from_str(value)
        .map_err(|_| ForumError::Client(format!("{name} contains characters not allowed in a header")))
}
