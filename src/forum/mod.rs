//! Forum API access.
//!
//! The reminder pipeline only needs two JSON operations from the forum: read
//! a path and post a body to a path. [`ForumTransport`] captures exactly that,
//! with authentication applied once when the transport is built.
//! [`ForumClient`] layers the typed Discourse calls on top.

pub mod http;
#[cfg(test)]
pub mod memory;
pub mod models;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpTransport;
#[cfg(test)]
pub use memory::MemoryForum;
pub use models::{CreatedPost, NewPost, PostResponse, PostStream, TopicResponse};

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("request to {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned status {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw JSON access to the forum API.
#[async_trait]
pub trait ForumTransport: Send + Sync {
    /// `GET {host}{path}` and return the decoded JSON body.
    async fn get(&self, path: &str) -> Result<Value, ForumError>;

    /// `POST {host}{path}` with a JSON body and return the decoded JSON response.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, ForumError>;
}

/// Typed Discourse API calls over a [`ForumTransport`].
#[derive(Debug, Clone)]
pub struct ForumClient<T> {
    transport: T,
}

impl<T: ForumTransport> ForumClient<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch a topic and its post stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a topic.
    pub async fn get_topic(&self, topic_id: u64) -> Result<TopicResponse, ForumError> {
        self.get_json(&format!("/t/{topic_id}.json")).await
    }

    /// Fetch a single post.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a post.
    pub async fn get_post(&self, post_id: u64) -> Result<PostResponse, ForumError> {
        self.get_json(&format!("/posts/{post_id}.json")).await
    }

    /// Reply to an existing topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the forum rejects the post.
    pub async fn create_post(&self, new_post: &NewPost) -> Result<CreatedPost, ForumError> {
        let path = "/posts.json";
        let body = serde_json::to_value(new_post).map_err(|source| ForumError::Decode {
            path: path.to_string(),
            source,
        })?;
        let response = self.transport.post(path, &body).await?;
        decode(path, response)
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ForumError> {
        let value = self.transport.get(path).await?;
        decode(path, value)
    }
}

fn decode<R: DeserializeOwned>(path: &str, value: Value) -> Result<R, ForumError> {
    serde_json::from_value(value).map_err(|source| ForumError::Decode {
        path: path.to_string(),
        source,
    })
}
