//! In-memory forum used by unit tests.
//!
//! Responses are keyed by request path. Every request is recorded so callers
//! can assert which API calls were made and in what order.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::{ForumError, ForumTransport};

#[derive(Debug, Default)]
pub struct MemoryForum {
    responses: HashMap<String, Value>,
    failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
    created: Mutex<Vec<Value>>,
}

impl MemoryForum {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` for `GET path`.
    #[must_use]
    pub fn with_json(mut self, path: &str, value: Value) -> Self {
        self.responses.insert(path.to_string(), value);
        self
    }

    /// Serve a topic whose stream holds `stream` (oldest first).
    #[must_use]
    pub fn with_topic(self, topic_id: u64, stream: &[u64]) -> Self {
        self.with_json(
            &format!("/t/{topic_id}.json"),
            json!({
                "id": topic_id,
                "post_stream": { "posts": [], "stream": stream },
            }),
        )
    }

    /// Serve a post written by `username` at `created_at`.
    #[must_use]
    pub fn with_post(self, post_id: u64, username: &str, created_at: DateTime<Utc>) -> Self {
        self.with_json(
            &format!("/posts/{post_id}.json"),
            json!({
                "id": post_id,
                "user_id": 1,
                "username": username,
                "created_at": created_at.to_rfc3339(),
                "raw": format!("post {post_id}"),
            }),
        )
    }

    /// Fail every request to `path` with a server error.
    #[must_use]
    pub fn with_failure(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Requests made so far, as `"METHOD path"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bodies of every accepted `POST`.
    #[must_use]
    pub fn created_posts(&self) -> Vec<Value> {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, method: &str, path: &str) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{method} {path}"));
    }

    fn check_failure(&self, path: &str) -> Result<(), ForumError> {
        if self.failing.contains(path) {
            return Err(ForumError::Status {
                path: path.to_string(),
                status: 500,
                body: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ForumTransport for MemoryForum {
    async fn get(&self, path: &str) -> Result<Value, ForumError> {
        self.record("GET", path);
        self.check_failure(path)?;
        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| ForumError::Status {
                path: path.to_string(),
                status: 404,
                body: "not found".to_string(),
            })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ForumError> {
        self.record("POST", path);
        self.check_failure(path)?;
        let mut created = self.created.lock().unwrap_or_else(PoisonError::into_inner);
        created.push(body.clone());
        let post_number = created.len();
        Ok(json!({
            "id": 10_000 + post_number,
            "topic_id": body.get("topic_id").cloned().unwrap_or(Value::Null),
            "post_number": post_number,
        }))
    }
}
