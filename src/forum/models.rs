//! Discourse JSON API shapes consumed by the reminder bot.
//!
//! Only the fields we read are declared; everything else in the responses is
//! ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `GET /t/{topic_id}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicResponse {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    pub post_stream: PostStream,
}

/// The topic's post ids and whichever posts the forum already rendered.
#[derive(Debug, Clone, Deserialize)]
pub struct PostStream {
    /// Posts included in the response, a subset of `stream`.
    #[serde(default)]
    pub posts: Vec<PostResponse>,
    /// Every post id in the topic, oldest first.
    #[serde(default)]
    pub stream: Vec<u64>,
}

/// Response of `GET /posts/{post_id}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostResponse {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub username: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub raw: Option<String>,
}

/// Body of `POST /posts.json` for replying to an existing topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub topic_id: u64,
    pub raw: String,
}

/// The subset of the created post echoed back by the forum.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPost {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub topic_id: u64,
    #[serde(default)]
    pub post_number: Option<u64>,
}
