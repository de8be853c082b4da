//! Posting the reminder into the warning topic.

use tracing::{error, info};

use crate::forum::{ForumClient, ForumTransport, NewPost};

/// Outcome of a publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Posted { post_id: u64 },
    DryRun,
    Failed,
}

impl PublishOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Reply to `warning_topic_id` with `message`.
///
/// Best effort: a failure is logged and reported as [`PublishOutcome::Failed`],
/// never retried.
pub async fn publish<T: ForumTransport>(
    forum: &ForumClient<T>,
    message: &str,
    warning_topic_id: u64,
) -> PublishOutcome {
    let new_post = NewPost {
        topic_id: warning_topic_id,
        raw: message.to_string(),
    };

    match forum.create_post(&new_post).await {
        Ok(created) => {
            info!(
                topic_id = warning_topic_id,
                post_id = created.id,
                "Published reminder"
            );
            PublishOutcome::Posted {
                post_id: created.id,
            }
        }
        Err(e) => {
            error!(topic_id = warning_topic_id, "Failed to publish reminder: {e}");
            PublishOutcome::Failed
        }
    }
}

/// Log the reminder instead of posting it.
pub fn publish_dry_run(message: &str, warning_topic_id: u64) -> PublishOutcome {
    info!(topic_id = warning_topic_id, message = %message, "Dry run, not publishing reminder");
    PublishOutcome::DryRun
}
