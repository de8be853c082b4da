//! One reminder run per activity: resolve the roster, scan, compose, publish.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::activity::ActivityType;
use crate::composer::compose;
use crate::config::Config;
use crate::forum::{ForumClient, ForumTransport};
use crate::publisher::{publish, publish_dry_run, PublishOutcome};
use crate::scanner::StalenessScanner;

/// What happened during one activity's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub activity: ActivityType,
    pub eligible: usize,
    pub overdue: usize,
    pub skipped: usize,
    pub message: String,
    /// `None` when the activity has no warning topic and nothing was checked.
    pub publish: Option<PublishOutcome>,
}

/// Run the reminder pipeline for a single activity.
pub async fn run_activity<T: ForumTransport>(
    forum: &ForumClient<T>,
    config: &Config,
    activity: ActivityType,
    now: DateTime<Utc>,
) -> RunSummary {
    let Some(warning_topic_id) = config.roster.warning_topic(activity) else {
        warn!(%activity, "No warning topic configured, skipping activity");
        return RunSummary {
            activity,
            eligible: 0,
            overdue: 0,
            skipped: 0,
            message: String::new(),
            publish: None,
        };
    };

    let eligible = config.roster.resolve_eligible(activity);
    info!(%activity, eligible = eligible.len(), "Checking members");

    let scanner = StalenessScanner::new(forum, config.scan_policy);
    let report = scanner.scan_all(&eligible, activity, now).await;
    let message = compose(activity, &report);

    let outcome = if config.dry_run {
        publish_dry_run(&message, warning_topic_id)
    } else {
        publish(forum, &message, warning_topic_id).await
    };

    let summary = RunSummary {
        activity,
        eligible: eligible.len(),
        overdue: report.records.len(),
        skipped: report.skipped.len(),
        message,
        publish: Some(outcome),
    };
    info!(
        %activity,
        eligible = summary.eligible,
        overdue = summary.overdue,
        skipped = summary.skipped,
        published = outcome.is_success(),
        "Reminder run complete"
    );
    summary
}

/// Run every selected activity in turn.
pub async fn run_all<T: ForumTransport>(
    forum: &ForumClient<T>,
    config: &Config,
    now: DateTime<Utc>,
) -> Vec<RunSummary> {
    let mut summaries = Vec::new();
    for activity in config.selected_activities() {
        summaries.push(run_activity(forum, config, activity, now).await);
    }
    summaries
}
