//! Staleness detection.
//!
//! For every eligible member we walk their topic's post stream backwards,
//! newest first, looking for the most recent post they wrote. The walk is
//! bounded by [`ScanPolicy::max_fetches`] post fetches, so members whose last
//! post sits deeper in the topic than that look the same as members who never
//! posted.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::activity::ActivityType;
use crate::constants::DEFAULT_FETCH_LIMIT;
use crate::forum::{ForumClient, ForumError, ForumTransport};
use crate::roster::{EligibleMember, Member};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Bounds and threshold for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPolicy {
    /// Maximum number of posts fetched per member.
    pub max_fetches: usize,
    /// Age beyond which the latest post no longer counts.
    pub threshold: Duration,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            max_fetches: DEFAULT_FETCH_LIMIT,
            threshold: Duration::weeks(1),
        }
    }
}

impl ScanPolicy {
    /// Decide whether the outcome of a backward walk makes the member overdue.
    #[must_use]
    pub fn judge(&self, latest: &LatestPost) -> Option<Overdue> {
        match *latest {
            LatestPost::NotFound { .. } => Some(Overdue::NoRecentPost),
            LatestPost::Found { age, .. } if age > self.threshold => {
                Some(Overdue::Days(round_days(age)))
            }
            LatestPost::Found { .. } => None,
        }
    }
}

/// Result of walking a topic backwards for one author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestPost {
    /// The newest post by the author and how long ago it was written.
    Found { post_id: u64, age: Duration },
    /// The stream ran out or the fetch limit was hit first.
    NotFound { inspected: usize },
}

/// How far behind an overdue member is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overdue {
    /// Days since the member's latest post, rounded to the nearest day.
    Days(i64),
    /// No post by the member among the inspected posts.
    NoRecentPost,
}

/// One overdue member in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueMember {
    pub identity: String,
    pub forum_username: String,
    pub overdue: Overdue,
}

/// Outcome of scanning every eligible member for one activity.
///
/// Records are kept in the order members were scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverdueReport {
    pub records: Vec<OverdueMember>,
    /// Identities whose check failed and was skipped.
    pub skipped: Vec<String>,
    pub checked: usize,
}

impl OverdueReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, identity: &str) -> Option<Overdue> {
        self.records
            .iter()
            .find(|r| r.identity == identity)
            .map(|r| r.overdue)
    }
}

/// Finds members whose latest post in their topic is too old.
pub struct StalenessScanner<'a, T> {
    forum: &'a ForumClient<T>,
    policy: ScanPolicy,
}

impl<'a, T: ForumTransport> StalenessScanner<'a, T> {
    #[must_use]
    pub fn new(forum: &'a ForumClient<T>, policy: ScanPolicy) -> Self {
        Self { forum, policy }
    }

    /// Scan every eligible member in order.
    ///
    /// A failed topic or post fetch skips that member only; the remaining
    /// members are still checked.
    pub async fn scan_all(
        &self,
        eligible: &[EligibleMember<'_>],
        activity: ActivityType,
        now: DateTime<Utc>,
    ) -> OverdueReport {
        let mut report = OverdueReport::default();

        for entry in eligible {
            let member = entry.member;
            report.checked += 1;

            match self.scan(member, entry.topic_id, activity, now).await {
                Ok(Some(overdue)) => {
                    info!(
                        member = %member.identity,
                        topic_id = entry.topic_id,
                        %activity,
                        ?overdue,
                        "Member is overdue"
                    );
                    report.records.push(OverdueMember {
                        identity: member.identity.clone(),
                        forum_username: member.forum_username.clone(),
                        overdue,
                    });
                }
                Ok(None) => {
                    debug!(member = %member.identity, topic_id = entry.topic_id, %activity, "Member is up to date");
                }
                Err(e) => {
                    warn!(
                        member = %member.identity,
                        topic_id = entry.topic_id,
                        %activity,
                        error = %e,
                        "Failed to check member, skipping"
                    );
                    report.skipped.push(member.identity.clone());
                }
            }
        }

        report
    }

    /// Check one member's topic.
    ///
    /// Returns `Ok(None)` when the member posted within the threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic or any inspected post cannot be fetched.
    pub async fn scan(
        &self,
        member: &Member,
        topic_id: u64,
        activity: ActivityType,
        now: DateTime<Utc>,
    ) -> Result<Option<Overdue>, ForumError> {
        debug!(member = %member.identity, topic_id, %activity, "Checking topic");
        let latest = self
            .latest_post_by(topic_id, &member.forum_username, now)
            .await?;
        debug!(member = %member.identity, ?latest, "Backward scan finished");
        Ok(self.policy.judge(&latest))
    }

    /// Walk `topic_id` from its newest post until one by `username` turns up.
    ///
    /// The first match ends the walk: the stream is ordered oldest first, so
    /// it is the author's most recent post.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic or any inspected post cannot be fetched.
    pub async fn latest_post_by(
        &self,
        topic_id: u64,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<LatestPost, ForumError> {
        let topic = self.forum.get_topic(topic_id).await?;
        let mut stream = topic.post_stream.stream;
        let mut inspected = 0;

        while inspected < self.policy.max_fetches {
            let Some(post_id) = stream.pop() else {
                break;
            };
            let post = self.forum.get_post(post_id).await?;
            inspected += 1;

            if post.username.eq_ignore_ascii_case(username) {
                // Clock skew can put a post slightly in the future.
                let age = (now - post.created_at).max(Duration::zero());
                return Ok(LatestPost::Found { post_id, age });
            }
        }

        Ok(LatestPost::NotFound { inspected })
    }
}

/// Whole days in `age`, halves rounded up.
fn round_days(age: Duration) -> i64 {
    let millis = age.num_milliseconds();
    (millis + MILLIS_PER_DAY / 2) / MILLIS_PER_DAY
}
