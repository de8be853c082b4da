//! Reminder message text.

use crate::activity::ActivityType;
use crate::scanner::{Overdue, OverdueReport};

/// Build the reminder post for `activity` from a scan report.
///
/// One line per overdue member, in report order. Lines end with two spaces so
/// the forum's markdown renders them as separate lines. An empty report gives
/// the all-clear sentence.
#[must_use]
pub fn compose(activity: ActivityType, report: &OverdueReport) -> String {
    if report.is_empty() {
        return all_clear(activity);
    }

    let label = activity.label();
    report
        .records
        .iter()
        .map(|record| match record.overdue {
            Overdue::Days(days) => format!(
                "@{} {} has not posted {label} for {days} days  \n",
                record.forum_username, record.identity
            ),
            Overdue::NoRecentPost => format!(
                "@{} {} has not posted {label} recently (no post found)  \n",
                record.forum_username, record.identity
            ),
        })
        .collect()
}

/// Message posted when nobody is overdue.
#[must_use]
pub fn all_clear(activity: ActivityType) -> String {
    format!("Everyone has posted {}!", activity.label())
}
