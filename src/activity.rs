//! Tracked posting obligations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A kind of topic every member is expected to keep up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    ReadingList,
    IdeaList,
    ProjectPage,
}

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [Self::ReadingList, Self::IdeaList, Self::ProjectPage];

    /// Key used for this activity in the roster file and environment.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::ReadingList => "reading_list",
            Self::IdeaList => "idea_list",
            Self::ProjectPage => "project_page",
        }
    }

    /// Label used in reminder messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ReadingList => "the reading list",
            Self::IdeaList => "the idea list",
            Self::ProjectPage => "the project page",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown activity type '{0}' (expected reading_list, idea_list or project_page)")]
pub struct UnknownActivity(pub String);

impl FromStr for ActivityType {
    type Err = UnknownActivity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|activity| activity.key() == normalized)
            .ok_or_else(|| UnknownActivity(s.to_string()))
    }
}
