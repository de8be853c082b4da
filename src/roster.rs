//! Member roster and eligibility filtering.
//!
//! The roster maps each member's identity (their chat handle) to their forum
//! username and the topic they keep for every tracked activity. It is loaded
//! once at startup from a TOML file (or the legacy JSON config) and never
//! changes during a run.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::activity::ActivityType;
use crate::config::ConfigError;

/// A community member tracked by the reminder bot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Member {
    /// Opaque identity key, e.g. a messaging-platform handle.
    pub identity: String,
    pub forum_username: String,
    #[serde(default, deserialize_with = "topic_id")]
    pub reading_list: Option<u64>,
    #[serde(default, deserialize_with = "topic_id")]
    pub idea_list: Option<u64>,
    #[serde(default, deserialize_with = "topic_id")]
    pub project_page: Option<u64>,
    /// Opted out of reminders.
    #[serde(default)]
    pub skip: bool,
}

impl Member {
    /// Topic this member keeps for the given activity, if tracked.
    #[must_use]
    pub fn topic_for(&self, activity: ActivityType) -> Option<u64> {
        match activity {
            ActivityType::ReadingList => self.reading_list,
            ActivityType::IdeaList => self.idea_list,
            ActivityType::ProjectPage => self.project_page,
        }
    }
}

/// A member selected for scanning together with the topic to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibleMember<'a> {
    pub member: &'a Member,
    pub topic_id: u64,
}

/// The full roster file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Roster {
    /// Topic where each activity's reminder is posted.
    #[serde(default)]
    pub warning_topics: BTreeMap<ActivityType, u64>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Roster {
    /// Load a roster file.
    ///
    /// Files ending in `.json` are read in the legacy bot layout (see
    /// [`Roster::parse_legacy_json`]); anything else is TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid roster.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::RosterRead {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            return Self::parse_legacy_json(&text).map_err(|source| ConfigError::RosterJson {
                path: path.to_path_buf(),
                source,
            });
        }

        Self::parse(&text).map_err(|source| ConfigError::RosterParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse the legacy `config.json` layout.
    ///
    /// Members live under `modules.GroupBBS.wechat2topicId`, keyed by identity,
    /// with `bbsUsername`, `readingListId`, `ideaListId`, `projectPageId` and
    /// `skip`. Warning topics are `readingListWarningTopicId`,
    /// `ideaListWarningTopicId` and `projectPageWarningTopicId`. Member order
    /// follows the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not match that layout.
    pub fn parse_legacy_json(text: &str) -> Result<Self, serde_json::Error> {
        let file: LegacyConfigFile = serde_json::from_str(text)?;
        let group = file.modules.group_bbs;

        let mut warning_topics = BTreeMap::new();
        for (activity, topic) in [
            (ActivityType::ReadingList, group.reading_list_warning_topic_id),
            (ActivityType::IdeaList, group.idea_list_warning_topic_id),
            (ActivityType::ProjectPage, group.project_page_warning_topic_id),
        ] {
            if let Some(topic_id) = topic {
                warning_topics.insert(activity, topic_id);
            }
        }

        let members = group
            .members
            .into_iter()
            .map(|(identity, value)| {
                let legacy: LegacyMember = serde_json::from_value(value)?;
                Ok(Member {
                    identity,
                    forum_username: legacy.bbs_username,
                    reading_list: legacy.reading_list_id,
                    idea_list: legacy.idea_list_id,
                    project_page: legacy.project_page_id,
                    skip: legacy.skip,
                })
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;

        Ok(Self {
            warning_topics,
            members,
        })
    }

    /// Parse a roster from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid roster.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Members to scan for `activity`, in roster order.
    ///
    /// Opted-out members and members without a topic for the activity are
    /// left out.
    #[must_use]
    pub fn resolve_eligible(&self, activity: ActivityType) -> Vec<EligibleMember<'_>> {
        self.members
            .iter()
            .filter(|member| !member.skip)
            .filter_map(|member| {
                member
                    .topic_for(activity)
                    .map(|topic_id| EligibleMember { member, topic_id })
            })
            .collect()
    }

    #[must_use]
    pub fn warning_topic(&self, activity: ActivityType) -> Option<u64> {
        self.warning_topics.get(&activity).copied()
    }
}

#[derive(Deserialize)]
struct LegacyConfigFile {
    modules: LegacyModules,
}

#[derive(Deserialize)]
struct LegacyModules {
    #[serde(rename = "GroupBBS")]
    group_bbs: LegacyGroup,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyGroup {
    #[serde(rename = "wechat2topicId")]
    members: serde_json::Map<String, serde_json::Value>,
    #[serde(default, deserialize_with = "topic_id")]
    reading_list_warning_topic_id: Option<u64>,
    #[serde(default, deserialize_with = "topic_id")]
    idea_list_warning_topic_id: Option<u64>,
    #[serde(default, deserialize_with = "topic_id")]
    project_page_warning_topic_id: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMember {
    bbs_username: String,
    #[serde(default, deserialize_with = "topic_id")]
    reading_list_id: Option<u64>,
    #[serde(default, deserialize_with = "topic_id")]
    idea_list_id: Option<u64>,
    #[serde(default, deserialize_with = "topic_id")]
    project_page_id: Option<u64>,
    #[serde(default)]
    skip: bool,
}

/// Accept `123`, `"123"` and `""` (untracked) for topic ids.
fn topic_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTopicId {
        Id(u64),
        Text(String),
    }

    match RawTopicId::deserialize(deserializer)? {
        RawTopicId::Id(id) => Ok(Some(id)),
        RawTopicId::Text(text) if text.trim().is_empty() => Ok(None),
        RawTopicId::Text(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid topic id '{text}'"))),
    }
}
