use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::activity::{ActivityType, UnknownActivity};
use crate::constants::DEFAULT_FETCH_LIMIT;
use crate::roster::Roster;
use crate::scanner::ScanPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
    #[error("failed to parse {name}: {source}")]
    ParseActivity {
        name: String,
        #[source]
        source: UnknownActivity,
    },
    #[error("failed to read roster file {}: {source}", path.display())]
    RosterRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse legacy JSON roster {}: {source}", path.display())]
    RosterJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse roster file {}: {source}", path.display())]
    RosterParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Connection settings for the forum API.
#[derive(Debug, Clone)]
pub struct ForumConfig {
    /// Base URL of the forum, without a trailing slash.
    pub host: String,
    pub api_key: String,
    pub api_username: String,
    pub request_timeout: Duration,
}

/// Application configuration, loaded once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    // Forum API
    pub forum: ForumConfig,

    // Roster
    pub roster_path: PathBuf,
    pub roster: Roster,

    // Scanning
    pub scan_policy: ScanPolicy,

    // Run
    /// Activities to check; `None` means every activity with a warning topic.
    pub activities: Option<Vec<ActivityType>>,
    pub dry_run: bool,
}

impl Config {
    /// Load configuration from environment variables and the roster file.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// invalid, or if the roster file cannot be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        let roster_path = PathBuf::from(env_or_default("ROSTER_PATH", "./roster.toml"));
        let roster = Roster::load(&roster_path)?;

        Ok(Self {
            // Forum API
            forum: ForumConfig {
                host: required_env("FORUM_HOST")?.trim_end_matches('/').to_string(),
                api_key: required_env("FORUM_API_KEY")?,
                api_username: required_env("FORUM_API_USERNAME")?,
                request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),
            },

            // Roster
            roster_path,
            roster,

            // Scanning
            scan_policy: ScanPolicy {
                max_fetches: parse_env_usize("SCAN_FETCH_LIMIT", DEFAULT_FETCH_LIMIT)?,
                threshold: i64::try_from(parse_env_u64("STALENESS_DAYS", 7)?)
                    .ok()
                    .and_then(chrono::Duration::try_days)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        name: "STALENESS_DAYS".to_string(),
                        message: "too large".to_string(),
                    })?,
            },

            // Run
            activities: optional_env("REMINDER_ACTIVITIES")
                .map(|list| parse_activities("REMINDER_ACTIVITIES", &list))
                .transpose()?,
            dry_run: parse_env_bool("DRY_RUN", false)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.forum.host).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "FORUM_HOST".to_string(),
                message: format!("not a valid URL: '{}'", self.forum.host),
            });
        }
        if self.forum.api_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "FORUM_API_KEY".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.forum.api_username.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "FORUM_API_USERNAME".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.forum.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.scan_policy.max_fetches == 0 {
            return Err(ConfigError::InvalidValue {
                name: "SCAN_FETCH_LIMIT".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(activities) = &self.activities {
            if let Some(missing) = activities
                .iter()
                .find(|a| self.roster.warning_topic(**a).is_none())
            {
                return Err(ConfigError::InvalidValue {
                    name: "REMINDER_ACTIVITIES".to_string(),
                    message: format!("no warning topic configured for {missing}"),
                });
            }
        }
        Ok(())
    }

    /// Activities to check in this run, in a fixed order.
    #[must_use]
    pub fn selected_activities(&self) -> Vec<ActivityType> {
        match &self.activities {
            Some(activities) => activities.clone(),
            None => self.roster.warning_topics.keys().copied().collect(),
        }
    }

    /// Configuration pointing at the given forum host with an empty roster.
    #[must_use]
    pub fn for_testing(host: &str) -> Self {
        Self {
            forum: ForumConfig {
                host: host.trim_end_matches('/').to_string(),
                api_key: "test-key".to_string(),
                api_username: "system".to_string(),
                request_timeout: Duration::from_secs(5),
            },
            roster_path: PathBuf::from("roster.toml"),
            roster: Roster::default(),
            scan_policy: ScanPolicy::default(),
            activities: None,
            dry_run: false,
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

fn parse_activities(name: &str, value: &str) -> Result<Vec<ActivityType>, ConfigError> {
    let mut activities = Vec::new();
    for part in value.split(',').filter(|p| !p.trim().is_empty()) {
        let activity = part.parse().map_err(|source| ConfigError::ParseActivity {
            name: name.to_string(),
            source,
        })?;
        if !activities.contains(&activity) {
            activities.push(activity);
        }
    }
    Ok(activities)
}
