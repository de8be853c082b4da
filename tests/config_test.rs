//! Loading configuration from the environment and a roster file.

use std::io::Write;

use forum_reminder::activity::ActivityType;
use forum_reminder::config::{Config, ConfigError};
use serial_test::serial;
use tempfile::NamedTempFile;

const VARS: &[&str] = &[
    "FORUM_HOST",
    "FORUM_API_KEY",
    "FORUM_API_USERNAME",
    "REQUEST_TIMEOUT_SECS",
    "ROSTER_PATH",
    "SCAN_FETCH_LIMIT",
    "STALENESS_DAYS",
    "DRY_RUN",
    "REMINDER_ACTIVITIES",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

fn roster_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    write!(
        file,
        r#"
[warning_topics]
reading_list = 900
project_page = 901

[[members]]
identity = "alice_wx"
forum_username = "alice"
reading_list = "11"
project_page = ""
"#
    )
    .expect("Failed to write roster");
    file
}

#[test]
#[serial]
fn test_from_env_loads_roster_and_defaults() {
    clear_env();
    let roster = roster_file();
    std::env::set_var("FORUM_HOST", "https://forum.example.com/");
    std::env::set_var("FORUM_API_KEY", "key");
    std::env::set_var("FORUM_API_USERNAME", "system");
    std::env::set_var("ROSTER_PATH", roster.path());

    let config = Config::from_env().expect("config should load");
    config.validate().expect("config should be valid");

    assert_eq!(config.forum.host, "https://forum.example.com");
    assert_eq!(config.forum.request_timeout.as_secs(), 30);
    assert_eq!(config.scan_policy.max_fetches, 20);
    assert_eq!(config.scan_policy.threshold, chrono::Duration::days(7));
    assert!(!config.dry_run);
    assert_eq!(config.roster.members[0].reading_list, Some(11));
    assert_eq!(config.roster.members[0].project_page, None);
    assert_eq!(
        config.selected_activities(),
        vec![ActivityType::ReadingList, ActivityType::ProjectPage]
    );
    clear_env();
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    let roster = roster_file();
    std::env::set_var("FORUM_HOST", "https://forum.example.com");
    std::env::set_var("FORUM_API_KEY", "key");
    std::env::set_var("FORUM_API_USERNAME", "system");
    std::env::set_var("ROSTER_PATH", roster.path());
    std::env::set_var("SCAN_FETCH_LIMIT", "5");
    std::env::set_var("STALENESS_DAYS", "14");
    std::env::set_var("DRY_RUN", "yes");
    std::env::set_var("REMINDER_ACTIVITIES", "project-page");

    let config = Config::from_env().expect("config should load");

    assert_eq!(config.scan_policy.max_fetches, 5);
    assert_eq!(config.scan_policy.threshold, chrono::Duration::days(14));
    assert!(config.dry_run);
    assert_eq!(config.selected_activities(), vec![ActivityType::ProjectPage]);
    clear_env();
}

#[test]
#[serial]
fn test_missing_credentials_is_an_error() {
    clear_env();
    let roster = roster_file();
    std::env::set_var("FORUM_HOST", "https://forum.example.com");
    std::env::set_var("ROSTER_PATH", roster.path());

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "FORUM_API_KEY"));
    clear_env();
}

#[test]
#[serial]
fn test_missing_roster_is_an_error() {
    clear_env();
    std::env::set_var("ROSTER_PATH", "/nonexistent/roster.toml");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::RosterRead { .. }));
    clear_env();
}

#[test]
#[serial]
fn test_from_env_reads_legacy_json_roster() {
    clear_env();
    let mut legacy = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    write!(
        legacy,
        r#"{{
  "modules": {{
    "GroupBBS": {{
      "host": "https://forum.example.com",
      "apiKey": "ignored",
      "apiUsername": "system",
      "projectPageWarningTopicId": 901,
      "wechat2topicId": {{
        "bob_wx": {{ "bbsUsername": "bob", "readingListId": "", "ideaListId": "", "projectPageId": "21" }},
        "alice_wx": {{ "bbsUsername": "alice", "readingListId": "11", "ideaListId": "", "projectPageId": "22" }}
      }}
    }}
  }}
}}"#
    )
    .expect("Failed to write roster");
    std::env::set_var("FORUM_HOST", "https://forum.example.com");
    std::env::set_var("FORUM_API_KEY", "key");
    std::env::set_var("FORUM_API_USERNAME", "system");
    std::env::set_var("ROSTER_PATH", legacy.path());

    let config = Config::from_env().expect("config should load");
    config.validate().expect("config should be valid");

    assert_eq!(config.selected_activities(), vec![ActivityType::ProjectPage]);
    let eligible: Vec<_> = config
        .roster
        .resolve_eligible(ActivityType::ProjectPage)
        .iter()
        .map(|e| (e.member.forum_username.clone(), e.topic_id))
        .collect();
    assert_eq!(
        eligible,
        vec![("bob".to_string(), 21), ("alice".to_string(), 22)]
    );
    clear_env();
}
