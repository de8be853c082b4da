//! Shared constants used across the application.

/// User agent string sent with every forum API request.
pub const USER_AGENT: &str = concat!("forum-reminder/", env!("CARGO_PKG_VERSION"));

/// Default number of posts inspected per member before giving up.
pub const DEFAULT_FETCH_LIMIT: usize = 20;

/// Longest error body kept when a forum request fails.
pub const MAX_ERROR_BODY_CHARS: usize = 300;
