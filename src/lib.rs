//! Forum posting reminder library.
//!
//! Checks each member's activity topics on a Discourse forum and posts one
//! reminder per activity naming the members who have not posted within the
//! last week.

pub mod activity;
pub mod composer;
pub mod config;
pub mod constants;
pub mod forum;
pub mod publisher;
pub mod reminder;
pub mod roster;
pub mod scanner;
