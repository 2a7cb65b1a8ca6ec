//! issuebridge - Additive Issue Synchronization
//!
//! issuebridge keeps the issues of a GitHub repository and the stories of a
//! Pivotal Tracker project in step by copying whatever is missing on either
//! side. It never updates or deletes anything: two issues are the same issue
//! exactly when their titles are equal, and anything unmatched is re-created
//! on the side that lacks it.
//!
//! ## Core Features
//!
//! - **Title Identity**: Exact title equality is the only matching rule
//! - **Additive Only**: Missing issues are created, existing ones untouched
//! - **Bidirectional**: Both directions run against one pair of snapshots
//! - **Configuration Management**: YAML-based configuration with XDG compliance
//!
//! ## Modules
//!
//! - [`config`]: Configuration management and parsing
//! - [`issue`]: The neutral issue shape and the title identity rule
//! - [`tracker`]: The tracker abstraction both backends implement
//! - [`sync`]: The reconciliation engine
//! - [`github`]: GitHub-backed tracker
//! - [`pivotal`]: Pivotal Tracker-backed tracker

pub mod config;
pub mod github;
pub mod issue;
pub mod pivotal;
pub mod sync;
pub mod tracker;

pub use config::Config;
pub use github::GitHubTracker;
pub use issue::{normalize_title, FieldValue, Issue};
pub use pivotal::PivotalTracker;
pub use sync::{PlannedCopy, Synchronizer};
pub use tracker::Tracker;
