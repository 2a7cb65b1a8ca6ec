//! Tracker capability boundary
//!
//! This module defines the provider-agnostic contract a concrete issue
//! tracker adapter must satisfy. The synchronizer works through this trait
//! only and never sees GitHub or Pivotal types.

use anyhow::Result;
use async_trait::async_trait;

use crate::issue::Issue;

/// Read/create capability over one issue-tracking service.
///
/// Implement this trait to plug a new backend into the synchronizer. The
/// contract is a full snapshot read plus an additive create. There is no
/// update or delete; the synchronizer never modifies issues that are already
/// present.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Service name for logs and reports (e.g. "GitHub").
    fn name(&self) -> &str;

    /// Returns the full current snapshot of issues, open and closed.
    ///
    /// Must be idempotent and side-effect free. On a mid-fetch failure the
    /// whole call fails; a partial list is never returned.
    async fn list_issues(&self) -> Result<Vec<Issue>>;

    /// Creates a new issue in the backing service from `title` and `body`.
    ///
    /// The service assigns its own id and new issues always start open:
    /// neither `id` nor `closed` is forwarded. The synchronizer only calls
    /// this for issues that have no title match in the snapshot; the adapter
    /// does not re-check.
    async fn add_issue(&self, issue: &Issue) -> Result<()>;
}
