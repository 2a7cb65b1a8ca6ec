//! Reconciliation engine - computes which issues are missing on either side
//! and drives the copy calls
//!
//! This module is the heart of issuebridge: given two [`Tracker`] handles it
//! fetches one snapshot from each, diffs them by the title identity rule and
//! replays missing open issues into the tracker that lacks them. Writes are
//! strictly additive (nothing is updated or deleted) and strictly sequential:
//! one tracker call completes before the next begins.

use anyhow::Result;
use tracing::{debug, info};

use crate::issue::Issue;
use crate::tracker::Tracker;

/// One issue a sync run would act on, as reported by a dry-run plan.
#[derive(Debug, Clone)]
pub struct PlannedCopy {
    pub title: String,
    /// Closed issues are counted by the sync but never copied.
    pub closed: bool,
    /// Name of the tracker the issue would be created in.
    pub destination: String,
}

/// The reconciliation engine. Stateless: every operation is a pure function
/// of the snapshots it fetches when invoked.
#[derive(Debug, Default)]
pub struct Synchronizer;

impl Synchronizer {
    pub fn new() -> Self {
        Self
    }

    /// Copies every open issue present in `source` but missing from `target`
    /// into `target`, in source-snapshot order.
    ///
    /// Returns the number of missing issues found. Closed missing issues are
    /// included in the count but not copied. Callers that need the
    /// distinction should run a plan first.
    pub async fn synchronize(&self, source: &dyn Tracker, target: &dyn Tracker) -> Result<usize> {
        let source_issues = source.list_issues().await?;
        let target_issues = target.list_issues().await?;

        let synced = self
            .copy_missing(&source_issues, &target_issues, target)
            .await?;

        info!(
            "Synchronized {} issue(s) from {} into {}",
            synced,
            source.name(),
            target.name()
        );
        Ok(synced)
    }

    /// Runs the one-directional pass in both directions and returns the sum
    /// of both counts.
    ///
    /// Both snapshots are fetched exactly once, before any write. The second
    /// pass diffs the original snapshots, so an issue copied into one tracker
    /// is never read back from it and mistaken for new.
    pub async fn synchronize_bidirectional(
        &self,
        tracker_a: &dyn Tracker,
        tracker_b: &dyn Tracker,
    ) -> Result<usize> {
        let issues_a = tracker_a.list_issues().await?;
        let issues_b = tracker_b.list_issues().await?;

        let a_to_b = self.copy_missing(&issues_a, &issues_b, tracker_b).await?;
        let b_to_a = self.copy_missing(&issues_b, &issues_a, tracker_a).await?;

        info!(
            "Synchronized {} issue(s) between {} and {}",
            a_to_b + b_to_a,
            tracker_a.name(),
            tracker_b.name()
        );
        Ok(a_to_b + b_to_a)
    }

    /// Computes what [`synchronize`](Self::synchronize) would do, without
    /// writing anything.
    ///
    /// The plan lists every missing issue in source-snapshot order; entries
    /// with `closed: true` would be counted but not copied. The plan length
    /// equals the count a real run would return against the same snapshots.
    pub async fn plan(
        &self,
        source: &dyn Tracker,
        target: &dyn Tracker,
    ) -> Result<Vec<PlannedCopy>> {
        let source_issues = source.list_issues().await?;
        let target_issues = target.list_issues().await?;

        Ok(Self::planned(&source_issues, &target_issues, target.name()))
    }

    /// Dry-run counterpart of
    /// [`synchronize_bidirectional`](Self::synchronize_bidirectional), with
    /// the same single-snapshot discipline.
    pub async fn plan_bidirectional(
        &self,
        tracker_a: &dyn Tracker,
        tracker_b: &dyn Tracker,
    ) -> Result<Vec<PlannedCopy>> {
        let issues_a = tracker_a.list_issues().await?;
        let issues_b = tracker_b.list_issues().await?;

        let mut plan = Self::planned(&issues_a, &issues_b, tracker_b.name());
        plan.extend(Self::planned(&issues_b, &issues_a, tracker_a.name()));
        Ok(plan)
    }

    /// The diff/copy pass shared by both directions: walks the source
    /// snapshot in order, copies missing open issues into `target` and
    /// returns the total number of missing issues (copied or not).
    ///
    /// The first failing create aborts the pass; issues created before the
    /// failure remain created. There is no rollback.
    async fn copy_missing(
        &self,
        source_issues: &[Issue],
        target_issues: &[Issue],
        target: &dyn Tracker,
    ) -> Result<usize> {
        let missing = Self::missing_from(source_issues, target_issues);

        for issue in &missing {
            if issue.closed {
                debug!(
                    "Not copying closed issue into {}: {}",
                    target.name(),
                    issue.title
                );
                continue;
            }
            target.add_issue(issue).await?;
        }

        debug!(
            "{} of {} source issue(s) missing from {}",
            missing.len(),
            source_issues.len(),
            target.name()
        );
        Ok(missing.len())
    }

    /// Issues present in the source snapshot with no title match in the
    /// target snapshot, in source order. Pairwise O(n·m) on purpose: tracker
    /// issue counts are hundreds at most, and the simple scan keeps the
    /// identity rule in one obvious place.
    fn missing_from<'a>(source_issues: &'a [Issue], target_issues: &[Issue]) -> Vec<&'a Issue> {
        source_issues
            .iter()
            .filter(|candidate| !target_issues.iter().any(|existing| existing.matches(candidate)))
            .collect()
    }

    fn planned(
        source_issues: &[Issue],
        target_issues: &[Issue],
        destination: &str,
    ) -> Vec<PlannedCopy> {
        Self::missing_from(source_issues, target_issues)
            .into_iter()
            .map(|issue| PlannedCopy {
                title: issue.title.clone(),
                closed: issue.closed,
                destination: destination.to_string(),
            })
            .collect()
    }
}
