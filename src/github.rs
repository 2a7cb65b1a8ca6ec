use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use octocrab::models::issues::Issue as GitHubIssue;
use octocrab::models::IssueState;
use octocrab::params::State;
use octocrab::Octocrab;
use std::env;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::issue::{normalize_title, Issue};
use crate::tracker::Tracker;

/// GitHub-backed [`Tracker`] over one repository's issues
#[derive(Debug)]
pub struct GitHubTracker {
    client: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubTracker {
    /// Create a tracker for the repository named in the configuration
    ///
    /// Makes one authenticated-user request up front, so a bad token fails
    /// here rather than halfway through a sync pass.
    pub async fn new(config: &Config) -> Result<Self> {
        let token = resolve_token(config)?;

        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(api) = &config.github.api {
            builder = builder
                .base_uri(api.as_str())
                .with_context(|| format!("Invalid GitHub API base URL: {}", api))?;
        }
        let client = builder.build().context("Failed to create GitHub client")?;

        let user = client
            .current()
            .user()
            .await
            .context("Failed to get current user information. Check your authentication.")?;

        let owner = config
            .github
            .owner
            .clone()
            .unwrap_or_else(|| user.login.clone());

        info!("Authenticated as GitHub user: {}", user.login);
        debug!("GitHub repository: {}/{}", owner, config.github.project);

        Ok(Self {
            client,
            owner,
            repo: config.github.project.clone(),
        })
    }

    /// Fetch every issue in one state, following pagination to the end
    async fn fetch_state(&self, state: State) -> Result<Vec<GitHubIssue>> {
        let mut issues = Vec::new();
        let mut page = 1u32;

        loop {
            let page_issues = self
                .client
                .issues(&self.owner, &self.repo)
                .list()
                .state(state)
                .per_page(100)
                .page(page)
                .send()
                .await
                .with_context(|| {
                    format!(
                        "Failed to fetch issues from GitHub repository {}/{} (page {})",
                        self.owner, self.repo, page
                    )
                })?;

            let items = page_issues.items;
            if items.is_empty() {
                break;
            }

            issues.extend(items);
            page += 1;
        }

        Ok(issues)
    }
}

#[async_trait]
impl Tracker for GitHubTracker {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        // Open issues first, then closed, so the snapshot order matches the
        // order the repository reports them in.
        let mut fetched = self.fetch_state(State::Open).await?;
        fetched.extend(self.fetch_state(State::Closed).await?);

        let issues: Vec<Issue> = fetched
            .iter()
            // The issues endpoint also returns pull requests; those are not
            // issues for our purposes.
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| {
                map_issue(
                    issue.number.to_string(),
                    &issue.title,
                    issue.body.as_deref(),
                    issue.html_url.as_str(),
                    matches!(issue.state, IssueState::Closed),
                )
            })
            .collect();

        debug!(
            "Fetched {} issue(s) from GitHub repository {}/{}",
            issues.len(),
            self.owner,
            self.repo
        );
        Ok(issues)
    }

    async fn add_issue(&self, issue: &Issue) -> Result<()> {
        self.client
            .issues(&self.owner, &self.repo)
            .create(issue.title.as_str())
            .body(issue.body.as_str())
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to create issue `{}` in GitHub repository {}/{}",
                    issue.title, self.owner, self.repo
                )
            })?;

        info!("Sync to GitHub: {}", issue.title);
        Ok(())
    }
}

/// Resolve the GitHub token from the config file or the environment
fn resolve_token(config: &Config) -> Result<String> {
    let token = match &config.github.token {
        Some(token) if !token.is_empty() => token.clone(),
        _ => env::var("GITHUB_TOKEN").map_err(|_| {
            anyhow!(
                "No GitHub token found. Set github.token in the config file \
                 or the GITHUB_TOKEN environment variable."
            )
        })?,
    };

    if token.is_empty() {
        bail!("GitHub token is empty");
    }

    if !token.starts_with("ghp_") && !token.starts_with("gho_") && !token.starts_with("ghs_") {
        warn!("GitHub token doesn't look like a valid token (should start with ghp_, gho_, or ghs_)");
    }

    Ok(token)
}

/// Map one GitHub issue into the neutral issue shape
///
/// The body gains a provenance footer naming the GitHub issue it came from,
/// so copies created in the other tracker keep a link back to their origin.
fn map_issue(id: String, title: &str, body: Option<&str>, html_url: &str, closed: bool) -> Issue {
    Issue {
        id: Some(id),
        title: normalize_title(title),
        body: format!(
            "{}\n\n[Synced from GitHub: '{}']",
            body.unwrap_or_default().trim(),
            html_url
        ),
        closed,
    }
}
