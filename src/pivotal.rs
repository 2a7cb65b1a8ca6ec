//! Pivotal Tracker-backed [`Tracker`] speaking the v5 REST API
//!
//! Only the slice of the API the sync needs is implemented: story listing
//! with limit/offset pagination and story creation. Authentication is the
//! `X-TrackerToken` header on every request.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::env;
use tracing::{debug, info};

use crate::config::Config;
use crate::issue::{normalize_title, Issue};
use crate::tracker::Tracker;

/// Story states that count as open. Everything else (finished, delivered,
/// rejected, planned) is treated as closed.
const OPEN_STATES: [&str; 4] = ["accepted", "unscheduled", "unstarted", "started"];

/// Stories fetched per request; the listing stops on the first short page.
const PAGE_LIMIT: usize = 100;

/// One story as returned by the v5 stories endpoint
#[derive(Debug, Deserialize)]
struct Story {
    id: u64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    current_state: String,
    url: String,
}

pub struct PivotalTracker {
    client: reqwest::Client,
    base: String,
    project: u64,
}

impl PivotalTracker {
    /// Create a tracker for the project named in the configuration
    pub fn new(config: &Config) -> Result<Self> {
        let token = resolve_token(config)?;

        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&token)
            .context("Pivotal Tracker token contains invalid header characters")?;
        value.set_sensitive(true);
        headers.insert("X-TrackerToken", value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create Pivotal Tracker client")?;

        let base = config.pivotal.api.trim_end_matches('/').to_string();

        debug!("Pivotal Tracker project: {}", config.pivotal.project);

        Ok(Self {
            client,
            base,
            project: config.pivotal.project,
        })
    }

    fn stories_url(&self) -> String {
        format!("{}/projects/{}/stories", self.base, self.project)
    }
}

#[async_trait]
impl Tracker for PivotalTracker {
    fn name(&self) -> &str {
        "PivotalTracker"
    }

    async fn list_issues(&self) -> Result<Vec<Issue>> {
        let mut stories = Vec::new();
        let mut offset = 0usize;

        loop {
            let page: Vec<Story> = self
                .client
                .get(self.stories_url())
                .query(&[("limit", PAGE_LIMIT), ("offset", offset)])
                .send()
                .await
                .with_context(|| {
                    format!(
                        "Failed to fetch stories from Pivotal Tracker project {}",
                        self.project
                    )
                })?
                .error_for_status()
                .with_context(|| {
                    format!(
                        "Pivotal Tracker rejected the story listing for project {}",
                        self.project
                    )
                })?
                .json()
                .await
                .context("Failed to decode Pivotal Tracker story listing")?;

            let fetched = page.len();
            stories.extend(page);

            if fetched < PAGE_LIMIT {
                break;
            }
            offset += PAGE_LIMIT;
        }

        debug!(
            "Fetched {} story(ies) from Pivotal Tracker project {}",
            stories.len(),
            self.project
        );
        Ok(stories.iter().map(map_story).collect())
    }

    async fn add_issue(&self, issue: &Issue) -> Result<()> {
        self.client
            .post(self.stories_url())
            .json(&serde_json::json!({
                "name": issue.title,
                "description": issue.body,
                "story_type": "bug",
            }))
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to create story `{}` in Pivotal Tracker project {}",
                    issue.title, self.project
                )
            })?
            .error_for_status()
            .with_context(|| format!("Pivotal Tracker rejected story `{}`", issue.title))?;

        info!("Sync to PivotalTracker: {}", issue.title);
        Ok(())
    }
}

/// Resolve the Pivotal Tracker token from the config file or the environment
fn resolve_token(config: &Config) -> Result<String> {
    let token = match &config.pivotal.token {
        Some(token) if !token.is_empty() => token.clone(),
        _ => env::var("PIVOTAL_TOKEN").map_err(|_| {
            anyhow!(
                "No Pivotal Tracker token found. Set pivotal.token in the config \
                 file or the PIVOTAL_TOKEN environment variable."
            )
        })?,
    };

    if token.is_empty() {
        bail!("Pivotal Tracker token is empty");
    }

    Ok(token)
}

/// Map one story into the neutral issue shape
///
/// The description gains a provenance footer naming the story it came from,
/// so copies created in the other tracker keep a link back to their origin.
fn map_story(story: &Story) -> Issue {
    Issue {
        id: Some(story.id.to_string()),
        title: normalize_title(&story.name),
        body: format!(
            "{}\n\n[Synced from PivotalTracker: '{}']",
            story.description.as_deref().unwrap_or_default().trim(),
            story.url
        ),
        closed: !OPEN_STATES.contains(&story.current_state.as_str()),
    }
}
