use anyhow::{bail, Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for issuebridge
///
/// One section per tracker side. Every credential field supports `${VAR}`
/// references, expanded when the file is loaded, and may be omitted entirely
/// in favor of the corresponding environment variable.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// GitHub repository whose issues take part in the sync
    pub github: GitHubConfig,

    /// Pivotal Tracker project whose stories take part in the sync
    pub pivotal: PivotalConfig,
}

/// GitHub-side settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// Personal access token; when omitted the GITHUB_TOKEN environment
    /// variable is used instead
    pub token: Option<String>,

    /// Repository owner (user or organization); when omitted the
    /// authenticated user is used
    pub owner: Option<String>,

    /// Repository name
    pub project: String,

    /// API base URL override (GitHub Enterprise); defaults to github.com
    pub api: Option<String>,
}

/// Pivotal Tracker-side settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PivotalConfig {
    /// API token; when omitted the PIVOTAL_TOKEN environment variable is
    /// used instead
    pub token: Option<String>,

    /// Numeric project identifier
    pub project: u64,

    /// API base URL
    #[serde(default = "default_pivotal_api")]
    pub api: String,
}

fn default_pivotal_api() -> String {
    "https://www.pivotaltracker.com/services/v5".to_string()
}

impl Config {
    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_tokens()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            bail!(
                "No config file at {:?}. Run `issuebridge init` to create one, \
                 or pass --config.",
                config_path
            );
        }

        Self::load(&config_path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("issuebridge").join("config.yml"))
    }

    /// Starter configuration written by `issuebridge init`; every value is a
    /// placeholder the operator must edit.
    pub fn template() -> Self {
        Self {
            github: GitHubConfig {
                token: Some("${GITHUB_TOKEN}".to_string()),
                owner: None,
                project: "your-repository".to_string(),
                api: None,
            },
            pivotal: PivotalConfig {
                token: Some("${PIVOTAL_TOKEN}".to_string()),
                project: 1234567,
                api: default_pivotal_api(),
            },
        }
    }

    /// Expand `${VAR}` references in credential fields
    ///
    /// An undefined variable is a configuration error, reported before any
    /// tracker is constructed.
    pub fn expand_tokens(&mut self) -> Result<()> {
        if let Some(token) = &self.github.token {
            let expanded = shellexpand::env(token)
                .context("Failed to expand github.token")?
                .into_owned();
            self.github.token = Some(expanded);
        }

        if let Some(token) = &self.pivotal.token {
            let expanded = shellexpand::env(token)
                .context("Failed to expand pivotal.token")?
                .into_owned();
            self.pivotal.token = Some(expanded);
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.github.project.trim().is_empty() {
            bail!("github.project must name a repository");
        }
        Ok(())
    }
}
