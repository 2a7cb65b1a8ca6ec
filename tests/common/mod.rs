/// Common test utilities and helpers for issuebridge tests
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Disposable config directory laid out the way the binary expects it
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("issuebridge");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        Self {
            temp_dir,
            config_dir,
        }
    }

    /// Value to pass as XDG_CONFIG_HOME so the binary resolves into this
    /// environment instead of the real user config
    pub fn xdg_config_home(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.yml")
    }

    pub fn create_test_config(&self, content: &str) -> PathBuf {
        let config_path = self.config_path();
        std::fs::write(&config_path, content).expect("Failed to write test config");
        config_path
    }

    pub fn create_minimal_config(&self) -> PathBuf {
        let config_content = r#"
github:
  token: "ghp_test_token"
  owner: "example-owner"
  project: "example-repo"
pivotal:
  token: "pt_test_token"
  project: 1234567
"#;
        self.create_test_config(config_content)
    }
}

/// Assertion helpers for test validation
pub fn assert_contains_all(text: &str, expected: &[&str]) {
    for item in expected {
        assert!(
            text.contains(item),
            "Expected text to contain '{}', but it didn't. Text: {}",
            item,
            text
        );
    }
}
