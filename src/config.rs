//! Settings loaded from optional TOML config files.
//!
//! A `.release-picker.toml` at the repository root wins over
//! `~/.config/release-picker/config.toml`; with neither present, defaults
//! apply.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Filename of the repo-level config file.
pub const REPO_CONFIG_FILE: &str = ".release-picker.toml";

/// Branch-related settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BranchSettings {
    /// The integration branch releases are picked from.
    pub integration: String,
    /// Candidate stable-branch names, tried in order.
    pub stable_candidates: Vec<String>,
}

impl Default for BranchSettings {
    fn default() -> Self {
        Self {
            integration: "develop".to_string(),
            stable_candidates: vec!["main".to_string(), "master".to_string()],
        }
    }
}

/// Discovery-related settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverySettings {
    /// How many recently merged PRs to consider.
    pub pr_limit: u8,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self { pr_limit: 30 }
    }
}

/// Publication-related settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishSettings {
    /// Remote to push to and open the PR against (None selects automatically).
    pub remote: Option<String>,
}

/// All settings for a run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Branch names.
    pub branches: BranchSettings,
    /// Discovery bounds.
    pub discovery: DiscoverySettings,
    /// Publication options.
    pub publish: PublishSettings,
}

impl Settings {
    /// Load settings for the repository at `repo_root`.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let repo_file = repo_root.join(REPO_CONFIG_FILE);
        if repo_file.exists() {
            return Self::from_file(&repo_file);
        }
        if let Some(config_dir) = dirs::config_dir() {
            let user_file = config_dir.join("release-picker").join("config.toml");
            if user_file.exists() {
                return Self::from_file(&user_file);
            }
        }
        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_config_file() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load(temp.path()).unwrap();
        assert_eq!(settings.branches.integration, "develop");
        assert_eq!(settings.branches.stable_candidates, ["main", "master"]);
        assert_eq!(settings.discovery.pr_limit, 30);
        assert!(settings.publish.remote.is_none());
    }

    #[test]
    fn repo_config_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(REPO_CONFIG_FILE),
            "[branches]\nintegration = \"dev\"\n\n[discovery]\npr_limit = 5\n",
        )
        .unwrap();

        let settings = Settings::load(temp.path()).unwrap();
        assert_eq!(settings.branches.integration, "dev");
        assert_eq!(settings.discovery.pr_limit, 5);
        // Untouched sections keep their defaults
        assert_eq!(settings.branches.stable_candidates, ["main", "master"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(REPO_CONFIG_FILE),
            "[branches]\nintegratoin = \"dev\"\n",
        )
        .unwrap();

        let result = Settings::load(temp.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
