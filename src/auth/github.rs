//! GitHub token lookup via the gh CLI or environment variables.

use super::AuthSource;
use crate::error::{Error, Result};
use std::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order.
const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Resolved GitHub credentials.
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Personal access token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
}

/// Look up a GitHub token: `gh auth token` first, then environment variables.
pub fn get_github_auth() -> Result<GitHubAuthConfig> {
    if let Some(token) = token_from_gh_cli() {
        debug!("using token from gh CLI");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    for var in TOKEN_ENV_VARS {
        if let Ok(value) = std::env::var(var) {
            let token = value.trim().to_string();
            if !token.is_empty() {
                debug!(var, "using token from environment");
                return Ok(GitHubAuthConfig {
                    token,
                    source: AuthSource::EnvVar,
                });
            }
        }
    }

    Err(Error::Auth(
        "no GitHub token found; run 'gh auth login' or set GITHUB_TOKEN".to_string(),
    ))
}

fn token_from_gh_cli() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}
