//! Authentication for the GitHub API
//!
//! Supports CLI-based auth (gh) and environment variables.

mod github;

pub use github::{GitHubAuthConfig, get_github_auth};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from the gh CLI
    Cli,
    /// Token from environment variable
    EnvVar,
}
