//! Error types for release-picker

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by release-picker operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The given path is not inside a git repository.
    #[error("not a git repository: {0}")]
    NotARepository(String),

    /// A git command exited unsuccessfully.
    #[error("{command} failed: {stderr}")]
    Git {
        /// The full command line that failed.
        command: String,
        /// Trimmed stderr from git.
        stderr: String,
    },

    /// GitHub API call failed.
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Could not obtain a GitHub token.
    #[error("GitHub authentication failed: {0}")]
    Auth(String),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// No remote with a supported hosting URL was found.
    #[error("no supported remotes found (expected a GitHub remote)")]
    NoSupportedRemotes,

    /// The requested remote does not exist.
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// None of the stable-branch candidates exist.
    #[error("no stable branch found (tried: {0})")]
    NoStableBranch(String),

    /// Selection resolved to zero usable items.
    #[error("no valid items to include")]
    EmptySelection,

    /// The operator declined to continue.
    #[error("aborted: {0}")]
    Aborted(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}
