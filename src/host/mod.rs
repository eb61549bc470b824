//! Hosting API services
//!
//! Provides the service trait used by discovery, selection, and publication,
//! plus repository detection from git remote URLs.

mod detection;
mod github;

pub use detection::parse_repo_info;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{CommitInfo, CreatedPr, HostConfig, MergedPr, PrDetails};
use async_trait::async_trait;

/// Options for creating the release pull request.
#[derive(Debug, Clone, Default)]
pub struct CreatePrOptions {
    /// PR title.
    pub title: String,
    /// PR body.
    pub body: String,
    /// Head branch name.
    pub head: String,
    /// Base branch name.
    pub base: String,
    /// Open as a draft.
    pub draft: bool,
    /// Reviewer logins, passed through uninterpreted.
    pub reviewers: Vec<String>,
}

/// Hosting service trait for release operations
///
/// Abstracts the hosting API behind the calls the release flow needs, so the
/// flow can be exercised against a mock in tests.
#[async_trait]
pub trait HostService: Send + Sync {
    /// Check whether a branch exists on the hosted repository.
    async fn branch_exists(&self, branch: &str) -> Result<bool>;

    /// Commits reachable from `head` but not from `base`, oldest first.
    async fn compare_commits(&self, base: &str, head: &str) -> Result<Vec<CommitInfo>>;

    /// Recently merged PRs whose base is `base`, newest first, at most
    /// `limit` of them.
    async fn list_merged_prs(&self, base: &str, limit: u8) -> Result<Vec<MergedPr>>;

    /// Full details for one PR, or `None` if the number doesn't exist.
    async fn get_pr(&self, number: u64) -> Result<Option<PrDetails>>;

    /// Numbers of PRs that contain `commit_hash`.
    async fn prs_for_commit(&self, commit_hash: &str) -> Result<Vec<u64>>;

    /// Open a pull request.
    async fn create_pr(&self, options: &CreatePrOptions) -> Result<CreatedPr>;

    /// The repository identity this service talks to.
    fn config(&self) -> &HostConfig;
}
