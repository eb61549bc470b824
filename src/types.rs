//! Core types for release-picker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shorten a commit hash for display.
pub fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(7)]
}

/// A commit from the ancestry diff between the stable and integration branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Full commit hash (hex)
    pub hash: String,
    /// First line of the commit message
    pub subject: String,
    /// Author name
    pub author: String,
    /// Author date
    pub date: DateTime<Utc>,
    /// Number of parent commits (more than one means a merge commit)
    pub parent_count: usize,
}

impl CommitInfo {
    /// Shortened hash for display.
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }
}

/// A merged pull request fetched from the hosting API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedPr {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Author login
    pub author: String,
    /// When the PR was merged
    pub merged_at: DateTime<Utc>,
    /// Merge commit hash, when the API exposes one
    pub merge_commit: Option<String>,
    /// Base branch name
    pub base_ref: String,
}

/// PR state as reported by the hosting API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Full PR details used by selection validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrDetails {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Author login
    pub author: String,
    /// Current state of the PR
    pub state: PrState,
    /// Base branch name
    pub base_ref: String,
    /// Merge commit hash, when the API exposes one
    pub merge_commit: Option<String>,
    /// When the PR was merged, if it was
    pub merged_at: Option<DateTime<Utc>>,
}

/// One unreleased change, classified.
///
/// A PR whose commits were squashed or rebased onto the integration branch
/// leaves no merge commit to cherry-pick as a unit, so it is represented as
/// a `DirectCommit` with an associated PR number, never as a `PrMerge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeItem {
    /// A pull request integrated through a merge commit.
    PrMerge {
        /// PR number
        number: u64,
        /// PR title
        title: String,
        /// Author login
        author: String,
        /// When the PR was merged
        merged_at: DateTime<Utc>,
        /// The merge commit to cherry-pick
        merge_commit: String,
    },
    /// A commit with no claiming merge commit.
    DirectCommit {
        /// Full commit hash
        hash: String,
        /// Commit subject
        subject: String,
        /// Author name
        author: String,
        /// Author date
        date: DateTime<Utc>,
        /// Associated PR, when a reverse lookup found one
        pr_number: Option<u64>,
    },
}

impl ChangeItem {
    /// The commit this item would be cherry-picked from.
    pub fn pick_source(&self) -> &str {
        match self {
            Self::PrMerge { merge_commit, .. } => merge_commit,
            Self::DirectCommit { hash, .. } => hash,
        }
    }

    /// Whether this item is a PR merge.
    pub const fn is_pr_merge(&self) -> bool {
        matches!(self, Self::PrMerge { .. })
    }
}

impl fmt::Display for ChangeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrMerge {
                number,
                title,
                author,
                ..
            } => write!(f, "#{number} {title} ({author})"),
            Self::DirectCommit {
                hash,
                subject,
                author,
                pr_number,
                ..
            } => {
                write!(f, "{} ", short_hash(hash))?;
                if let Some(number) = pr_number {
                    write!(f, "PR #{number}: ")?;
                }
                write!(f, "{subject} ({author})")
            }
        }
    }
}

/// The ordered set of unreleased changes for one run.
///
/// Built once during discovery and immutable afterwards. PR merges come
/// first (in the order the hosting API returned them), then direct commits
/// in history order. No direct commit's hash ever equals a kept PR merge's
/// merge commit.
#[derive(Debug, Clone, Default)]
pub struct UnreleasedSet {
    /// The classified changes, in display order.
    pub items: Vec<ChangeItem>,
}

impl UnreleasedSet {
    /// Whether the set contains no changes.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of changes in the set.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The PR-merge items, in order.
    pub fn pr_merges(&self) -> impl Iterator<Item = &ChangeItem> {
        self.items.iter().filter(|i| i.is_pr_merge())
    }

    /// The direct-commit items, in order.
    pub fn direct_commits(&self) -> impl Iterator<Item = &ChangeItem> {
        self.items.iter().filter(|i| !i.is_pr_merge())
    }
}

/// Pull request created by publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedPr {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
}

/// Repository identity on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

/// A git remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Branch names resolved for a run, with their remote-tracking refs.
#[derive(Debug, Clone)]
pub struct BranchRefs {
    /// Integration branch name (e.g., "develop")
    pub integration: String,
    /// Stable branch name ("main" or "master")
    pub stable: String,
    /// Local remote-tracking ref for the integration branch
    pub integration_ref: String,
    /// Local remote-tracking ref for the stable branch
    pub stable_ref: String,
}
