//! Change-set discovery - what is on the integration branch but not released
//!
//! Effectful gathering (`discover_unreleased`) feeds a pure constructor
//! (`build_unreleased_set`), so the classification and deduplication rules
//! are testable without a network or a repository.

use crate::error::Result;
use crate::git::GitRepo;
use crate::host::HostService;
use crate::types::{BranchRefs, ChangeItem, CommitInfo, MergedPr, UnreleasedSet};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Find the commit that merged a PR when the API didn't expose one.
///
/// Searches unreleased commit subjects for a `#<number>` reference.
/// Heuristic: an issue number equal to the PR number can match an unrelated
/// commit, and a reworded subject can miss a real one.
pub fn recover_merge_commit(number: u64, unreleased: &[CommitInfo]) -> Option<String> {
    let pattern = Regex::new(&format!(r"(^|\D)#{number}(\D|$)")).ok()?;
    unreleased
        .iter()
        .find(|c| pattern.is_match(&c.subject))
        .map(|c| c.hash.clone())
}

/// Build the unreleased change set from pre-fetched data (pure).
///
/// `commit_prs` maps commit hash to PR number from the reverse commit-to-PR
/// lookup; pass an empty map when lookups were unavailable.
///
/// Claims are tracked in an explicit hash-to-PR map built once per call, so
/// a commit claimed as some kept PR's merge commit never also appears as a
/// direct commit.
pub fn build_unreleased_set(
    unreleased: &[CommitInfo],
    merged_prs: &[MergedPr],
    commit_prs: &HashMap<String, u64>,
) -> UnreleasedSet {
    let unreleased_hashes: HashSet<&str> = unreleased.iter().map(|c| c.hash.as_str()).collect();
    let mut claimed: HashMap<String, u64> = HashMap::new();
    let mut items = Vec::new();

    // PR merges first, in the order the API returned them
    for pr in merged_prs {
        let merge_commit = match &pr.merge_commit {
            Some(hash) if unreleased_hashes.contains(hash.as_str()) => Some(hash.clone()),
            // A known merge commit outside the diff means the PR is already
            // released or merged into a different history
            Some(_) => None,
            None => recover_merge_commit(pr.number, unreleased),
        };
        let Some(merge_commit) = merge_commit else {
            debug!(number = pr.number, "excluding PR without an unreleased merge commit");
            continue;
        };
        if let Some(owner) = claimed.get(&merge_commit) {
            debug!(
                number = pr.number,
                owner = *owner,
                "commit already claimed, excluding PR"
            );
            continue;
        }
        claimed.insert(merge_commit.clone(), pr.number);
        items.push(ChangeItem::PrMerge {
            number: pr.number,
            title: pr.title.clone(),
            author: pr.author.clone(),
            merged_at: pr.merged_at,
            merge_commit,
        });
    }

    // Direct commits in history order: merge commits and claimed hashes drop out
    for commit in unreleased {
        if commit.parent_count > 1 {
            continue;
        }
        if claimed.contains_key(&commit.hash) {
            continue;
        }
        items.push(ChangeItem::DirectCommit {
            hash: commit.hash.clone(),
            subject: commit.subject.clone(),
            author: commit.author.clone(),
            date: commit.date,
            pr_number: commit_prs.get(&commit.hash).copied(),
        });
    }

    UnreleasedSet { items }
}

/// Everything discovery gathered for one run.
///
/// The raw commit list is kept alongside the classified set because the
/// merge-commit recovery fallback during selection searches its subjects.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredChanges {
    /// The classified unreleased set.
    pub set: UnreleasedSet,
    /// Raw commits from the ancestry diff, oldest first.
    pub commits: Vec<CommitInfo>,
}

impl DiscoveredChanges {
    /// Whether nothing is unreleased.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Discover unreleased changes between the configured branches (effectful).
///
/// Prefers the hosting API comparison and falls back to a local ancestry
/// walk when the API fails or comes back empty. Failures in the merged-PR
/// and reverse-lookup queries degrade quietly: the affected commits are
/// still listed, just without PR classification.
pub async fn discover_unreleased(
    git: &GitRepo,
    host: &dyn HostService,
    refs: &BranchRefs,
    pr_limit: u8,
) -> Result<DiscoveredChanges> {
    let commits = match host.compare_commits(&refs.stable, &refs.integration).await {
        Ok(commits) if !commits.is_empty() => commits,
        Ok(_) => {
            debug!("API comparison returned no commits, trying local history");
            git.commits_between(&refs.stable_ref, &refs.integration_ref)?
        }
        Err(e) => {
            debug!(error = %e, "API comparison failed, falling back to local history");
            git.commits_between(&refs.stable_ref, &refs.integration_ref)?
        }
    };

    if commits.is_empty() {
        debug!("no unreleased commits");
        return Ok(DiscoveredChanges::default());
    }

    let merged_prs = match host.list_merged_prs(&refs.integration, pr_limit).await {
        Ok(prs) => prs,
        Err(e) => {
            debug!(error = %e, "merged PR query failed, listing commits only");
            Vec::new()
        }
    };

    // First pass settles which commits the PR merges claim, then the
    // remaining direct commits get a reverse PR lookup for display.
    // Sequential by design; runtime scales with the unreleased count.
    let provisional = build_unreleased_set(&commits, &merged_prs, &HashMap::new());
    let mut commit_prs = HashMap::new();
    for item in provisional.direct_commits() {
        let hash = item.pick_source();
        match host.prs_for_commit(hash).await {
            Ok(numbers) => {
                if let Some(number) = numbers.first() {
                    commit_prs.insert(hash.to_string(), *number);
                }
            }
            Err(e) => {
                debug!(error = %e, commit = hash, "reverse PR lookup failed");
            }
        }
    }

    let set = build_unreleased_set(&commits, &merged_prs, &commit_prs);
    debug!(count = set.len(), "discovered unreleased changes");
    Ok(DiscoveredChanges { set, commits })
}
