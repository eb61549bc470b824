//! Publication - push the assembled branch and open the release PR

use crate::error::Result;
use crate::git::GitRepo;
use crate::host::{CreatePrOptions, HostService};
use crate::select::{AcceptedCommit, AcceptedPr, RejectedItem};
use crate::types::{CreatedPr, short_hash};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Title for the release PR: "Release, <Mon DD> (Hand-picked)".
pub fn release_pr_title(now: DateTime<Utc>) -> String {
    format!("Release, {} (Hand-picked)", now.format("%b %d"))
}

/// Body for the release PR.
///
/// Included PR labels are `#<number>: <title>` with the validated title;
/// commit labels are `Commit <shortHash>: <subject>`. Rejected identifiers
/// get a label-only "Skipped Items" section; their reasons are reported to
/// the operator at run time, not recorded here.
pub fn release_pr_body(
    prs: &[AcceptedPr],
    commits: &[AcceptedCommit],
    rejected: &[RejectedItem],
) -> String {
    let mut body =
        String::from("This release was assembled by release-picker from hand-picked changes.\n");

    if !prs.is_empty() {
        body.push_str("\n## Included PRs\n\n");
        for pr in prs {
            body.push_str(&format!("- #{}: {}\n", pr.number, pr.title));
        }
    }
    if !commits.is_empty() {
        body.push_str("\n## Included Commits\n\n");
        for commit in commits {
            body.push_str(&format!(
                "- Commit {}: {}\n",
                short_hash(&commit.hash),
                commit.subject
            ));
        }
    }
    if !rejected.is_empty() {
        body.push_str("\n## Skipped Items\n\n");
        for item in rejected {
            body.push_str(&format!("- {}\n", item.raw));
        }
    }
    body
}

/// Publication settings collected from the operator.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Open the PR as a draft.
    pub draft: bool,
    /// Reviewer logins, passed through uninterpreted.
    pub reviewers: Vec<String>,
}

/// Push the assembled branch and open the release PR (effectful).
///
/// A failure after the push leaves the branch on the remote for manual
/// recovery; only pre-push failures are rolled back by the caller.
pub async fn publish(
    git: &GitRepo,
    host: &dyn HostService,
    remote: &str,
    branch: &str,
    stable_branch: &str,
    title: String,
    body: String,
    options: &PublishOptions,
) -> Result<CreatedPr> {
    debug!(branch, remote, "pushing release branch");
    git.push(remote, branch)?;

    host.create_pr(&CreatePrOptions {
        title,
        body,
        head: branch.to_string(),
        base: stable_branch.to_string(),
        draft: options.draft,
        reviewers: options.reviewers.clone(),
    })
    .await
}
