//! Selection resolution - map raw identifiers to validated cherry-pick inputs
//!
//! Each identifier resolves independently to an accepted or rejected outcome;
//! one bad identifier never aborts the batch. The caller inspects the
//! aggregated [`SelectionReport`] and makes a single proceed-or-abort
//! decision.

use crate::discovery::recover_merge_commit;
use crate::error::Result;
use crate::git::GitRepo;
use crate::host::HostService;
use crate::types::{CommitInfo, PrDetails, PrState};
use std::fmt;
use tracing::debug;

/// Minimum length for a bare hex string to be treated as a commit hash.
pub const MIN_HASH_LEN: usize = 7;

/// How a raw identifier was classified before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// All-digit string: a PR number.
    PrNumber(u64),
    /// Hex string of at least [`MIN_HASH_LEN`] characters: a commit hash.
    CommitHash(String),
    /// Anything else: resolved through the VCS, or rejected.
    Symbolic(String),
}

/// Classify a raw identifier string (pure).
pub fn classify_identifier(raw: &str) -> Identifier {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(number) = raw.parse() {
            return Identifier::PrNumber(number);
        }
    }
    if raw.len() >= MIN_HASH_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Identifier::CommitHash(raw.to_ascii_lowercase());
    }
    Identifier::Symbolic(raw.to_string())
}

/// Why a selected identifier was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No PR with this number exists.
    PrNotFound,
    /// The PR exists but is not merged.
    PrNotMerged,
    /// The PR was merged into a different base branch.
    BaseMismatch {
        /// The integration branch the run works against.
        expected: String,
        /// The PR's actual base branch.
        actual: String,
    },
    /// No merge commit could be resolved for the PR.
    NoMergeCommit,
    /// The commit is not reachable from the integration branch tip.
    NotOnIntegration,
    /// Not a PR number, commit hash, or resolvable revision.
    Unrecognized,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrNotFound => write!(f, "PR not found"),
            Self::PrNotMerged => write!(f, "PR is not merged"),
            Self::BaseMismatch { expected, actual } => {
                write!(f, "PR base is {actual}, expected {expected}")
            }
            Self::NoMergeCommit => write!(f, "could not resolve a merge commit"),
            Self::NotOnIntegration => {
                write!(f, "commit is not reachable from the integration branch")
            }
            Self::Unrecognized => write!(f, "not a valid PR number or commit hash"),
        }
    }
}

/// An accepted PR selection, carrying its cherry-pick source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedPr {
    /// PR number
    pub number: u64,
    /// Validated PR title
    pub title: String,
    /// The merge commit to cherry-pick
    pub merge_commit: String,
}

/// An accepted plain-commit selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedCommit {
    /// Full commit hash
    pub hash: String,
    /// Commit subject
    pub subject: String,
}

/// A rejected identifier with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedItem {
    /// The identifier as the operator typed it
    pub raw: String,
    /// Why it was rejected
    pub reason: RejectReason,
}

/// Outcome of resolving a full identifier list.
#[derive(Debug, Clone, Default)]
pub struct SelectionReport {
    /// Accepted PRs, in selection order.
    pub prs: Vec<AcceptedPr>,
    /// Accepted plain commits, in selection order.
    pub commits: Vec<AcceptedCommit>,
    /// Rejected identifiers, in selection order.
    pub rejected: Vec<RejectedItem>,
}

impl SelectionReport {
    /// Whether anything was accepted.
    pub fn has_accepted(&self) -> bool {
        !self.prs.is_empty() || !self.commits.is_empty()
    }

    /// Number of accepted items.
    pub fn accepted_count(&self) -> usize {
        self.prs.len() + self.commits.len()
    }

    /// Whether anything was rejected.
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Validate one PR against the integration branch (pure).
///
/// `unreleased` feeds the merge-commit recovery fallback when the API has no
/// merge commit for the PR.
pub fn validate_pr(
    details: &PrDetails,
    integration_branch: &str,
    unreleased: &[CommitInfo],
) -> std::result::Result<AcceptedPr, RejectReason> {
    if details.state != PrState::Merged {
        return Err(RejectReason::PrNotMerged);
    }
    if details.base_ref != integration_branch {
        return Err(RejectReason::BaseMismatch {
            expected: integration_branch.to_string(),
            actual: details.base_ref.clone(),
        });
    }
    let merge_commit = details
        .merge_commit
        .clone()
        .or_else(|| recover_merge_commit(details.number, unreleased))
        .ok_or(RejectReason::NoMergeCommit)?;
    Ok(AcceptedPr {
        number: details.number,
        title: details.title.clone(),
        merge_commit,
    })
}

/// Resolve raw identifiers into accepted/rejected outcomes (effectful).
pub async fn resolve_selection(
    identifiers: &[String],
    git: &GitRepo,
    host: &dyn HostService,
    integration_branch: &str,
    integration_ref: &str,
    unreleased: &[CommitInfo],
) -> Result<SelectionReport> {
    let mut report = SelectionReport::default();

    for raw in identifiers {
        match classify_identifier(raw) {
            Identifier::PrNumber(number) => match host.get_pr(number).await? {
                Some(details) => match validate_pr(&details, integration_branch, unreleased) {
                    Ok(accepted) => {
                        debug!(number, "accepted PR");
                        report.prs.push(accepted);
                    }
                    Err(reason) => report.rejected.push(RejectedItem {
                        raw: raw.clone(),
                        reason,
                    }),
                },
                None => report.rejected.push(RejectedItem {
                    raw: raw.clone(),
                    reason: RejectReason::PrNotFound,
                }),
            },
            Identifier::CommitHash(hash) => {
                resolve_commit_identifier(git, &mut report, raw, &hash, integration_ref)?;
            }
            Identifier::Symbolic(name) => match git.resolve_commit(&name)? {
                Some(hash) => {
                    resolve_commit_identifier(git, &mut report, raw, &hash, integration_ref)?;
                }
                None => report.rejected.push(RejectedItem {
                    raw: raw.clone(),
                    reason: RejectReason::Unrecognized,
                }),
            },
        }
    }

    Ok(report)
}

/// Accept or reject a single commit identifier.
///
/// A commit is accepted only when it both resolves and sits on the
/// integration branch; a commit that exists elsewhere in history is still
/// rejected.
fn resolve_commit_identifier(
    git: &GitRepo,
    report: &mut SelectionReport,
    raw: &str,
    hash: &str,
    integration_ref: &str,
) -> Result<()> {
    let Some(full) = git.resolve_commit(hash)? else {
        report.rejected.push(RejectedItem {
            raw: raw.to_string(),
            reason: RejectReason::NotOnIntegration,
        });
        return Ok(());
    };
    if !git.is_ancestor(&full, integration_ref)? {
        report.rejected.push(RejectedItem {
            raw: raw.to_string(),
            reason: RejectReason::NotOnIntegration,
        });
        return Ok(());
    }
    let subject = git.commit_subject(&full)?;
    debug!(commit = %full, "accepted commit");
    report.commits.push(AcceptedCommit {
        hash: full,
        subject,
    });
    Ok(())
}
