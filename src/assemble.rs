//! Branch assembly - replay selected changes onto a fresh release branch
//!
//! Split into a pure plan (`create_assembly_plan`) and an effectful executor
//! (`execute_assembly`), so the ordering rules are testable without a
//! repository. Conflicts route through a [`ConflictHandler`] so the CLI can
//! ask the operator while tests decide programmatically.

use crate::error::Result;
use crate::git::{GitRepo, PickResult};
use crate::select::{AcceptedCommit, AcceptedPr};
use crate::types::short_hash;
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::debug;

/// Release branch name for a run started at `now`.
///
/// UTC-timestamped so names are unique per run and sort chronologically.
pub fn release_branch_name(now: DateTime<Utc>) -> String {
    format!("release/handpicked-{}", now.format("%Y%m%d-%H%M%S"))
}

/// A single cherry-pick in the assembly plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickStep {
    /// Replay a PR's merge commit as its net first-parent diff.
    PrMerge {
        /// PR number
        number: u64,
        /// PR title
        title: String,
        /// Merge commit hash
        merge_commit: String,
    },
    /// Replay a plain commit.
    Commit {
        /// Full commit hash
        hash: String,
        /// Commit subject
        subject: String,
    },
}

impl fmt::Display for PickStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrMerge { number, title, .. } => write!(f, "PR #{number}: {title}"),
            Self::Commit { hash, subject } => {
                write!(f, "commit {}: {subject}", short_hash(hash))
            }
        }
    }
}

/// Ordered cherry-pick plan for a release branch.
#[derive(Debug, Clone)]
pub struct AssemblyPlan {
    /// Branch to create.
    pub branch: String,
    /// Ref the branch starts from (the stable tip).
    pub base_ref: String,
    /// Cherry-picks, in application order.
    pub steps: Vec<PickStep>,
}

/// Create the assembly plan (pure).
///
/// Order is deterministic: every accepted PR merge first, in selection
/// order, then every accepted plain commit, in selection order.
pub fn create_assembly_plan(
    prs: &[AcceptedPr],
    commits: &[AcceptedCommit],
    branch: String,
    base_ref: String,
) -> AssemblyPlan {
    let mut steps = Vec::with_capacity(prs.len() + commits.len());
    for pr in prs {
        steps.push(PickStep::PrMerge {
            number: pr.number,
            title: pr.title.clone(),
            merge_commit: pr.merge_commit.clone(),
        });
    }
    for commit in commits {
        steps.push(PickStep::Commit {
            hash: commit.hash.clone(),
            subject: commit.subject.clone(),
        });
    }
    AssemblyPlan {
        branch,
        base_ref,
        steps,
    }
}

/// Operator decision at a cherry-pick conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// Roll back the whole run.
    Abort,
    /// Drop the conflicting item and continue with the rest.
    Skip,
}

/// Decides what to do when a cherry-pick conflicts.
pub trait ConflictHandler {
    /// Called with the conflicting step and the conflicted files.
    fn on_conflict(&self, step: &PickStep, files: &[String]) -> Result<ConflictChoice>;
}

/// Receives progress messages during execution.
pub trait AssemblyProgress {
    /// Called once per notable event.
    fn on_message(&self, message: &str);
}

/// No-op progress sink.
pub struct SilentProgress;

impl AssemblyProgress for SilentProgress {
    fn on_message(&self, _message: &str) {}
}

/// Result of executing an assembly plan.
#[derive(Debug, Clone, Default)]
pub struct AssemblyOutcome {
    /// Steps applied to the branch, in order.
    pub applied: Vec<PickStep>,
    /// Steps dropped at conflicts.
    pub skipped: Vec<PickStep>,
    /// Whether the operator aborted at a conflict.
    pub aborted: bool,
}

impl AssemblyOutcome {
    /// Whether anything made it onto the branch.
    pub fn has_applied(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Execute the assembly plan (effectful).
///
/// Creates the branch at the stable tip and applies each step in order. On
/// a conflict the handler decides: `Abort` stops immediately with the
/// in-progress pick aborted (the caller owns branch deletion and workspace
/// restore); `Skip` drops the conflicting commit and continues with the
/// remaining items.
pub fn execute_assembly(
    plan: &AssemblyPlan,
    git: &GitRepo,
    handler: &dyn ConflictHandler,
    progress: &dyn AssemblyProgress,
) -> Result<AssemblyOutcome> {
    debug!(branch = %plan.branch, base = %plan.base_ref, "creating release branch");
    git.create_branch(&plan.branch, &plan.base_ref)?;

    let mut outcome = AssemblyOutcome::default();
    for step in &plan.steps {
        progress.on_message(&format!("Cherry-picking {step}"));
        let result = match step {
            PickStep::PrMerge { merge_commit, .. } => git.cherry_pick_first_parent(merge_commit)?,
            PickStep::Commit { hash, .. } => git.cherry_pick(hash)?,
        };
        match result {
            PickResult::Applied => outcome.applied.push(step.clone()),
            PickResult::Conflict { files } => match handler.on_conflict(step, &files)? {
                ConflictChoice::Abort => {
                    debug!(%step, "aborting at conflict");
                    git.cherry_pick_abort()?;
                    outcome.aborted = true;
                    return Ok(outcome);
                }
                ConflictChoice::Skip => {
                    debug!(%step, "skipping conflicted pick");
                    git.cherry_pick_skip()?;
                    progress.on_message(&format!("Skipped {step}"));
                    outcome.skipped.push(step.clone());
                }
            },
        }
    }
    Ok(outcome)
}
