//! Working-tree session state with a single restore path
//!
//! Captures the operator's branch and any set-aside local changes before
//! the tool mutates the working tree. One teardown routine restores both,
//! on success, operator abort, and conflict-abort alike, instead of
//! duplicated cleanup at each exit point.

use crate::error::Result;
use crate::git::GitRepo;
use tracing::debug;

/// Stash message used for set-aside changes.
const SET_ASIDE_MESSAGE: &str = "release-picker: set-aside local changes";

/// Captured working-tree state for one run.
#[derive(Debug, Clone)]
pub struct WorkspaceState {
    original_branch: String,
    stashed: bool,
}

impl WorkspaceState {
    /// Capture the current branch without touching the tree.
    pub fn capture(git: &GitRepo) -> Result<Self> {
        Ok(Self {
            original_branch: git.current_branch()?,
            stashed: false,
        })
    }

    /// Branch the operator was on when the run started.
    pub fn original_branch(&self) -> &str {
        &self.original_branch
    }

    /// Whether local changes were set aside.
    pub const fn has_set_aside_changes(&self) -> bool {
        self.stashed
    }

    /// Reversibly set aside uncommitted local changes.
    pub fn set_aside_changes(&mut self, git: &GitRepo) -> Result<()> {
        git.stash_push(SET_ASIDE_MESSAGE)?;
        self.stashed = true;
        debug!("set aside local changes");
        Ok(())
    }

    /// Return to the original branch and restore set-aside changes.
    pub fn restore(&self, git: &GitRepo) -> Result<()> {
        if git.current_branch()? != self.original_branch {
            git.checkout(&self.original_branch)?;
        }
        if self.stashed {
            git.stash_pop()?;
        }
        debug!(branch = %self.original_branch, "restored workspace state");
        Ok(())
    }

    /// Full rollback after an aborted assembly: restore the original state,
    /// then drop the partial release branch.
    pub fn rollback(&self, git: &GitRepo, release_branch: &str) -> Result<()> {
        self.restore(git)?;
        // The branch may not exist if creation itself failed
        if let Err(e) = git.delete_branch(release_branch) {
            debug!(error = %e, branch = release_branch, "release branch cleanup skipped");
        }
        Ok(())
    }
}
