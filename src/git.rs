//! Local git operations via the git CLI.
//!
//! Everything the tool needs from version control goes through one
//! `GitRepo` handle: ancestry queries, branch management, cherry-picks with
//! typed conflict detection, stash set-aside, and pushes. Terminal prompts
//! are disabled on every invocation so a credential prompt can never hang a
//! run.

use crate::error::{Error, Result};
use crate::types::{CommitInfo, GitRemote};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Field and record separators for parsing `git log` output.
const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// Outcome of a cherry-pick attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    /// The commit applied cleanly.
    Applied,
    /// The pick stopped on conflicts.
    Conflict {
        /// Files left in a conflicted state.
        files: Vec<String>,
    },
}

impl PickResult {
    /// Whether the pick completed without conflict.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Handle to a local git repository.
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let output = git_command(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()?;
        if !output.status.success() {
            return Err(Error::NotARepository(path.display().to_string()));
        }
        let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        Ok(Self { root })
    }

    /// Repository root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        debug!(command = %args.join(" "), "git");
        let output = git_command(&self.root).args(args).output()?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Err(Error::Git {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Name of the currently checked-out branch.
    pub fn current_branch(&self) -> Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Resolve a revision to a full commit hash, or `None` if it doesn't
    /// name a commit in this repository.
    pub fn resolve_commit(&self, rev: &str) -> Result<Option<String>> {
        let output = git_command(&self.root)
            .args(["rev-parse", "--verify", "--quiet", &format!("{rev}^{{commit}}")])
            .output()?;
        if output.status.success() {
            Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ))
        } else {
            Ok(None)
        }
    }

    /// Subject line of a commit.
    pub fn commit_subject(&self, rev: &str) -> Result<String> {
        self.run(&["log", "-1", "--format=%s", rev])
    }

    /// Whether `ancestor` is reachable from `descendant`.
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let output = git_command(&self.root)
            .args(["merge-base", "--is-ancestor", ancestor, descendant])
            .output()?;
        // Exit 0 = is ancestor, exit 1 = not ancestor, other = error
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(Error::Git {
                command: format!("git merge-base --is-ancestor {ancestor} {descendant}"),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    /// Commits reachable from `upper` but not from `lower`, oldest first.
    pub fn commits_between(&self, lower: &str, upper: &str) -> Result<Vec<CommitInfo>> {
        let format = format!("--format=%H{FIELD_SEP}%P{FIELD_SEP}%s{FIELD_SEP}%an{FIELD_SEP}%aI{RECORD_SEP}");
        let raw = self.run(&["log", &format, &format!("{lower}..{upper}")])?;

        let mut commits = Vec::new();
        for record in raw.split(RECORD_SEP) {
            let record = record.trim();
            if record.is_empty() {
                continue;
            }
            let fields: Vec<&str> = record.split(FIELD_SEP).collect();
            if fields.len() != 5 {
                return Err(Error::Internal(format!(
                    "unexpected git log record: {record}"
                )));
            }
            let date = DateTime::parse_from_rfc3339(fields[4])
                .map_err(|e| Error::Internal(format!("bad author date {}: {e}", fields[4])))?
                .with_timezone(&Utc);
            commits.push(CommitInfo {
                hash: fields[0].to_string(),
                parent_count: fields[1].split_whitespace().count(),
                subject: fields[2].to_string(),
                author: fields[3].to_string(),
                date,
            });
        }
        // git log is newest-first; callers want history order
        commits.reverse();
        Ok(commits)
    }

    /// Fetch a remote.
    pub fn fetch(&self, remote: &str) -> Result<()> {
        self.run(&["fetch", remote]).map(drop)
    }

    /// Create `branch` at `start_point` and switch to it.
    pub fn create_branch(&self, branch: &str, start_point: &str) -> Result<()> {
        self.run(&["checkout", "-b", branch, start_point]).map(drop)
    }

    /// Switch to an existing branch.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", branch]).map(drop)
    }

    /// Delete a local branch, discarding its commits.
    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        self.run(&["branch", "-D", branch]).map(drop)
    }

    /// Cherry-pick a plain commit onto the current branch.
    pub fn cherry_pick(&self, hash: &str) -> Result<PickResult> {
        self.pick(&["cherry-pick", hash])
    }

    /// Cherry-pick a merge commit as the net change against its first parent,
    /// without replaying the second-parent history.
    pub fn cherry_pick_first_parent(&self, hash: &str) -> Result<PickResult> {
        self.pick(&["cherry-pick", "-m", "1", hash])
    }

    fn pick(&self, args: &[&str]) -> Result<PickResult> {
        debug!(command = %args.join(" "), "git");
        let output = git_command(&self.root).args(args).output()?;
        if output.status.success() {
            return Ok(PickResult::Applied);
        }
        let files = self.conflicted_files()?;
        if files.is_empty() {
            // Failed for some reason other than conflicts
            return Err(Error::Git {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(PickResult::Conflict { files })
    }

    fn conflicted_files(&self) -> Result<Vec<String>> {
        let raw = self.run(&["diff", "--name-only", "--diff-filter=U"])?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Abort an in-progress cherry-pick, restoring the pre-pick state.
    pub fn cherry_pick_abort(&self) -> Result<()> {
        self.run(&["cherry-pick", "--abort"]).map(drop)
    }

    /// Drop the conflicted commit from an in-progress cherry-pick.
    pub fn cherry_pick_skip(&self) -> Result<()> {
        self.run(&["cherry-pick", "--skip"]).map(drop)
    }

    /// Whether the working tree has uncommitted changes.
    pub fn has_local_changes(&self) -> Result<bool> {
        Ok(!self.run(&["status", "--porcelain"])?.is_empty())
    }

    /// Stash away local changes, including untracked files.
    pub fn stash_push(&self, message: &str) -> Result<()> {
        self.run(&["stash", "push", "--include-untracked", "-m", message])
            .map(drop)
    }

    /// Restore the most recently stashed changes.
    pub fn stash_pop(&self) -> Result<()> {
        self.run(&["stash", "pop"]).map(drop)
    }

    /// Push a branch to a remote.
    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["push", "--set-upstream", remote, branch])
            .map(drop)
    }

    /// List configured remotes with their fetch URLs.
    pub fn remotes(&self) -> Result<Vec<GitRemote>> {
        let names = self.run(&["remote"])?;
        let mut remotes = Vec::new();
        for name in names.lines().map(str::trim).filter(|n| !n.is_empty()) {
            let url = self.run(&["remote", "get-url", name])?;
            remotes.push(GitRemote {
                name: name.to_string(),
                url,
            });
        }
        Ok(remotes)
    }
}

/// Pick the remote to use: the requested one, else "origin", else the only
/// remote configured.
pub fn select_remote(remotes: &[GitRemote], requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return remotes
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.name.clone())
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()));
    }
    if let Some(origin) = remotes.iter().find(|r| r.name == "origin") {
        return Ok(origin.name.clone());
    }
    match remotes {
        [only] => Ok(only.name.clone()),
        [] => Err(Error::RemoteNotFound("origin".to_string())),
        _ => Err(Error::Internal(
            "multiple remotes configured; pass --remote to choose one".to_string(),
        )),
    }
}

/// Create a git Command for `workdir` with terminal prompts disabled.
fn git_command(workdir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(workdir);
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(name: &str) -> GitRemote {
        GitRemote {
            name: name.to_string(),
            url: format!("git@github.com:owner/{name}.git"),
        }
    }

    #[test]
    fn select_remote_prefers_requested() {
        let remotes = [remote("origin"), remote("upstream")];
        assert_eq!(
            select_remote(&remotes, Some("upstream")).unwrap(),
            "upstream"
        );
    }

    #[test]
    fn select_remote_requested_must_exist() {
        let remotes = [remote("origin")];
        assert!(matches!(
            select_remote(&remotes, Some("upstream")),
            Err(Error::RemoteNotFound(_))
        ));
    }

    #[test]
    fn select_remote_defaults_to_origin() {
        let remotes = [remote("upstream"), remote("origin")];
        assert_eq!(select_remote(&remotes, None).unwrap(), "origin");
    }

    #[test]
    fn select_remote_single_remote_wins_without_origin() {
        let remotes = [remote("upstream")];
        assert_eq!(select_remote(&remotes, None).unwrap(), "upstream");
    }

    #[test]
    fn select_remote_no_remotes_is_an_error() {
        assert!(select_remote(&[], None).is_err());
    }
}
