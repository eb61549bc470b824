//! Shared test fixtures
//!
//! These are test utilities - not every helper is used by every test binary.

#![allow(dead_code)]

mod mock_host;

pub use mock_host::{CreatePrCall, MockHostService};

use chrono::{DateTime, TimeZone, Utc};
use release_picker::git::GitRepo;
use release_picker::types::{CommitInfo, HostConfig, MergedPr, PrDetails, PrState};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Stable timestamp for fixtures.
pub fn fixed_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
}

/// Host config pointing at a test repository.
pub fn github_host_config() -> HostConfig {
    HostConfig {
        owner: "test".to_string(),
        repo: "repo".to_string(),
        host: None,
    }
}

/// A plain (single-parent) commit.
pub fn make_commit(hash: &str, subject: &str) -> CommitInfo {
    CommitInfo {
        hash: hash.to_string(),
        subject: subject.to_string(),
        author: "alice".to_string(),
        date: fixed_date(),
        parent_count: 1,
    }
}

/// A merge commit (two parents).
pub fn make_merge_commit(hash: &str, subject: &str) -> CommitInfo {
    CommitInfo {
        parent_count: 2,
        ..make_commit(hash, subject)
    }
}

/// A merged PR based on "develop".
pub fn make_merged_pr(number: u64, title: &str, merge_commit: Option<&str>) -> MergedPr {
    MergedPr {
        number,
        title: title.to_string(),
        author: "alice".to_string(),
        merged_at: fixed_date(),
        merge_commit: merge_commit.map(str::to_string),
        base_ref: "develop".to_string(),
    }
}

/// PR details with the given state/base/merge commit.
pub fn make_pr_details(
    number: u64,
    title: &str,
    state: PrState,
    base_ref: &str,
    merge_commit: Option<&str>,
) -> PrDetails {
    PrDetails {
        number,
        title: title.to_string(),
        author: "alice".to_string(),
        state,
        base_ref: base_ref.to_string(),
        merge_commit: merge_commit.map(str::to_string),
        merged_at: (state == PrState::Merged).then(fixed_date),
    }
}

/// A real git repository in a temp directory, driven through the git CLI.
///
/// Initialized on a "main" branch with one commit and a repo-local identity
/// so cherry-picks work without global config.
pub struct TempGitRepo {
    temp: TempDir,
}

impl TempGitRepo {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let repo = Self { temp };
        repo.git(&["init", "--initial-branch=main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.write_file("README.md", "base\n");
        repo.git(&["add", "."]);
        repo.git(&["commit", "-m", "Initial commit"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Open the fixture through the crate's own wrapper.
    pub fn repo(&self) -> GitRepo {
        GitRepo::open(self.path()).expect("open repo")
    }

    /// Run a git command in the repo, panicking on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.temp.path())
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn write_file(&self, name: &str, content: &str) {
        std::fs::write(self.temp.path().join(name), content).expect("write file");
    }

    /// Write `name`, commit it, and return the commit hash.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> String {
        self.write_file(name, content);
        self.git(&["add", "."]);
        self.git(&["commit", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Create a feature branch off the current branch, commit one file on
    /// it, and merge it back with --no-ff. Returns the merge commit hash.
    pub fn merge_feature(&self, branch: &str, file: &str, merge_message: &str) -> String {
        let current = self.git(&["rev-parse", "--abbrev-ref", "HEAD"]);
        self.git(&["checkout", "-b", branch]);
        self.commit_file(file, "feature content\n", &format!("Add {file}"));
        self.git(&["checkout", &current]);
        self.git(&["merge", "--no-ff", "-m", merge_message, branch]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Subjects of commits on `branch` that are not on `base`, newest first.
    pub fn subjects_between(&self, base: &str, branch: &str) -> Vec<String> {
        self.git(&["log", "--format=%s", &format!("{base}..{branch}")])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Whether a local branch exists.
    pub fn has_branch(&self, name: &str) -> bool {
        !self.git(&["branch", "--list", name]).is_empty()
    }

    /// Whether a cherry-pick is in progress.
    pub fn cherry_pick_in_progress(&self) -> bool {
        self.temp
            .path()
            .join(".git")
            .join("CHERRY_PICK_HEAD")
            .exists()
    }
}
