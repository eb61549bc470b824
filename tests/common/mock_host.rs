//! Mock host service for testing
//!
//! Manually implements `HostService` with configurable responses, call
//! recording, and error injection, so flows can be exercised without a
//! network.

#![allow(dead_code)]

use async_trait::async_trait;
use release_picker::error::{Error, Result};
use release_picker::host::{CreatePrOptions, HostService};
use release_picker::types::{CommitInfo, CreatedPr, HostConfig, MergedPr, PrDetails};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
    pub draft: bool,
    pub reviewers: Vec<String>,
}

/// Configurable mock implementation of [`HostService`]
pub struct MockHostService {
    config: HostConfig,
    next_pr_number: AtomicU64,
    // Configurable responses
    branches: Mutex<HashSet<String>>,
    compare_response: Mutex<Vec<CommitInfo>>,
    merged_prs_response: Mutex<Vec<MergedPr>>,
    pr_details_responses: Mutex<HashMap<u64, PrDetails>>,
    commit_pr_responses: Mutex<HashMap<String, Vec<u64>>>,
    // Call tracking
    compare_calls: Mutex<Vec<(String, String)>>,
    list_merged_calls: Mutex<Vec<(String, u8)>>,
    get_pr_calls: Mutex<Vec<u64>>,
    prs_for_commit_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    // Error injection
    error_on_compare: Mutex<Option<String>>,
    error_on_list_merged: Mutex<Option<String>>,
    error_on_branch_exists: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
}

impl MockHostService {
    /// Create a new mock with the given config
    pub fn with_config(config: HostConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(100),
            branches: Mutex::new(HashSet::new()),
            compare_response: Mutex::new(Vec::new()),
            merged_prs_response: Mutex::new(Vec::new()),
            pr_details_responses: Mutex::new(HashMap::new()),
            commit_pr_responses: Mutex::new(HashMap::new()),
            compare_calls: Mutex::new(Vec::new()),
            list_merged_calls: Mutex::new(Vec::new()),
            get_pr_calls: Mutex::new(Vec::new()),
            prs_for_commit_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_compare: Mutex::new(None),
            error_on_list_merged: Mutex::new(None),
            error_on_branch_exists: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
        }
    }

    // === Response configuration ===

    /// Make `branch_exists` return true for this branch
    pub fn add_branch(&self, name: &str) {
        self.branches.lock().unwrap().insert(name.to_string());
    }

    /// Set the commits returned by `compare_commits`
    pub fn set_compare_response(&self, commits: Vec<CommitInfo>) {
        *self.compare_response.lock().unwrap() = commits;
    }

    /// Set the PRs returned by `list_merged_prs`
    pub fn set_merged_prs(&self, prs: Vec<MergedPr>) {
        *self.merged_prs_response.lock().unwrap() = prs;
    }

    /// Set the response for `get_pr` for a specific number
    pub fn set_pr_details(&self, details: PrDetails) {
        self.pr_details_responses
            .lock()
            .unwrap()
            .insert(details.number, details);
    }

    /// Set the PR numbers returned by `prs_for_commit` for a commit
    pub fn set_commit_prs(&self, commit_hash: &str, numbers: Vec<u64>) {
        self.commit_pr_responses
            .lock()
            .unwrap()
            .insert(commit_hash.to_string(), numbers);
    }

    // === Error injection ===

    /// Make `compare_commits` return an error
    pub fn fail_compare(&self, msg: &str) {
        *self.error_on_compare.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_merged_prs` return an error
    pub fn fail_list_merged(&self, msg: &str) {
        *self.error_on_list_merged.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `branch_exists` return an error
    pub fn fail_branch_exists(&self, msg: &str) {
        *self.error_on_branch_exists.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification ===

    /// Get all `compare_commits` calls as (base, head) pairs
    pub fn get_compare_calls(&self) -> Vec<(String, String)> {
        self.compare_calls.lock().unwrap().clone()
    }

    /// Get all `get_pr` calls
    pub fn get_pr_calls(&self) -> Vec<u64> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    /// Get all `prs_for_commit` calls
    pub fn get_prs_for_commit_calls(&self) -> Vec<String> {
        self.prs_for_commit_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }
}

#[async_trait]
impl HostService for MockHostService {
    async fn branch_exists(&self, branch: &str) -> Result<bool> {
        if let Some(msg) = self.error_on_branch_exists.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self.branches.lock().unwrap().contains(branch))
    }

    async fn compare_commits(&self, base: &str, head: &str) -> Result<Vec<CommitInfo>> {
        self.compare_calls
            .lock()
            .unwrap()
            .push((base.to_string(), head.to_string()));

        if let Some(msg) = self.error_on_compare.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self.compare_response.lock().unwrap().clone())
    }

    async fn list_merged_prs(&self, base: &str, limit: u8) -> Result<Vec<MergedPr>> {
        self.list_merged_calls
            .lock()
            .unwrap()
            .push((base.to_string(), limit));

        if let Some(msg) = self.error_on_list_merged.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        let prs = self.merged_prs_response.lock().unwrap();
        Ok(prs.iter().take(limit as usize).cloned().collect())
    }

    async fn get_pr(&self, number: u64) -> Result<Option<PrDetails>> {
        self.get_pr_calls.lock().unwrap().push(number);
        let responses = self.pr_details_responses.lock().unwrap();
        Ok(responses.get(&number).cloned())
    }

    async fn prs_for_commit(&self, commit_hash: &str) -> Result<Vec<u64>> {
        self.prs_for_commit_calls
            .lock()
            .unwrap()
            .push(commit_hash.to_string());
        let responses = self.commit_pr_responses.lock().unwrap();
        Ok(responses.get(commit_hash).cloned().unwrap_or_default())
    }

    async fn create_pr(&self, options: &CreatePrOptions) -> Result<CreatedPr> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: options.head.clone(),
            base: options.base.clone(),
            title: options.title.clone(),
            body: options.body.clone(),
            draft: options.draft,
            reviewers: options.reviewers.clone(),
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedPr {
            number,
            html_url: format!("https://github.com/test/repo/pull/{number}"),
        })
    }

    fn config(&self) -> &HostConfig {
        &self.config
    }
}
