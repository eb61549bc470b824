//! GitHub host service implementation

use crate::error::{Error, Result};
use crate::host::{CreatePrOptions, HostService};
use crate::types::{CommitInfo, CreatedPr, HostConfig, MergedPr, PrDetails, PrState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

// REST response types for endpoints octocrab does not model

#[derive(Deserialize)]
struct CompareResponse {
    commits: Vec<CompareCommit>,
}

#[derive(Deserialize)]
struct CompareCommit {
    sha: String,
    parents: Vec<CompareParent>,
    commit: CompareCommitDetail,
}

// Only the parent count matters; unknown fields are ignored.
#[derive(Deserialize)]
struct CompareParent {}

#[derive(Deserialize)]
struct CompareCommitDetail {
    message: String,
    author: Option<CompareCommitIdent>,
}

#[derive(Deserialize)]
struct CompareCommitIdent {
    name: String,
    date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct CommitPrRef {
    number: u64,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: HostConfig,
    /// Token for raw HTTP requests (endpoints octocrab does not model)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API host for raw requests
    api_host: String,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        let api_host = if let Some(ref h) = host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
            format!("{h}/api/v3")
        } else {
            "api.github.com".to_string()
        };

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("release-picker")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: HostConfig { owner, repo, host },
            token: token.to_string(),
            http_client,
            api_host,
        })
    }

    fn rest_url(&self, tail: &str) -> String {
        format!(
            "https://{}/repos/{}/{}/{tail}",
            self.api_host, self.config.owner, self.config.repo
        )
    }

    async fn rest_get(&self, url: &str) -> Result<reqwest::Response> {
        self.http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("request failed: {e}")))
    }

    async fn request_reviewers(&self, number: u64, reviewers: &[String]) -> Result<()> {
        debug!(number, count = reviewers.len(), "requesting reviewers");
        let url = self.rest_url(&format!("pulls/{number}/requested_reviewers"));
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&serde_json::json!({ "reviewers": reviewers }))
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "reviewer request returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Helper to convert a listed octocrab PR to our `MergedPr` type.
///
/// Returns `None` for PRs that were closed without merging.
fn merged_pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> Option<MergedPr> {
    let merged_at = pr.merged_at?;
    Some(MergedPr {
        number: pr.number,
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        author: pr.user.as_ref().map(|u| u.login.clone()).unwrap_or_default(),
        merged_at,
        merge_commit: pr.merge_commit_sha.clone(),
        base_ref: pr.base.ref_field.clone(),
    })
}

#[async_trait]
impl HostService for GitHubService {
    async fn branch_exists(&self, branch: &str) -> Result<bool> {
        debug!(branch, "checking branch existence");
        let url = self.rest_url(&format!("branches/{branch}"));
        let response = self.rest_get(&url).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "branch lookup returned {}",
                response.status()
            )));
        }
        Ok(true)
    }

    async fn compare_commits(&self, base: &str, head: &str) -> Result<Vec<CommitInfo>> {
        debug!(base, head, "comparing refs");
        let url = self.rest_url(&format!("compare/{base}...{head}?per_page=250"));
        let response = self.rest_get(&url).await?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "compare returned {}",
                response.status()
            )));
        }

        let compared: CompareResponse = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to parse compare response: {e}")))?;

        // The compare endpoint returns commits oldest-first already
        let commits = compared
            .commits
            .into_iter()
            .map(|c| CommitInfo {
                subject: first_line(&c.commit.message).to_string(),
                author: c
                    .commit
                    .author
                    .as_ref()
                    .map_or_else(String::new, |a| a.name.clone()),
                date: c
                    .commit
                    .author
                    .as_ref()
                    .map_or(DateTime::UNIX_EPOCH, |a| a.date),
                parent_count: c.parents.len(),
                hash: c.sha,
            })
            .collect();
        Ok(commits)
    }

    async fn list_merged_prs(&self, base: &str, limit: u8) -> Result<Vec<MergedPr>> {
        debug!(base, limit, "listing merged PRs");
        let page = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .base(base)
            .state(octocrab::params::State::Closed)
            .sort(octocrab::params::pulls::Sort::Updated)
            .direction(octocrab::params::Direction::Descending)
            .per_page(limit)
            .send()
            .await?;

        let prs: Vec<MergedPr> = page.items.iter().filter_map(merged_pr_from_octocrab).collect();
        debug!(count = prs.len(), "listed merged PRs");
        Ok(prs)
    }

    async fn get_pr(&self, number: u64) -> Result<Option<PrDetails>> {
        debug!(number, "getting PR");
        let pr = match self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(number)
            .await
        {
            Ok(pr) => pr,
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code.as_u16() == 404 =>
            {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        // Closed + merged_at means merged; IssueState is non-exhaustive
        let state = match pr.state {
            Some(octocrab::models::IssueState::Open) => PrState::Open,
            Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
            Some(_) | None => PrState::Closed,
        };

        Ok(Some(PrDetails {
            number: pr.number,
            title: pr.title.clone().unwrap_or_default(),
            author: pr.user.as_ref().map(|u| u.login.clone()).unwrap_or_default(),
            state,
            base_ref: pr.base.ref_field.clone(),
            merge_commit: pr.merge_commit_sha.clone(),
            merged_at: pr.merged_at,
        }))
    }

    async fn prs_for_commit(&self, commit_hash: &str) -> Result<Vec<u64>> {
        debug!(commit = commit_hash, "listing PRs containing commit");
        let url = self.rest_url(&format!("commits/{commit_hash}/pulls"));
        let response = self.rest_get(&url).await?;

        if !response.status().is_success() {
            debug!(
                status = %response.status(),
                "commit PR lookup returned non-success, assuming none"
            );
            return Ok(Vec::new());
        }

        let refs: Vec<CommitPrRef> = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to parse commit PR list: {e}")))?;
        Ok(refs.into_iter().map(|r| r.number).collect())
    }

    async fn create_pr(&self, options: &CreatePrOptions) -> Result<CreatedPr> {
        debug!(
            head = %options.head,
            base = %options.base,
            draft = options.draft,
            "creating PR"
        );
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(&options.title, &options.head, &options.base)
            .body(&options.body)
            .draft(options.draft)
            .send()
            .await?;

        if !options.reviewers.is_empty() {
            self.request_reviewers(pr.number, &options.reviewers).await?;
        }

        let created = CreatedPr {
            number: pr.number,
            html_url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        };
        debug!(number = created.number, "created PR");
        Ok(created)
    }

    fn config(&self) -> &HostConfig {
        &self.config
    }
}
