//! Shared command context
//!
//! Extracts the setup sequence every run performs before any mutation:
//! open the repository, load settings, select the remote, authenticate,
//! build the host service, and resolve the branch pair.

use release_picker::auth::get_github_auth;
use release_picker::config::Settings;
use release_picker::error::{Error, Result};
use release_picker::git::{GitRepo, select_remote};
use release_picker::host::{GitHubService, HostService, parse_repo_info};
use release_picker::types::BranchRefs;
use std::path::Path;
use tracing::debug;

/// Shared context for a run
pub struct CommandContext {
    /// The local repository
    pub git: GitRepo,
    /// Loaded settings
    pub settings: Settings,
    /// Host service (GitHub)
    pub host: Box<dyn HostService>,
    /// Selected remote name
    pub remote_name: String,
    /// Resolved branch names and refs
    pub refs: BranchRefs,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// Environment failures here (not a repository, no token, no supported
    /// remote) happen before any side effect.
    pub async fn new(
        path: &Path,
        remote: Option<&str>,
        integration: Option<&str>,
    ) -> Result<Self> {
        let git = GitRepo::open(path)?;
        let settings = Settings::load(git.root())?;

        let remotes = git.remotes()?;
        let requested = remote
            .map(str::to_string)
            .or_else(|| settings.publish.remote.clone());
        let remote_name = select_remote(&remotes, requested.as_deref())?;

        let remote_info = remotes
            .iter()
            .find(|r| r.name == remote_name)
            .ok_or_else(|| Error::RemoteNotFound(remote_name.clone()))?;
        let host_config = parse_repo_info(&remote_info.url)?;

        let auth = get_github_auth()?;
        debug!(source = ?auth.source, "authenticated with GitHub");
        let host: Box<dyn HostService> = Box::new(GitHubService::new(
            &auth.token,
            host_config.owner,
            host_config.repo,
            host_config.host,
        )?);

        let integration = integration
            .unwrap_or(&settings.branches.integration)
            .to_string();
        let stable = detect_stable_branch(
            &git,
            host.as_ref(),
            &settings.branches.stable_candidates,
            &remote_name,
        )
        .await?;
        debug!(%integration, %stable, "resolved branch pair");

        let refs = BranchRefs {
            integration_ref: format!("{remote_name}/{integration}"),
            stable_ref: format!("{remote_name}/{stable}"),
            integration,
            stable,
        };

        Ok(Self {
            git,
            settings,
            host,
            remote_name,
            refs,
        })
    }
}

/// Pick the stable branch from the configured candidates.
///
/// Tries the hosting API first and falls back to the local remote-tracking
/// ref when the API is unreachable.
async fn detect_stable_branch(
    git: &GitRepo,
    host: &dyn HostService,
    candidates: &[String],
    remote_name: &str,
) -> Result<String> {
    for candidate in candidates {
        match host.branch_exists(candidate).await {
            Ok(true) => return Ok(candidate.clone()),
            Ok(false) => {}
            Err(e) => {
                debug!(error = %e, %candidate, "branch check failed, trying local ref");
                if git
                    .resolve_commit(&format!("{remote_name}/{candidate}"))?
                    .is_some()
                {
                    return Ok(candidate.clone());
                }
            }
        }
    }
    Err(Error::NoStableBranch(candidates.join(", ")))
}
