//! Repository detection from git remote URLs.

use crate::error::{Error, Result};
use crate::types::HostConfig;
use url::Url;

/// Parse the repository identity out of a GitHub remote URL.
///
/// Supports https, ssh:// and scp-style URLs. A host other than github.com
/// is accepted only when it matches the `GITHUB_HOST` environment variable
/// (GitHub Enterprise); it is then carried in [`HostConfig::host`].
pub fn parse_repo_info(remote_url: &str) -> Result<HostConfig> {
    let (host, path) = split_remote_url(remote_url).ok_or(Error::NoSupportedRemotes)?;

    let enterprise = github_enterprise_host();
    let is_github = host == "github.com" || enterprise.as_deref() == Some(host.as_str());
    if !is_github {
        return Err(Error::NoSupportedRemotes);
    }

    let (owner, repo) = split_owner_repo(&path).ok_or(Error::NoSupportedRemotes)?;
    Ok(HostConfig {
        owner,
        repo,
        host: (host != "github.com").then_some(host),
    })
}

fn github_enterprise_host() -> Option<String> {
    std::env::var("GITHUB_HOST").ok().filter(|h| !h.is_empty())
}

/// Split a remote URL into host and repository path.
fn split_remote_url(remote_url: &str) -> Option<(String, String)> {
    let trimmed = remote_url.trim().trim_end_matches('/');

    // scp-style: git@host:owner/repo(.git)
    if let Some(rest) = trimmed.strip_prefix("git@") {
        let (host, path) = rest.split_once(':')?;
        return Some((host.to_string(), path.to_string()));
    }

    let url = Url::parse(trimmed).ok()?;
    let host = url.host_str()?.to_string();
    Some((host, url.path().trim_start_matches('/').to_string()))
}

/// Split "owner/repo(.git)" into its parts. GitHub paths are exactly two
/// segments deep.
fn split_owner_repo(path: &str) -> Option<(String, String)> {
    let path = path.trim_matches('/');
    let (owner, repo) = path.split_once('/')?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_ssh_without_git_extension() {
        let config = parse_repo_info("git@github.com:owner/repo").unwrap();
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
        assert!(config.host.is_none());
    }

    #[test]
    fn github_https_with_git_extension() {
        let config = parse_repo_info("https://github.com/owner/repo.git").unwrap();
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
    }

    #[test]
    fn github_ssh_scheme_url() {
        let config = parse_repo_info("ssh://git@github.com/owner/repo.git").unwrap();
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = parse_repo_info("https://github.com/owner/repo///").unwrap();
        assert_eq!(config.owner, "owner");
        assert_eq!(config.repo, "repo");
    }

    #[test]
    fn unknown_host_is_rejected() {
        let result = parse_repo_info("https://bitbucket.org/owner/repo.git");
        assert!(matches!(result, Err(Error::NoSupportedRemotes)));
    }

    #[test]
    fn nested_path_is_rejected() {
        let result = parse_repo_info("https://github.com/group/subgroup/repo.git");
        assert!(matches!(result, Err(Error::NoSupportedRemotes)));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = parse_repo_info("not-a-valid-url");
        assert!(matches!(result, Err(Error::NoSupportedRemotes)));
    }

    // GitHub Enterprise detection reads GITHUB_HOST, and mutating env vars
    // is unsafe in edition 2024; the github.com paths above cover the parser.
}
