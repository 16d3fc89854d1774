//! Git access for module source provenance
//!
//! This module handles:
//! - Resolving the latest `HEAD` commit of a module's repository
//! - Recording that commit as the descriptor's source
//!
//! Resolution clones into a throw-away bare repository: depth 1 for remote
//! URLs, no working tree. Authentication is delegated to git's native
//! credential system (see [`auth`]).

mod auth;
mod source;
mod url;

pub use source::{
    GIT_REF_LABEL, GitSourceProvider, SOURCE_NAME, SOURCE_TYPE, add_git_source,
};
pub use url::{is_local, normalize_clone_url};

use git2::{ErrorClass, FetchOptions, build::RepoBuilder};
use tempfile::TempDir;
use tracing::debug;

use crate::error::{Result, fs, git};
use crate::files::temp_dir_base;

/// Resolves commits of remote repositories
pub trait GitClient {
    /// Full hash of the commit `HEAD` points to in `repo_url`
    fn latest_commit(&self, repo_url: &str) -> Result<String>;
}

/// [`GitClient`] backed by libgit2
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2Client;

impl GitClient for Git2Client {
    fn latest_commit(&self, repo_url: &str) -> Result<String> {
        let target: TempDir = tempfile::Builder::new()
            .prefix("modulectl-git-")
            .tempdir_in(temp_dir_base())
            .map_err(|e| fs::write_failed(temp_dir_base().display().to_string(), e.to_string()))?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(auth::credential_callbacks());
        if !is_local(repo_url) {
            fetch_options.depth(1);
        }

        let mut builder = RepoBuilder::new();
        builder.bare(true).fetch_options(fetch_options);

        let repo = builder
            .clone(&normalize_clone_url(repo_url), target.path())
            .map_err(|e| git::clone_failed(repo_url, describe_git_error(&e)))?;

        let commit = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| git::ref_resolve_failed("HEAD", e.message()))?;

        let hash = commit.id().to_string();
        debug!(repo = repo_url, commit = %hash, "resolved latest commit");
        Ok(hash)
    }
}

/// Turn a libgit2 error into a short, user-facing reason
fn describe_git_error(err: &git2::Error) -> String {
    let message = err.message().to_lowercase();
    let matches = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    if matches(&["not found", "404", "too many redirects", "authentication replays"]) {
        "Repository not found".to_string()
    } else if matches(&["authentication", "credentials"]) {
        "Authentication failed".to_string()
    } else if matches(&["permission denied", "access denied"]) {
        "Permission denied".to_string()
    } else if matches(&["connection", "network", "timeout", "timed out"]) {
        "Network error".to_string()
    } else {
        match err.class() {
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        }
    }
}
