//! Source provenance entry for the component descriptor

use tracing::info;

use super::GitClient;
use crate::descriptor::{Access, DescriptorBuilder, Label, Source};
use crate::error::{Result, ResultExt};

pub const SOURCE_NAME: &str = "module-sources";
pub const SOURCE_TYPE: &str = "Github";
pub const GIT_REF_LABEL: &str = "git.kyma-project.io/ref";

const GIT_REF: &str = "HEAD";

/// Builds the descriptor source for a module repository.
///
/// The latest commit is resolved once per provider and repository URL, so a
/// packaging run that asks repeatedly only hits the network once.
#[derive(Debug)]
pub struct GitSourceProvider<C> {
    client: C,
    latest: Option<(String, String)>,
}

impl<C: GitClient> GitSourceProvider<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            latest: None,
        }
    }

    /// Latest commit of `repo_url`, memoized
    pub fn latest_commit(&mut self, repo_url: &str) -> Result<String> {
        if let Some((url, commit)) = &self.latest {
            if url == repo_url {
                return Ok(commit.clone());
            }
        }
        let commit = self.client.latest_commit(repo_url)?;
        self.latest = Some((repo_url.to_string(), commit.clone()));
        Ok(commit)
    }

    /// The `module-sources` entry pointing at the latest commit
    pub fn source(&mut self, repo_url: &str, module_version: &str) -> Result<Source> {
        let commit = self
            .latest_commit(repo_url)
            .context("failed to get latest commit")?;

        Ok(Source {
            name: SOURCE_NAME.to_string(),
            version: module_version.to_string(),
            source_type: SOURCE_TYPE.to_string(),
            labels: vec![Label::text(GIT_REF_LABEL, GIT_REF)],
            access: Access::GitHub {
                repo_url: repo_url.to_string(),
                commit,
            },
        })
    }
}

/// Append the repository's source entry to the descriptor
pub fn add_git_source<C: GitClient>(
    provider: &mut GitSourceProvider<C>,
    builder: &mut DescriptorBuilder,
    repo_url: &str,
    module_version: &str,
) -> Result<()> {
    let source = provider.source(repo_url, module_version)?;
    if let Access::GitHub { commit, .. } = &source.access {
        info!(repo = repo_url, commit = %commit, "adding git source");
    }
    builder.add_source(source);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ModulectlError, git};
    use std::cell::Cell;

    struct FakeClient {
        calls: Cell<usize>,
        fail: bool,
    }

    impl FakeClient {
        fn new(fail: bool) -> Self {
            Self {
                calls: Cell::new(0),
                fail,
            }
        }
    }

    impl GitClient for FakeClient {
        fn latest_commit(&self, repo_url: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(git::clone_failed(repo_url, "Network error"));
            }
            Ok(format!("{:040}", self.calls.get()))
        }
    }

    const REPO: &str = "https://github.com/kyma-project/template-operator";

    #[test]
    fn test_adds_exactly_one_source() {
        let mut provider = GitSourceProvider::new(FakeClient::new(false));
        let mut builder = DescriptorBuilder::new("github.com/kyma-project/mod", "1.0.0");

        add_git_source(&mut provider, &mut builder, REPO, "1.0.0").unwrap();

        let sources = builder.sources();
        assert_eq!(sources.len(), 1);
        let source = &sources[0];
        assert_eq!(source.name, "module-sources");
        assert_eq!(source.source_type, "Github");
        assert_eq!(source.version, "1.0.0");
        assert_eq!(source.labels.len(), 1);
        assert_eq!(source.labels[0].name, GIT_REF_LABEL);
        assert_eq!(source.labels[0].as_text(), Some("HEAD"));
        assert_eq!(
            source.access,
            Access::GitHub {
                repo_url: REPO.to_string(),
                commit: format!("{:040}", 1),
            }
        );
    }

    #[test]
    fn test_commit_is_memoized_per_url() {
        let mut provider = GitSourceProvider::new(FakeClient::new(false));
        let first = provider.latest_commit(REPO).unwrap();
        let second = provider.latest_commit(REPO).unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.client.calls.get(), 1);

        provider.latest_commit("https://github.com/kyma-project/other").unwrap();
        assert_eq!(provider.client.calls.get(), 2);
    }

    #[test]
    fn test_failure_is_wrapped() {
        let mut provider = GitSourceProvider::new(FakeClient::new(true));
        let mut builder = DescriptorBuilder::new("github.com/kyma-project/mod", "1.0.0");

        let err = add_git_source(&mut provider, &mut builder, REPO, "1.0.0").unwrap_err();
        assert!(err.to_string().starts_with("failed to get latest commit"));
        assert!(matches!(err.root(), ModulectlError::GitCloneFailed { .. }));
        assert!(builder.sources().is_empty());
    }
}
