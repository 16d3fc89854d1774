//! Common test utilities for modulectl integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const MANIFEST: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: template-operator
spec:
  template:
    spec:
      containers:
        - name: manager
          image: europe-docker.pkg.dev/kyma-project/prod/template-operator:1.0.0
---
apiVersion: v1
kind: Service
metadata:
  name: template-operator
";

pub const DEFAULT_CR: &str = "\
apiVersion: operator.kyma-project.io/v1alpha1
kind: Sample
metadata:
  name: sample-yaml
spec:
  resourceFilePath: ./module-data/yaml
";

/// A temporary module directory plus a local git repository to reference
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub path: PathBuf,
    pub repo_path: PathBuf,
}

impl TestWorkspace {
    /// Create a workspace holding a manifest and a one-commit git repository
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("module");
        std::fs::create_dir_all(&path).expect("Failed to create module directory");
        let repo_path = temp.path().join("repo");
        init_git_repo(&repo_path);

        let workspace = Self {
            temp,
            path,
            repo_path,
        };
        workspace.write_file("manifest.yaml", MANIFEST);
        workspace
    }

    /// Command running the modulectl binary inside the workspace
    #[allow(deprecated)]
    pub fn modulectl(&self) -> Command {
        let mut cmd = Command::cargo_bin("modulectl").expect("Failed to find modulectl binary");
        cmd.current_dir(&self.path)
            .env_remove("MODULECTL_REGISTRY")
            .env_remove("MODULECTL_CREDENTIALS_SELECTOR")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Write a module config pointing at the workspace repository
    pub fn write_config(&self, name: &str, version: &str, channel: &str, extra: &str) {
        let config = format!(
            "name: {name}\n\
             version: {version}\n\
             channel: {channel}\n\
             manifest: manifest.yaml\n\
             repository: {}\n\
             {extra}",
            self.repo_path.display()
        );
        self.write_file("module-config.yaml", &config);
    }

    pub fn write_file(&self, relative: &str, content: &str) {
        let file = self.path.join(relative);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file, content).expect("Failed to write file");
    }

    pub fn read_file(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path.join(relative)).expect("Failed to read file")
    }

    pub fn file_exists(&self, relative: &str) -> bool {
        self.path.join(relative).exists()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize a repository at `path` with a single commit
pub fn init_git_repo(path: &Path) -> String {
    std::fs::create_dir_all(path).expect("Failed to create repository directory");
    let repo = git2::Repository::init(path).expect("Failed to init git repository");
    std::fs::write(path.join("README.md"), "# module\n").expect("Failed to write README");

    let mut index = repo.index().expect("Failed to open index");
    index
        .add_path(Path::new("README.md"))
        .expect("Failed to stage README");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let signature =
        git2::Signature::now("modulectl", "modulectl@example.com").expect("Failed to sign");
    repo.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])
        .expect("Failed to commit")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
        assert!(workspace.file_exists("manifest.yaml"));
        assert!(workspace.repo_path.join(".git").exists());
    }

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("nested/file.txt", "hello");
        assert_eq!(workspace.read_file("nested/file.txt"), "hello");
    }
}
