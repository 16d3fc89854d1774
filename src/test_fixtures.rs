//! Test fixtures shared by unit tests.
//!
//! ```ignore
//! use crate::test_fixtures::{create_temp_dir, create_git_repo_with_commit};
//!
//! let temp = create_temp_dir();
//! let (temp, repo_path, head) = create_git_repo_with_commit();
//! ```

use std::path::PathBuf;

use tempfile::TempDir;

use crate::files::temp_dir_base;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(temp_dir_base()).expect("Failed to create temp directory")
}

/// Create a git repository holding one commit with a README.
///
/// Returns the `TempDir` (which cleans up on drop), the repository path and
/// the full hash of `HEAD`.
///
/// # Panics
///
/// Panics if the repository cannot be created or committed to.
#[must_use]
pub fn create_git_repo_with_commit() -> (TempDir, PathBuf, String) {
    let temp = create_temp_dir();
    let path = temp.path().to_path_buf();
    let repo = git2::Repository::init(&path).expect("Failed to init git repository");

    std::fs::write(path.join("README.md"), "# module\n").expect("Failed to write README");

    let mut index = repo.index().expect("Failed to open index");
    index
        .add_path(std::path::Path::new("README.md"))
        .expect("Failed to stage README");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");

    let signature =
        git2::Signature::now("modulectl", "modulectl@example.com").expect("Failed to sign");
    let commit = repo
        .commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])
        .expect("Failed to commit");

    (temp, path, commit.to_string())
}
