//! Remote URL handling for libgit2
//!
//! libgit2 does not accept SCP-style SSH remotes (`git@host:org/repo`) and
//! mis-resolves relative `file://` URLs, so both are rewritten before cloning.

use std::borrow::Cow;
use std::path::Path;

/// Rewrite a remote URL into a form libgit2 can clone
pub fn normalize_clone_url(url: &str) -> Cow<'_, str> {
    if let Some(normalized) = scp_to_ssh(url) {
        return Cow::Owned(normalized);
    }
    if let Some(normalized) = absolute_file_url(url) {
        return Cow::Owned(normalized);
    }
    Cow::Borrowed(url)
}

/// Whether the remote lives on the local file system.
///
/// Shallow fetches are not supported by libgit2's local transport.
pub fn is_local(url: &str) -> bool {
    url.starts_with("file://") || Path::new(url).is_absolute()
}

fn scp_to_ssh(url: &str) -> Option<String> {
    let rest = url.strip_prefix("git@")?;
    let (host, path) = rest.split_once(':')?;
    let path = path.trim_start_matches('/');
    Some(format!("ssh://git@{host}/{path}"))
}

#[cfg(not(windows))]
fn absolute_file_url(url: &str) -> Option<String> {
    let path = url.strip_prefix("file://")?;
    if path.starts_with('/') {
        return None;
    }
    Some(format!("file:///{}", path.replace('\\', "/")))
}

#[cfg(windows)]
fn absolute_file_url(_url: &str) -> Option<String> {
    None
}
