//! Credentials for fetching module repositories
//!
//! modulectl never stores credentials. Each request is answered from git's
//! own sources, tried in order:
//! - the default credential (Kerberos / NTLM)
//! - the SSH agent, then keys in `~/.ssh/`
//! - configured credential helpers
//! - anonymous access

use git2::{Cred, CredentialType, ErrorClass, ErrorCode, RemoteCallbacks};

const SSH_KEY_NAMES: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

fn auth_error(message: &str) -> git2::Error {
    git2::Error::new(ErrorCode::Auth, ErrorClass::Http, message)
}

fn ssh_key_from_home(username: &str) -> Result<Cred, git2::Error> {
    let ssh_dir = dirs::home_dir().unwrap_or_default().join(".ssh");

    SSH_KEY_NAMES
        .iter()
        .map(|name| (ssh_dir.join(name), ssh_dir.join(format!("{name}.pub"))))
        .filter(|(private_key, _)| private_key.exists())
        .find_map(|(private_key, public_key)| {
            let public_key = public_key.exists().then_some(public_key.as_path());
            Cred::ssh_key(username, public_key, &private_key, None).ok()
        })
        .ok_or_else(|| auth_error("no usable SSH key in ~/.ssh"))
}

fn ssh_credentials(username: Option<&str>) -> Result<Cred, git2::Error> {
    let username = username.unwrap_or("git");
    Cred::ssh_key_from_agent(username).or_else(|_| ssh_key_from_home(username))
}

fn helper_credentials(url: &str, username: Option<&str>) -> Result<Cred, git2::Error> {
    let config = git2::Config::open_default().or_else(|_| git2::Config::new())?;
    Cred::credential_helper(&config, url, username)
        .or_else(|_| Cred::userpass_plaintext(username.unwrap_or("anonymous"), ""))
}

/// Remote callbacks answering credential requests from git's native sources
pub fn credential_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|url, username, allowed| {
        if allowed.contains(CredentialType::DEFAULT) {
            Cred::default()
        } else if allowed.contains(CredentialType::SSH_KEY) {
            ssh_credentials(username)
        } else if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            helper_credentials(url, username)
        } else {
            Err(auth_error("authentication failed"))
        }
    });
    callbacks
}
