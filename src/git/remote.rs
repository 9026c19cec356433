//! Transport options for network operations: credentials, progress and proxy.

use super::plumbing::{RemoteOptions, TransferProgress};
use crate::core::{config::DEFAULT_BRANCH, state::Credentials};
use git2::{Cred, Direction, FetchOptions, ProxyOptions, PushOptions, Remote, RemoteCallbacks};

/// Username libgit2 should present: the configured one, else the token itself.
pub fn auth_username(credentials: &Credentials) -> &str {
    if credentials.username.is_empty() {
        &credentials.token
    } else {
        &credentials.username
    }
}

fn callbacks(options: &RemoteOptions) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();

    if let Some(credentials) = options.credentials.as_ref().filter(|c| !c.is_empty()) {
        // libgit2 asks again after a rejection; answer once
        let mut attempted = false;
        callbacks.credentials(move |_url, _username, _allowed| {
            if attempted {
                return Err(git2::Error::from_str("authentication failed"));
            }
            attempted = true;
            Cred::userpass_plaintext(auth_username(credentials), &credentials.token)
        });
    }

    if let Some(on_progress) = options.on_progress.as_ref() {
        callbacks.transfer_progress(move |stats| {
            on_progress(TransferProgress {
                loaded: stats.received_objects() as u64,
                total: Some(stats.total_objects() as u64).filter(|t| *t > 0),
            });
            true
        });
        callbacks.push_transfer_progress(move |current, total, _bytes| {
            on_progress(TransferProgress {
                loaded: current as u64,
                total: Some(total as u64).filter(|t| *t > 0),
            });
        });
    }

    callbacks
}

fn proxy(options: &RemoteOptions) -> ProxyOptions<'_> {
    let mut proxy = ProxyOptions::new();
    if let Some(url) = options.proxy.as_deref() {
        proxy.url(url);
    }
    proxy
}

pub fn fetch_options(options: &RemoteOptions) -> FetchOptions<'_> {
    let mut fetch = FetchOptions::new();
    fetch.remote_callbacks(callbacks(options));
    fetch.proxy_options(proxy(options));
    fetch
}

/// Branch the remote's HEAD points at, without `refs/heads/`.
///
/// `None` for a remote with no branches yet.
pub fn remote_default_branch(
    url: &str,
    options: &RemoteOptions,
) -> Result<Option<String>, git2::Error> {
    let mut remote = Remote::create_detached(url)?;
    let connection =
        remote.connect_auth(Direction::Fetch, Some(callbacks(options)), Some(proxy(options)))?;

    if let Ok(head) = connection.default_branch() {
        if let Some(name) = head.as_str().and_then(|n| n.strip_prefix("refs/heads/")) {
            return Ok(Some(name.to_string()));
        }
    }

    // No HEAD symref advertised: pick a branch at the same commit as HEAD
    let heads = connection.list()?;
    let Some(head_oid) = heads.iter().find(|h| h.name() == "HEAD").map(|h| h.oid()) else {
        return Ok(None);
    };
    let mut candidates: Vec<&str> = heads
        .iter()
        .filter(|h| h.oid() == head_oid)
        .filter_map(|h| h.name().strip_prefix("refs/heads/"))
        .collect();
    candidates.sort_by_key(|name| *name != DEFAULT_BRANCH);
    Ok(candidates.first().map(|name| name.to_string()))
}

/// Push options that turn a rejected ref update into an error.
pub fn push_options(options: &RemoteOptions) -> PushOptions<'_> {
    let mut callbacks = callbacks(options);
    callbacks.push_update_reference(|refname, status| match status {
        Some(message) => Err(git2::Error::from_str(&format!(
            "failed to push {refname}: {message}"
        ))),
        None => Ok(()),
    });

    let mut push = PushOptions::new();
    push.remote_callbacks(callbacks);
    push.proxy_options(proxy(options));
    push
}
