use crate::constants::{config_keys, defaults};
use crate::services::env::Env;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub operation: String,
}

pub trait EndpointFinder: Send + Sync {
    /// `None` when nothing in the configuration points at an LFS server.
    fn endpoint(&self, operation: &str, remote: Option<&str>) -> Option<Endpoint>;
}

#[derive(Clone)]
pub struct GitEndpointFinder {
    git_env: Arc<dyn Env>,
}

impl GitEndpointFinder {
    pub fn new(git_env: Arc<dyn Env>) -> Self {
        Self { git_env }
    }
}

impl EndpointFinder for GitEndpointFinder {
    fn endpoint(&self, operation: &str, remote: Option<&str>) -> Option<Endpoint> {
        let remote = remote.filter(|r| !r.is_empty()).unwrap_or(defaults::REMOTE);
        let env = self.git_env.as_ref();
        let operation_key = format!("lfs.{}url", operation);
        let remote_key = format!("remote.{}.lfsurl", remote);
        let url = env
            .first_non_empty(&[
                operation_key.as_str(),
                config_keys::LFS_URL,
                remote_key.as_str(),
            ])
            .or_else(|| {
                env.get(&format!("remote.{}.url", remote))
                    .and_then(|raw| lfs_url_from_remote(&raw))
            })?;
        Some(Endpoint {
            url,
            operation: operation.to_string(),
        })
    }
}

/// `https://host/repo` -> `https://host/repo.git/info/lfs`.
fn lfs_url_from_remote(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return None;
    }
    if trimmed.ends_with(".git") {
        Some(format!("{}/info/lfs", trimmed))
    } else {
        Some(format!("{}.git/info/lfs", trimmed))
    }
}
