use crate::constants::{config_keys, defaults, env_keys};
use crate::services::env::Env;
use crate::services::proxy::{resolve_proxy_servers, ProxyServers};
use std::time::Duration;

/// Integer values are stored as read; `<= 0` means unset and is replaced by a
/// default only in [`Settings::transport_limits`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub dial_timeout: i64,
    pub keepalive_timeout: i64,
    pub tls_timeout: i64,
    pub concurrent_transfers: i64,
    pub skip_ssl_verify: bool,
    pub proxies: ProxyServers,
}

impl Settings {
    pub fn from_env(os_env: &dyn Env, git_env: &dyn Env) -> Self {
        Self {
            dial_timeout: git_env.int(config_keys::DIAL_TIMEOUT, 0),
            keepalive_timeout: git_env.int(config_keys::KEEPALIVE, 0),
            tls_timeout: git_env.int(config_keys::TLS_TIMEOUT, 0),
            concurrent_transfers: git_env.int(config_keys::CONCURRENT_TRANSFERS, 0),
            skip_ssl_verify: resolve_skip_ssl_verify(os_env, git_env),
            proxies: resolve_proxy_servers(os_env, git_env),
        }
    }

    pub fn transport_limits(&self) -> TransportLimits {
        let concurrency =
            positive_or(self.concurrent_transfers, defaults::CONCURRENT_TRANSFERS as u64);
        TransportLimits {
            concurrency: concurrency as usize,
            dial_timeout: Duration::from_secs(positive_or(
                self.dial_timeout,
                defaults::DIAL_TIMEOUT_SECS,
            )),
            keepalive: Duration::from_secs(positive_or(
                self.keepalive_timeout,
                defaults::KEEPALIVE_SECS,
            )),
            tls_timeout: Duration::from_secs(positive_or(
                self.tls_timeout,
                defaults::TLS_TIMEOUT_SECS,
            )),
        }
    }
}

/// Either source can turn verification off; neither can force it back on.
pub fn resolve_skip_ssl_verify(os_env: &dyn Env, git_env: &dyn Env) -> bool {
    !git_env.bool(config_keys::SSL_VERIFY, true) || os_env.bool(env_keys::SSL_NO_VERIFY, false)
}

/// Prompting stays allowed unless `GIT_TERMINAL_PROMPT` says otherwise.
pub fn resolve_skip_prompt(os_env: &dyn Env) -> bool {
    !os_env.bool(env_keys::TERMINAL_PROMPT, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportLimits {
    pub concurrency: usize,
    pub dial_timeout: Duration,
    pub keepalive: Duration,
    pub tls_timeout: Duration,
}

fn positive_or(value: i64, default: u64) -> u64 {
    if value < 1 {
        default
    } else {
        value as u64
    }
}
