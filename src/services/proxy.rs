//! Proxy server resolution and per-request proxy selection.
//!
//! Precedence, evaluated once at client construction:
//!
//! - HTTPS proxy: config `http.proxy` when it starts with `https://`, else
//!   `HTTPS_PROXY`, else `https_proxy`.
//! - HTTP proxy: config `http.proxy` (any scheme), else `HTTP_PROXY`, else
//!   `http_proxy`.
//! - Bypass list: `NO_PROXY`, else `no_proxy`.

use crate::constants::{config_keys, env_keys};
use crate::errors::LfsError;
use crate::services::env::Env;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyServers {
    pub https: String,
    pub http: String,
    pub no_proxy: String,
}

pub fn resolve_proxy_servers(os_env: &dyn Env, git_env: &dyn Env) -> ProxyServers {
    let configured = git_env.get(config_keys::PROXY).unwrap_or_default();

    let https = if configured.starts_with("https://") {
        configured.clone()
    } else {
        os_env
            .first_non_empty(env_keys::HTTPS_PROXY)
            .unwrap_or_default()
    };

    let http = if configured.is_empty() {
        os_env
            .first_non_empty(env_keys::HTTP_PROXY)
            .unwrap_or_default()
    } else {
        configured
    };

    let no_proxy = os_env
        .first_non_empty(env_keys::NO_PROXY)
        .unwrap_or_default();

    ProxyServers {
        https,
        http,
        no_proxy,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BypassRule {
    Everything,
    /// `domain` matches itself and its subdomains; `subdomains_only` drops the
    /// exact match (entries written with a leading dot).
    Domain {
        domain: String,
        port: Option<u16>,
        subdomains_only: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoProxy {
    rules: Vec<BypassRule>,
}

impl NoProxy {
    /// Entries are separated by commas and/or whitespace. Each is `*`, a host,
    /// `.domain` / `*.domain`, optionally followed by `:port`.
    pub fn parse(list: &str) -> Self {
        let rules = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_rule)
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn matches(&self, host: &str, port: Option<u16>) -> bool {
        let host = host.trim_end_matches('.').to_lowercase();
        self.rules.iter().any(|rule| match rule {
            BypassRule::Everything => true,
            BypassRule::Domain {
                domain,
                port: rule_port,
                subdomains_only,
            } => {
                if rule_port.is_some() && *rule_port != port {
                    return false;
                }
                let suffix_hit = host.len() > domain.len()
                    && host.ends_with(domain.as_str())
                    && host.as_bytes()[host.len() - domain.len() - 1] == b'.';
                suffix_hit || (!subdomains_only && host == *domain)
            }
        })
    }
}

fn parse_rule(entry: &str) -> BypassRule {
    if entry == "*" {
        return BypassRule::Everything;
    }
    let entry = entry.to_lowercase();
    let (name, port) = split_port(&entry);
    let (name, subdomains_only) = match name.strip_prefix("*.") {
        Some(rest) => (rest, true),
        None => match name.strip_prefix('.') {
            Some(rest) => (rest, true),
            None => (name, false),
        },
    };
    BypassRule::Domain {
        domain: name.trim_end_matches('.').to_string(),
        port,
        subdomains_only,
    }
}

fn split_port(entry: &str) -> (&str, Option<u16>) {
    // Bracketed IPv6 literal, with or without a port.
    if entry.starts_with('[') {
        if let Some(end) = entry.find(']') {
            let port = entry[end + 1..]
                .strip_prefix(':')
                .and_then(|p| p.parse().ok());
            return (&entry[..=end], port);
        }
        return (entry, None);
    }
    match entry.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') => match port.parse() {
            Ok(port) => (name, Some(port)),
            Err(_) => (entry, None),
        },
        _ => (entry, None),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProxySelector {
    https: Option<Url>,
    http: Option<Url>,
    no_proxy: NoProxy,
}

impl ProxySelector {
    pub fn new(servers: &ProxyServers) -> Result<Self, LfsError> {
        Ok(Self {
            https: parse_proxy_url(&servers.https)?,
            http: parse_proxy_url(&servers.http)?,
            no_proxy: NoProxy::parse(&servers.no_proxy),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.https.is_some() || self.http.is_some()
    }

    /// HTTPS targets use the HTTPS proxy, falling back to the HTTP proxy.
    pub fn select(&self, target: &Url) -> Option<Url> {
        let proxy = if target.scheme() == "https" {
            self.https.as_ref().or(self.http.as_ref())
        } else {
            self.http.as_ref()
        }?;
        let host = target.host_str()?;
        if self.no_proxy.matches(host, target.port_or_known_default()) {
            return None;
        }
        Some(proxy.clone())
    }

    pub fn into_reqwest(self) -> reqwest::Proxy {
        reqwest::Proxy::custom(move |target| self.select(target))
    }
}

fn parse_proxy_url(raw: &str) -> Result<Option<Url>, LfsError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    Url::parse(&candidate)
        .map(Some)
        .map_err(|source| LfsError::Proxy {
            url: raw.to_string(),
            source,
        })
}
