use crate::errors::{LfsError, RequestError};
use crate::managers::response::{handle_response, Response};
use crate::services::credentials::{CommandCredentialHelper, CredentialHelper};
use crate::services::endpoint::{EndpointFinder, GitEndpointFinder};
use crate::services::env::{Env, MapEnv};
use crate::services::logger::Logger;
use crate::services::netrc::{Netrc, NetrcFinder};
use crate::services::proxy::ProxySelector;
use crate::services::settings::{resolve_skip_prompt, Settings};
use crate::services::tls::TlsPolicy;
use reqwest::Request;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

/// Holds one configured `reqwest::Client` per destination host, built on the
/// first request to that host and reused afterwards.
pub struct Client {
    endpoints: Arc<dyn EndpointFinder>,
    credentials: Arc<dyn CredentialHelper>,
    netrc: Arc<dyn NetrcFinder>,
    settings: Settings,
    logger: Logger,
    host_clients: Mutex<HashMap<String, Arc<reqwest::Client>>>,
    os_env: Arc<dyn Env>,
    git_env: Arc<dyn Env>,
}

impl Client {
    /// Absent sources are replaced by an empty environment.
    ///
    /// Fails only when the netrc file exists but cannot be read or parsed.
    pub fn new(
        os_env: Option<Arc<dyn Env>>,
        git_env: Option<Arc<dyn Env>>,
    ) -> Result<Self, LfsError> {
        let os_env = os_env.unwrap_or_else(|| Arc::new(MapEnv::new()) as Arc<dyn Env>);
        let git_env = git_env.unwrap_or_else(|| Arc::new(MapEnv::new()) as Arc<dyn Env>);
        let logger = Logger::from_env("lfsapi", os_env.as_ref());
        Self::with_logger(os_env, git_env, logger)
    }

    pub fn with_logger(
        os_env: Arc<dyn Env>,
        git_env: Arc<dyn Env>,
        logger: Logger,
    ) -> Result<Self, LfsError> {
        let logger = logger.child("client");
        let netrc = Netrc::from_env(os_env.as_ref())?;
        let settings = Settings::from_env(os_env.as_ref(), git_env.as_ref());
        let credentials = CommandCredentialHelper {
            skip_prompt: resolve_skip_prompt(os_env.as_ref()),
        };

        logger.debug(
            "client configured",
            Some(&serde_json::json!({
                "https_proxy": !settings.proxies.https.is_empty(),
                "http_proxy": !settings.proxies.http.is_empty(),
                "no_proxy": settings.proxies.no_proxy.as_str(),
                "skip_ssl_verify": settings.skip_ssl_verify,
                "skip_prompt": credentials.skip_prompt,
            })),
        );

        Ok(Self {
            endpoints: Arc::new(GitEndpointFinder::new(git_env.clone())),
            credentials: Arc::new(credentials),
            netrc: Arc::new(netrc),
            settings,
            logger,
            host_clients: Mutex::new(HashMap::new()),
            os_env,
            git_env,
        })
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialHelper>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Arc<dyn EndpointFinder>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_netrc(mut self, netrc: Arc<dyn NetrcFinder>) -> Self {
        self.netrc = netrc;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn endpoints(&self) -> &dyn EndpointFinder {
        self.endpoints.as_ref()
    }

    pub fn credentials(&self) -> &dyn CredentialHelper {
        self.credentials.as_ref()
    }

    pub fn netrc(&self) -> &dyn NetrcFinder {
        self.netrc.as_ref()
    }

    /// Transport failures carry no response. Failures after a response was
    /// received (error statuses, undecodable error bodies) keep it.
    pub async fn execute(&self, request: Request) -> Result<Response, RequestError> {
        let method = request.method().clone();
        let url = request.url().clone();
        let client = self.http_client(&host_key(&url))?;

        let inner = match client.execute(request).await {
            Ok(inner) => inner,
            Err(err) => {
                self.logger.debug(
                    "transport failure",
                    Some(&serde_json::json!({
                        "method": method.as_str(),
                        "url": url.as_str(),
                        "error": err.to_string(),
                    })),
                );
                return Err(RequestError::new(LfsError::Transport(err)));
            }
        };

        let mut response = Response::new(method, url, inner);
        match handle_response(&mut response).await {
            Ok(()) => Ok(response),
            Err(err) => Err(RequestError::with_response(err, response)),
        }
    }

    /// Construction happens while the cache lock is held, so concurrent
    /// callers for one host never build two clients.
    pub fn http_client(&self, host: &str) -> Result<Arc<reqwest::Client>, LfsError> {
        let mut clients = self
            .host_clients
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        if let Some(existing) = clients.get(host) {
            return Ok(existing.clone());
        }
        let client = Arc::new(self.build_http_client(host)?);
        clients.insert(host.to_string(), client.clone());
        Ok(client)
    }

    pub fn cached_hosts(&self) -> Vec<String> {
        let clients = self
            .host_clients
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let mut hosts: Vec<String> = clients.keys().cloned().collect();
        hosts.sort();
        hosts
    }

    pub fn tls_policy(&self, host: &str) -> TlsPolicy {
        TlsPolicy::resolve(
            self.os_env.as_ref(),
            self.git_env.as_ref(),
            host,
            self.settings.skip_ssl_verify,
        )
    }

    fn build_http_client(&self, host: &str) -> Result<reqwest::Client, LfsError> {
        let limits = self.settings.transport_limits();
        let proxy = ProxySelector::new(&self.settings.proxies)?;
        let policy = self.tls_policy(host);

        self.logger.debug(
            "building host client",
            Some(&serde_json::json!({
                "host": host,
                "concurrency": limits.concurrency,
                "dial_timeout_secs": limits.dial_timeout.as_secs(),
                "keepalive_secs": limits.keepalive.as_secs(),
                "tls_timeout_secs": limits.tls_timeout.as_secs(),
                "proxy": proxy.is_configured(),
                "skip_verify": policy == TlsPolicy::SkipVerify,
            })),
        );

        // reqwest's connect timeout spans both the TCP dial and the TLS handshake.
        let builder = reqwest::Client::builder()
            .proxy(proxy.into_reqwest())
            .connect_timeout(limits.dial_timeout + limits.tls_timeout)
            .tcp_keepalive(limits.keepalive)
            .pool_max_idle_per_host(limits.concurrency);

        policy
            .apply(builder, host, &self.logger)
            .build()
            .map_err(|source| LfsError::Build {
                host: host.to_string(),
                source,
            })
    }
}

/// Cache key for a request: host, plus `:port` when the URL names one.
pub fn host_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
