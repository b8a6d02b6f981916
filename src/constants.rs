pub mod defaults {
    pub const CONCURRENT_TRANSFERS: usize = 3;
    pub const DIAL_TIMEOUT_SECS: u64 = 30;
    pub const KEEPALIVE_SECS: u64 = 1_800;
    pub const TLS_TIMEOUT_SECS: u64 = 30;
    pub const REMOTE: &str = "origin";
}

/// Keys read from the version-controlled configuration store.
pub mod config_keys {
    pub const DIAL_TIMEOUT: &str = "lfs.dialtimeout";
    pub const KEEPALIVE: &str = "lfs.keepalive";
    pub const TLS_TIMEOUT: &str = "lfs.tlstimeout";
    pub const CONCURRENT_TRANSFERS: &str = "lfs.concurrenttransfers";
    pub const SSL_VERIFY: &str = "http.sslverify";
    pub const SSL_CA_INFO: &str = "http.sslcainfo";
    pub const SSL_CA_PATH: &str = "http.sslcapath";
    pub const PROXY: &str = "http.proxy";
    pub const LFS_URL: &str = "lfs.url";
}

/// Keys read from the process environment.
pub mod env_keys {
    pub const SSL_NO_VERIFY: &str = "GIT_SSL_NO_VERIFY";
    pub const SSL_CA_INFO: &str = "GIT_SSL_CAINFO";
    pub const SSL_CA_PATH: &str = "GIT_SSL_CAPATH";
    pub const TERMINAL_PROMPT: &str = "GIT_TERMINAL_PROMPT";
    pub const HTTPS_PROXY: &[&str] = &["HTTPS_PROXY", "https_proxy"];
    pub const HTTP_PROXY: &[&str] = &["HTTP_PROXY", "http_proxy"];
    pub const NO_PROXY: &[&str] = &["NO_PROXY", "no_proxy"];
    pub const HOME: &str = "HOME";
    pub const USER_PROFILE: &str = "USERPROFILE";
    pub const LOG_LEVEL: &str = "LFS_LOG_LEVEL";
}

pub mod certs {
    pub const PEM_MARKER: &str = "-----BEGIN CERTIFICATE-----";
    pub const PEM_END_MARKER: &str = "-----END CERTIFICATE-----";
    pub const DIR_EXTENSIONS: &[&str] = &["pem", "crt", "cer"];
}
