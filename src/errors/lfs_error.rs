use reqwest::Method;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 401: credentials are missing or wrong.
    Auth,
    /// Server-side failure the transfer should not continue past.
    Fatal,
    Other,
}

#[derive(Debug, Error)]
pub enum LfsError {
    #[error("bad netrc file {path} (line {line}): {message}")]
    Netrc {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to read netrc file {path}: {source}")]
    NetrcIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid proxy URL {url}: {source}")]
    Proxy {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client for {host}: {source}")]
    Build {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Unable to parse HTTP response for {method} {url}: {source}")]
    Decode {
        method: Method,
        url: Url,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unable to read HTTP response for {method} {url}: {source}")]
    ReadBody {
        method: Method,
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP response body for {method} {url} was already consumed")]
    BodyConsumed { method: Method, url: Url },

    #[error("{message}")]
    Http {
        status: u16,
        class: ErrorClass,
        message: String,
    },

    /// A failed status whose error body could not be read or decoded.
    #[error("{source}")]
    Status {
        status: u16,
        class: ErrorClass,
        #[source]
        source: Box<LfsError>,
    },

    #[error("credential helper `git credential {operation}` failed: {message}")]
    Credential { operation: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LfsError {
    pub fn class(&self) -> ErrorClass {
        match self {
            LfsError::Http { class, .. } | LfsError::Status { class, .. } => *class,
            _ => ErrorClass::Other,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.class() == ErrorClass::Auth
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LfsError::Transport(err) if err.is_timeout())
    }
}
