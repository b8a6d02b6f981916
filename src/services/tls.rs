use crate::constants::{certs, config_keys, env_keys};
use crate::services::env::Env;
use crate::services::logger::Logger;
use crate::utils::parse::parse_bool_strict;
use base64::Engine;
use reqwest::{Certificate, ClientBuilder};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaSource {
    File(PathBuf),
    Dir(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsPolicy {
    SkipVerify,
    /// Built-in roots plus anything loaded from `ca`.
    Verify { ca: Option<CaSource> },
}

impl TlsPolicy {
    pub fn resolve(
        os_env: &dyn Env,
        git_env: &dyn Env,
        host: &str,
        skip_ssl_verify: bool,
    ) -> Self {
        if is_cert_verification_disabled_for_host(git_env, host, skip_ssl_verify) {
            return TlsPolicy::SkipVerify;
        }
        TlsPolicy::Verify {
            ca: ca_source_for_host(os_env, git_env, host),
        }
    }

    pub fn apply(&self, builder: ClientBuilder, host: &str, logger: &Logger) -> ClientBuilder {
        match self {
            TlsPolicy::SkipVerify => {
                logger.warn(
                    "TLS certificate verification disabled",
                    Some(&serde_json::json!({ "host": host })),
                );
                builder.danger_accept_invalid_certs(true)
            }
            TlsPolicy::Verify { ca: None } => builder,
            TlsPolicy::Verify { ca: Some(source) } => load_certificates(source, logger)
                .into_iter()
                .fold(builder, |b, cert| b.add_root_certificate(cert)),
        }
    }
}

pub fn is_cert_verification_disabled_for_host(
    git_env: &dyn Env,
    host: &str,
    skip_ssl_verify: bool,
) -> bool {
    let prefix = format!("http.https://{}", host);
    let host_verify = [format!("{}/.sslverify", prefix), format!("{}.sslverify", prefix)]
        .iter()
        .find_map(|key| git_env.get(key))
        .and_then(|value| parse_bool_strict(&value));
    match host_verify {
        Some(verify) => !verify,
        None => skip_ssl_verify,
    }
}

pub fn ca_source_for_host(
    os_env: &dyn Env,
    git_env: &dyn Env,
    host: &str,
) -> Option<CaSource> {
    let prefix = format!("http.https://{}", host);
    let file = git_env
        .get(&format!("{}/.sslcainfo", prefix))
        .or_else(|| git_env.get(&format!("{}.sslcainfo", prefix)))
        .or_else(|| os_env.get(env_keys::SSL_CA_INFO))
        .or_else(|| git_env.get(config_keys::SSL_CA_INFO))
        .filter(|v| !v.is_empty());
    if let Some(file) = file {
        return Some(CaSource::File(PathBuf::from(file)));
    }
    os_env
        .get(env_keys::SSL_CA_PATH)
        .or_else(|| git_env.get(config_keys::SSL_CA_PATH))
        .filter(|v| !v.is_empty())
        .map(|dir| CaSource::Dir(PathBuf::from(dir)))
}

fn load_certificates(source: &CaSource, logger: &Logger) -> Vec<Certificate> {
    let files = match source {
        CaSource::File(path) => vec![path.clone()],
        CaSource::Dir(dir) => match std::fs::read_dir(dir) {
            Ok(entries) => {
                let mut files: Vec<PathBuf> = entries
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|path| has_cert_extension(path))
                    .collect();
                files.sort();
                files
            }
            Err(err) => {
                logger.warn(
                    "Unable to read CA directory",
                    Some(&serde_json::json!({ "path": dir, "error": err.to_string() })),
                );
                Vec::new()
            }
        },
    };
    files
        .iter()
        .flat_map(|path| load_pem_file(path, logger))
        .collect()
}

fn has_cert_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| certs::DIR_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_pem_file(path: &Path, logger: &Logger) -> Vec<Certificate> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            logger.warn(
                "Unable to read CA file",
                Some(&serde_json::json!({ "path": path, "error": err.to_string() })),
            );
            return Vec::new();
        }
    };
    let blocks = pem_certificate_blocks(&text);
    if blocks.is_empty() {
        logger.warn(
            "CA file has no usable PEM certificate",
            Some(&serde_json::json!({ "path": path })),
        );
    }
    blocks
        .iter()
        .filter_map(|der| match Certificate::from_der(der) {
            Ok(cert) => Some(cert),
            Err(err) => {
                logger.warn(
                    "Unable to parse CA certificate",
                    Some(&serde_json::json!({ "path": path, "error": err.to_string() })),
                );
                None
            }
        })
        .collect()
}

/// DER bytes of every well-formed `CERTIFICATE` block. Blocks whose body is
/// not base64 or not a DER sequence are dropped.
fn pem_certificate_blocks(text: &str) -> Vec<Vec<u8>> {
    let mut blocks = Vec::new();
    let mut body: Option<String> = None;
    for line in text.lines().map(str::trim) {
        if line == certs::PEM_MARKER {
            body = Some(String::new());
        } else if line == certs::PEM_END_MARKER {
            let Some(encoded) = body.take() else {
                continue;
            };
            match base64::engine::general_purpose::STANDARD.decode(encoded) {
                Ok(der) if der.first() == Some(&0x30) => blocks.push(der),
                _ => {}
            }
        } else if let Some(encoded) = body.as_mut() {
            encoded.push_str(line);
        }
    }
    blocks
}
