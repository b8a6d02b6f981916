use crate::constants::env_keys;
use crate::errors::LfsError;
use crate::services::env::Env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetrcMachine {
    /// `None` for the `default` entry.
    pub name: Option<String>,
    pub login: String,
    pub password: String,
    pub account: String,
}

pub trait NetrcFinder: Send + Sync {
    fn find_machine(&self, host: &str) -> Option<&NetrcMachine>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netrc {
    machines: Vec<NetrcMachine>,
}

impl Netrc {
    /// Loads the user's netrc file. A missing file or home directory is empty.
    pub fn from_env(os_env: &dyn Env) -> Result<Self, LfsError> {
        let Some(path) = netrc_path(os_env) else {
            return Ok(Self::default());
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text, &path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(LfsError::NetrcIo { path, source }),
        }
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, LfsError> {
        let fail = |line: usize, message: String| LfsError::Netrc {
            path: path.to_path_buf(),
            line,
            message,
        };

        let mut machines: Vec<NetrcMachine> = Vec::new();
        let mut in_macro = false;
        let mut pending: Option<(&str, usize)> = None;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if in_macro {
                if line.trim().is_empty() {
                    in_macro = false;
                }
                continue;
            }
            for token in line.split_whitespace() {
                if token.starts_with('#') {
                    break;
                }
                if let Some((keyword, _)) = pending.take() {
                    match keyword {
                        "machine" => machines.push(NetrcMachine {
                            name: Some(token.to_string()),
                            ..NetrcMachine::default()
                        }),
                        "macdef" => in_macro = true,
                        field => {
                            let Some(current) = machines.last_mut() else {
                                let message = format!("`{}` before any machine", field);
                                return Err(fail(line_no, message));
                            };
                            let value = token.to_string();
                            match field {
                                "login" => current.login = value,
                                "password" => current.password = value,
                                _ => current.account = value,
                            }
                        }
                    }
                    if in_macro {
                        break;
                    }
                    continue;
                }
                match token {
                    "default" => machines.push(NetrcMachine::default()),
                    "machine" | "login" | "password" | "account" | "macdef" => {
                        pending = Some((token, line_no));
                    }
                    other => return Err(fail(line_no, format!("unexpected token `{}`", other))),
                }
            }
        }

        if let Some((keyword, line)) = pending {
            return Err(fail(line, format!("missing value for `{}`", keyword)));
        }
        Ok(Self { machines })
    }

    pub fn machines(&self) -> &[NetrcMachine] {
        &self.machines
    }
}

impl NetrcFinder for Netrc {
    /// Exact hostname match first, then the `default` entry. Any port is ignored.
    fn find_machine(&self, host: &str) -> Option<&NetrcMachine> {
        let host = strip_port(host);
        self.machines
            .iter()
            .find(|m| m.name.as_deref() == Some(host))
            .or_else(|| self.machines.iter().find(|m| m.name.is_none()))
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.split(']').next().map(|h| &h[1..]).unwrap_or(host);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

fn netrc_path(os_env: &dyn Env) -> Option<PathBuf> {
    let home = os_env
        .get(env_keys::HOME)
        .filter(|h| !h.is_empty())
        .or_else(|| os_env.get(env_keys::USER_PROFILE).filter(|h| !h.is_empty()))?;
    let name = if cfg!(windows) { "_netrc" } else { ".netrc" };
    Some(PathBuf::from(home).join(name))
}
