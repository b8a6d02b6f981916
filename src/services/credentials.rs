use crate::errors::LfsError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    fields: BTreeMap<String, String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.fields {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    pub fn decode(text: &str) -> Self {
        let fields = text
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { fields }
    }
}

#[async_trait]
pub trait CredentialHelper: Send + Sync {
    async fn fill(&self, input: &Credentials) -> Result<Credentials, LfsError>;
    async fn approve(&self, creds: &Credentials) -> Result<(), LfsError>;
    async fn reject(&self, creds: &Credentials) -> Result<(), LfsError>;
}

/// Delegates to `git credential <fill|approve|reject>`.
#[derive(Debug, Clone, Default)]
pub struct CommandCredentialHelper {
    pub skip_prompt: bool,
}

impl CommandCredentialHelper {
    async fn run(&self, operation: &str, input: &Credentials) -> Result<String, LfsError> {
        let mut cmd = Command::new("git");
        cmd.arg("credential")
            .arg(operation)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if self.skip_prompt {
            cmd.env("GIT_TERMINAL_PROMPT", "0");
        }

        let mut child = cmd.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.encode().as_bytes()).await?;
        }
        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let mut message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if self.skip_prompt && operation == "fill" {
                message = format!(
                    "change the GIT_TERMINAL_PROMPT env var to be prompted to enter \
                     your credentials for {}://{}",
                    input.get("protocol").unwrap_or(""),
                    input.get("host").unwrap_or("")
                );
            }
            return Err(LfsError::Credential {
                operation: operation.to_string(),
                message,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl CredentialHelper for CommandCredentialHelper {
    async fn fill(&self, input: &Credentials) -> Result<Credentials, LfsError> {
        let stdout = self.run("fill", input).await?;
        Ok(Credentials::decode(&stdout))
    }

    async fn approve(&self, creds: &Credentials) -> Result<(), LfsError> {
        self.run("approve", creds).await.map(|_| ())
    }

    async fn reject(&self, creds: &Credentials) -> Result<(), LfsError> {
        self.run("reject", creds).await.map(|_| ())
    }
}
