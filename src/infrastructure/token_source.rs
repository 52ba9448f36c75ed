// OAuth access tokens via a static token or the gcloud CLI
use anyhow::{Context, Result};
use tokio::process::Command;
use tokio::sync::RwLock;

#[derive(Debug)]
pub struct TokenSource {
    /// Cleared by a successful `login`, after which `token_command` is used
    static_token: RwLock<Option<String>>,
    token_command: String,
    login_command: String,
}

impl TokenSource {
    pub fn new(static_token: Option<String>, token_command: String, login_command: String) -> Self {
        Self {
            static_token: RwLock::new(static_token),
            token_command,
            login_command,
        }
    }

    pub async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.static_token.read().await.clone() {
            return Ok(token);
        }

        let (program, args) = split_command(&self.token_command)?;
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .with_context(|| format!("Failed to run '{}'", self.token_command))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("'{}' failed with {}: {}", self.token_command, output.status, stderr.trim());
        }

        let token = String::from_utf8(output.stdout)
            .context("Access token is not valid UTF-8")?
            .trim()
            .to_string();
        if token.is_empty() {
            anyhow::bail!("'{}' printed no access token", self.token_command);
        }
        Ok(token)
    }

    /// Run the interactive login flow with the terminal attached.
    pub async fn login(&self) -> Result<()> {
        let (program, args) = split_command(&self.login_command)?;
        tracing::info!("Starting interactive login: {}", self.login_command);

        let status = Command::new(program)
            .args(args)
            .status()
            .await
            .with_context(|| format!("Failed to run '{}'", self.login_command))?;

        if !status.success() {
            anyhow::bail!("'{}' exited with {}", self.login_command, status);
        }

        if self.static_token.write().await.take().is_some() {
            tracing::info!("Discarding configured access token in favour of the login session");
        }
        Ok(())
    }
}

fn split_command(command: &str) -> Result<(&str, Vec<&str>)> {
    let mut parts = command.split_whitespace();
    let program = parts.next().context("Empty command")?;
    Ok((program, parts.collect()))
}
