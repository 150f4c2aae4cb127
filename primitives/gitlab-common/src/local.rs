//! Local repository setup after the project exists upstream.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Clone URLs reported by the API for a freshly created project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectInfo {
    pub id: Option<u64>,
    pub web_url: Option<String>,
    pub ssh_url_to_repo: Option<String>,
    pub http_url_to_repo: Option<String>,
}

impl ProjectInfo {
    /// SSH is preferred over HTTP.
    pub fn remote_url(&self) -> Option<&str> {
        self.ssh_url_to_repo
            .as_deref()
            .or(self.http_url_to_repo.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Runs `git init` and `git remote add` for the new project.
#[derive(Debug, Clone)]
pub struct LocalRepo {
    program: OsString,
    directory: PathBuf,
}

impl LocalRepo {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            program: OsString::from("git"),
            directory: directory.into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn run(&self, args: &[&OsStr], cwd: Option<&Path>) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let command = args
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(command = %command, "running git");

        let output = cmd.output().await.map_err(|e| Error::LocalInit {
            command: command.clone(),
            directory: self.directory.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(Error::LocalInit {
                command,
                directory: self.directory.clone(),
                reason: format!("exit {code}: {stderr}"),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// `git init <directory>`. Re-running on an existing repository is harmless.
    pub async fn init(&self) -> Result<()> {
        let args = [
            OsStr::new("init"),
            OsStr::new("--quiet"),
            self.directory.as_os_str(),
        ];
        self.run(&args, None).await?;
        info!(directory = %self.directory.display(), "initialized local repository");
        Ok(())
    }

    /// Adds `url` as the `origin` remote.
    pub async fn add_origin(&self, url: &str) -> Result<()> {
        let args = ["remote", "add", "origin", url].map(OsStr::new);
        self.run(&args, Some(self.directory.as_path())).await?;
        info!(remote = url, "added origin");
        Ok(())
    }

    #[cfg(test)]
    async fn origin(&self) -> Option<String> {
        let args = ["remote", "get-url", "origin"].map(OsStr::new);
        self.run(&args, Some(self.directory.as_path()))
            .await
            .ok()
            .map(|url| url.trim().to_string())
    }
}
