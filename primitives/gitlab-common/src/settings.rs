//! Settings read from git configuration and merged with overrides.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::base_url::BaseUrl;
use crate::error::{Error, Result};

/// Git config key holding the API root.
pub const URL_SETTING: &str = "gitlab.url";

/// Git config key holding the API key.
pub const KEY_SETTING: &str = "gitlab.key";

/// Used when neither an override nor `gitlab.url` is set.
pub const DEFAULT_BASE_URL: &str = "http://gitlab.com/api/v3/";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads single values through `git config --get`.
#[derive(Debug, Clone)]
pub struct GitConfig {
    program: OsString,
    file: Option<PathBuf>,
    working_dir: Option<PathBuf>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: OsString::from("git"),
            file: None,
            working_dir: None,
        }
    }
}

#[derive(Debug)]
enum LookupError {
    Spawn(std::io::Error),
    Exit(Option<i32>),
}

impl GitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses another executable in place of `git`.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Reads from a single config file (`git config --file`) instead of the
    /// usual system/global/local cascade.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn build_command(&self, name: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("config");

        if let Some(ref file) = self.file {
            cmd.arg("--file").arg(file);
        }

        cmd.arg("--get").arg(name);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd
    }

    async fn lookup(&self, name: &str) -> std::result::Result<String, LookupError> {
        let output = self
            .build_command(name)
            .output()
            .await
            .map_err(LookupError::Spawn)?;

        if !output.status.success() {
            return Err(LookupError::Exit(output.status.code()));
        }

        let value = String::from_utf8_lossy(&output.stdout).into_owned();
        let value = value
            .strip_suffix('\n')
            .map(|v| v.strip_suffix('\r').unwrap_or(v))
            .unwrap_or(value.as_str());
        Ok(value.to_string())
    }

    /// Returns the value of `name`, or `None` when it is unset or git could
    /// not be run.
    pub async fn get(&self, name: &str) -> Option<String> {
        match self.lookup(name).await {
            Ok(value) => Some(value),
            Err(LookupError::Exit(code)) => {
                debug!(setting = name, ?code, "setting not found");
                None
            }
            Err(LookupError::Spawn(e)) => {
                debug!(setting = name, error = %e, "could not run git config");
                None
            }
        }
    }

    /// Like [`GitConfig::get`], falling back to `fallback`.
    pub async fn get_or(&self, name: &str, fallback: &str) -> String {
        self.get(name)
            .await
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Values given explicitly on the command line or through the environment.
/// Each one wins over the matching git setting.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
}

/// Resolved configuration for one run.
#[derive(Clone)]
pub struct Settings {
    pub base_url: BaseUrl,
    pub api_key: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    pub fn new(base_url: BaseUrl, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Merges `overrides`, git config and defaults.
    ///
    /// Git is only consulted for values the overrides leave unset.
    pub async fn resolve(overrides: Overrides, git: &GitConfig) -> Result<Self> {
        let raw_url = match overrides.base_url {
            Some(url) => url,
            None => git.get_or(URL_SETTING, DEFAULT_BASE_URL).await,
        };
        let base_url = BaseUrl::parse(&raw_url)?;

        let api_key = match overrides.api_key {
            Some(key) => Some(key),
            None => git.get(KEY_SETTING).await,
        }
        .filter(|key| !key.trim().is_empty())
        .ok_or(Error::MissingApiKey)?;

        let settings = Self {
            base_url,
            api_key,
            timeout: overrides.timeout.unwrap_or(DEFAULT_TIMEOUT),
        };
        info!(base_url = %settings.base_url, timeout = ?settings.timeout, "resolved settings");
        Ok(settings)
    }
}
