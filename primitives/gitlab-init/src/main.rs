//! GitLab Init - Upstream Project Initializer
//!
//! Creates an empty Git repository on GitLab and locally. The API root comes
//! from `git config gitlab.url` unless `-u` is given, the API key from
//! `git config gitlab.key` unless `-k` is given.
//!
//! # Usage
//!
//! ```bash
//! # Use the configured server and key
//! git config --global gitlab.url https://gitlab.example.com/api/v3
//! git config --global gitlab.key s3cret
//! gitlab-init my-project
//!
//! # Explicit server, key and local directory
//! gitlab-init -u https://gitlab.example.com/api/v3 -k s3cret -- my-project ./src/my-project
//!
//! # Extra query parameters, remote only
//! gitlab-init -p visibility_level=0 --remote-only my-project
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use gitlab_common::query::parse_key_value;
use gitlab_common::{
    GitConfig, GitlabClient, LocalRepo, Overrides, QueryParams, Settings, init_upstream,
};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Creates a project upstream and a matching local repository.
#[derive(Parser, Debug, Clone)]
#[command(name = "gitlab-init", version)]
#[command(about = "Create an empty Git repository on GitLab and locally")]
struct Args {
    /// GitLab API url (overrides `gitlab.url`).
    #[arg(short = 'u', long = "url", env = "GITLAB_INIT_URL")]
    url: Option<String>,

    /// GitLab API key (overrides `gitlab.key`).
    #[arg(short = 'k', long = "key", env = "GITLAB_INIT_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Extra query parameter as KEY=VALUE (repeatable).
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Request timeout in seconds.
    #[arg(short, long, env = "GITLAB_INIT_TIMEOUT", default_value = "30")]
    timeout: u64,

    /// Only initialize the project upstream.
    #[arg(long)]
    remote_only: bool,

    /// Name of the project to create.
    repository: String,

    /// Local directory (defaults to the repository name).
    directory: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves settings, initializes the project upstream, then locally.
///
/// A relative `<directory>` (or the repository name standing in for it) is
/// taken relative to `workdir`.
async fn run_with(args: Args, git: &GitConfig, workdir: &Path) -> anyhow::Result<()> {
    let overrides = Overrides {
        base_url: args.url,
        api_key: args.key,
        timeout: Some(Duration::from_secs(args.timeout)),
    };

    let settings = Settings::resolve(overrides, git)
        .await
        .context("invalid configuration")?;
    let client = GitlabClient::new(settings)?;

    let extra: QueryParams = args.params.into_iter().collect();
    let project = init_upstream(&client, &args.repository, &extra)
        .await
        .with_context(|| format!("failed to initialize {} upstream", args.repository))?;

    if args.remote_only {
        return Ok(());
    }

    let directory = args
        .directory
        .unwrap_or_else(|| PathBuf::from(&args.repository));
    let repo = LocalRepo::new(workdir.join(directory));
    repo.init().await.context("failed to initialize local repository")?;

    match project.remote_url() {
        Some(remote) => repo
            .add_origin(remote)
            .await
            .context("failed to add origin remote")?,
        None => warn!("server response has no clone URL; origin not configured"),
    }

    info!(directory = %repo.directory().display(), "done");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    // Set up SIGTERM handler so an aborted request still exits non-zero
    let mut sigterm = signal(SignalKind::terminate())?;
    let git_config = GitConfig::new();

    tokio::select! {
        _ = sigterm.recv() => {
            error!("terminated before completion");
            std::process::exit(1);
        }

        result = run_with(args, &git_config, Path::new(".")) => {
            if let Err(e) = result {
                error!(error = %format!("{e:#}"), "gitlab-init failed");
                eprintln!("gitlab-init: {e:#}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
