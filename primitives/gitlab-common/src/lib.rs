//! Shared logic for the `gitlab-init` primitive.
//!
//! Reads the GitLab API root from git configuration, normalizes it and issues
//! the request that initializes a project upstream.

pub mod base_url;
pub mod client;
pub mod error;
pub mod local;
pub mod query;
pub mod settings;

pub use base_url::{BaseUrl, normalize_base_url};
pub use client::{ApiResponse, GitlabClient};
pub use error::{Error, Result};
pub use local::{LocalRepo, ProjectInfo};
pub use query::QueryParams;
pub use settings::{GitConfig, Overrides, Settings};

use tracing::info;

/// API path used to initialize a project.
pub const PROJECTS_PATH: &str = "projects";

/// Asks the server to initialize project `name`.
///
/// `extra` is merged in first, so a `name` inside it is replaced by `name`.
/// The decoded project description is empty when the server does not answer
/// with one.
pub async fn init_upstream(
    client: &GitlabClient,
    name: &str,
    extra: &QueryParams,
) -> Result<ProjectInfo> {
    let params = extra.clone().with("name", name);
    let response = client.get(PROJECTS_PATH, &params).await?;

    let project = response.json::<ProjectInfo>().unwrap_or_default();
    info!(
        project = name,
        status = %response.status,
        web_url = project.web_url.as_deref().unwrap_or("-"),
        "upstream project initialized"
    );
    Ok(project)
}
