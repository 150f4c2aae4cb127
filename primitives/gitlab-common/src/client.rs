//! GET requests against the GitLab API.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::query::QueryParams;
use crate::settings::Settings;

/// Longest response body kept in [`Error::Status`].
pub const MAX_ERROR_BODY: usize = 512;

/// Cuts `body` to at most [`MAX_ERROR_BODY`] bytes on a char boundary.
fn truncate_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push_str("...");
    body
}

/// Status and body of a successful request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Decodes the body as JSON, `None` if it is not the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Option<T> {
        match serde_json::from_str(&self.body) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "response body is not the expected JSON");
                None
            }
        }
    }
}

/// HTTP client bound to one [`Settings`].
#[derive(Debug, Clone)]
pub struct GitlabClient {
    http: Client,
    settings: Settings,
}

impl GitlabClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(Error::Client)?;

        Ok(Self { http, settings })
    }

    /// Builds `<base_url><path>?<query>` with the API key merged into `params`.
    pub fn request_url(&self, path: &str, params: &QueryParams) -> Result<Url> {
        let mut url = self.settings.base_url.join(path)?;
        params
            .with_default_api_key(&self.settings.api_key)
            .apply_to(&mut url);
        Ok(url)
    }

    /// Issues a single GET. Transport errors and non-2xx statuses are errors.
    pub async fn get(&self, path: &str, params: &QueryParams) -> Result<ApiResponse> {
        let url = self.request_url(path, params)?;
        // The query carries the API key; log the path only.
        let shown = url.path().to_string();
        debug!(path = %shown, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| Error::Network {
                path: shown.clone(),
                source: source.without_url(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| Error::Network {
            path: shown.clone(),
            source: source.without_url(),
        })?;

        if !status.is_success() {
            warn!(path = %shown, %status, "request rejected");
            return Err(Error::Status {
                path: shown,
                status,
                body: truncate_body(body),
            });
        }

        debug!(path = %shown, %status, bytes = body.len(), "response received");
        Ok(ApiResponse { status, body })
    }
}
