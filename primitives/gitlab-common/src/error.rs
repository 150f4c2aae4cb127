//! Errors surfaced to the caller.
//!
//! Setting lookups never show up here: a failed `git config --get` is
//! recovered inside [`crate::settings`] and turns into an absent value.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Fatal failures of a `gitlab-init` run.
#[derive(Debug, Error)]
pub enum Error {
    /// The base URL is empty or does not parse as an absolute URL.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// No API key was given on the command line, in the environment or in git config.
    #[error("no API key configured (pass -k or set `git config gitlab.key`)")]
    MissingApiKey,

    /// The request path could not be joined onto the base URL.
    #[error("invalid request path {path:?}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("request to {path} failed")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("request to {path} returned {status}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },

    /// A local `git` step failed.
    #[error("`git {command}` failed in {dir}: {reason}", dir = .directory.display())]
    LocalInit {
        command: String,
        directory: PathBuf,
        reason: String,
    },
}

impl Error {
    /// Whether the failure happened before anything was sent over the network.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidBaseUrl { .. } | Error::MissingApiKey | Error::InvalidPath { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
