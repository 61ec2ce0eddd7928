// ABOUTME: Error types for release orchestration.
// ABOUTME: One variant per failing step of the per-release state machine.

use std::path::PathBuf;

use crate::command::CommandError;
use crate::error::ErrorKind;

/// Errors that abort a single release (and with it the rest of the run).
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    /// The chart archive URL is unusable.
    #[error("invalid charts source {url}: {reason}")]
    ChartSource { url: String, reason: String },

    /// The download cache could not be created.
    #[error("error creating downloads folder {path}: {source}")]
    Downloads {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error downloading charts: {0}")]
    ChartDownload(#[source] CommandError),

    #[error("error extracting charts archive: {0}")]
    ChartExtract(#[source] CommandError),

    /// `upgrade --install` (or its diff) failed.
    #[error("error running helm: {0}")]
    Install(#[source] CommandError),

    #[error("error rendering chart for kubectl apply: {0}")]
    Render(#[source] CommandError),

    /// Both apply attempts failed.
    #[error("error applying rendered manifests after retry: {0}")]
    ManifestApply(#[source] CommandError),

    #[error("error diffing rendered manifests: {0}")]
    Diff(#[source] CommandError),

    #[error("error waiting for {resource}: {source}")]
    Wait {
        resource: String,
        source: CommandError,
    },

    #[error("error accessing path {path}: {source}")]
    PostApplyPath {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error applying kubectl file {path}: {source}")]
    PostApply {
        path: PathBuf,
        source: CommandError,
    },
}

impl ReleaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReleaseError::ChartSource { .. } | ReleaseError::PostApplyPath { .. } => {
                ErrorKind::Config
            }
            _ => ErrorKind::ExternalTool,
        }
    }

    /// The underlying tool failure, if any.
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            ReleaseError::ChartDownload(e)
            | ReleaseError::ChartExtract(e)
            | ReleaseError::Install(e)
            | ReleaseError::Render(e)
            | ReleaseError::ManifestApply(e)
            | ReleaseError::Diff(e)
            | ReleaseError::Wait { source: e, .. }
            | ReleaseError::PostApply { source: e, .. } => Some(e),
            ReleaseError::ChartSource { .. }
            | ReleaseError::Downloads { .. }
            | ReleaseError::PostApplyPath { .. } => None,
        }
    }
}
