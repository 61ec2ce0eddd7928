// ABOUTME: Application-wide error types for impeller.
// ABOUTME: Uses thiserror and maps every failure onto a small set of kinds.

use std::path::PathBuf;
use thiserror::Error;

use crate::audit::AuditError;
use crate::command::CommandError;
use crate::config::ValueError;
use crate::orchestrator::ReleaseError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cluster config path not set")]
    ConfigPathNotSet,

    #[error("cluster config not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("error decoding config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("kube config is not valid base64: {0}")]
    KubeconfigDecode(#[from] base64::DecodeError),

    #[error("error creating kube config file {path}: {source}")]
    KubeconfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error setting Kubernetes context: {0}")]
    KubeContext(#[source] CommandError),

    #[error("could not get credentials for repo \"{name}\": {source}")]
    RepoCredential { name: String, source: ValueError },

    #[error("could not add repo \"{name}\": {source}")]
    RepoAdd { name: String, source: CommandError },

    #[error("error updating Helm repos: {0}")]
    RepoUpdate(#[source] CommandError),

    #[error("error installing release \"{name}\": {source}")]
    Release { name: String, source: ReleaseError },

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid configuration; raised before any mutation.
    Config,
    /// A value source could not be read.
    Resolution,
    /// The package or control tool failed.
    ExternalTool,
    /// The audit report could not be produced.
    AuditIo,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigPathNotSet
            | Error::ConfigNotFound(_)
            | Error::InvalidConfig(_)
            | Error::ConfigParse { .. }
            | Error::KubeconfigDecode(_)
            | Error::Yaml(_) => ErrorKind::Config,
            Error::RepoCredential { .. } => ErrorKind::Resolution,
            Error::KubeconfigWrite { .. }
            | Error::KubeContext(_)
            | Error::RepoAdd { .. }
            | Error::RepoUpdate(_)
            | Error::Io(_) => ErrorKind::ExternalTool,
            Error::Release { source, .. } => source.kind(),
            Error::Audit(_) => ErrorKind::AuditIo,
        }
    }

    /// Name of the release that failed, if the error belongs to one.
    pub fn release_name(&self) -> Option<&str> {
        match self {
            Error::Release { name, .. } => Some(name),
            _ => None,
        }
    }
}
