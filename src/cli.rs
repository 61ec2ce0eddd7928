// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Every flag also reads its environment variable, with CI plugin-style fallbacks.

use std::path::PathBuf;

use clap::Parser;
use impeller::audit::DEFAULT_AUDIT_FILE;
use impeller::error::{Error, Result};

/// Prefixes CI systems put in front of plugin settings.
const FALLBACK_PREFIXES: &[&str] = &["PLUGIN_", "PARAMETER_"];

#[derive(Debug, Parser)]
#[command(name = "impeller")]
#[command(about = "Apply a cluster's addon releases with helm and kubectl")]
#[command(version)]
pub struct Cli {
    /// Cluster config file, or the directory of cluster configs in audit mode
    #[arg(long, env = "CLUSTER_CONFIG")]
    pub cluster_config_path: Option<PathBuf>,

    /// Value files applied to every release, comma separated
    #[arg(long, env = "VALUE_FILES", value_delimiter = ',')]
    pub value_files: Vec<String>,

    /// Kubeconfig contents to write before installing
    #[arg(long, env = "KUBE_CONFIG", hide_env_values = true)]
    pub kube_config: Option<String>,

    /// The kubeconfig contents are base64 encoded
    #[arg(long, env = "KUBE_CONFIG_BASE64")]
    pub kube_config_base64: bool,

    /// Kubernetes context to use
    #[arg(long, env = "KUBE_CONTEXT")]
    pub kube_context: Option<String>,

    /// Render and validate without changing the cluster
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// Show what would change instead of installing
    #[arg(long, env = "DIFF_RUN")]
    pub diff_run: bool,

    /// Write an audit report of every cluster config instead of installing
    #[arg(long, env = "AUDIT_RUN")]
    pub audit: bool,

    /// Audit report destination
    #[arg(long, env = "AUDIT_FILE_NAME")]
    pub audit_file: Option<PathBuf>,

    /// Package tool binary
    #[arg(long, env = "HELM_BIN", default_value = "helm")]
    pub helm_bin: String,

    /// Control tool binary
    #[arg(long, env = "KUBECTL_BIN", default_value = "kubectl")]
    pub kubectl_bin: String,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON events
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Fill settings left unset from `PLUGIN_<NAME>` / `PARAMETER_<NAME>`.
    pub fn with_env_fallbacks(mut self) -> Self {
        if self.cluster_config_path.is_none() {
            self.cluster_config_path = fallback_env("CLUSTER_CONFIG").map(PathBuf::from);
        }
        if self.value_files.is_empty() {
            self.value_files = fallback_env("VALUE_FILES")
                .map(|files| files.split(',').map(str::to_string).collect())
                .unwrap_or_default();
        }
        if self.kube_config.is_none() {
            self.kube_config = fallback_env("KUBE_CONFIG");
        }
        if self.kube_context.is_none() {
            self.kube_context = fallback_env("KUBE_CONTEXT");
        }
        if self.audit_file.is_none() {
            self.audit_file = fallback_env("AUDIT_FILE_NAME").map(PathBuf::from);
        }
        self.kube_config_base64 |= fallback_flag("KUBE_CONFIG_BASE64");
        self.dry_run |= fallback_flag("DRY_RUN");
        self.diff_run |= fallback_flag("DIFF_RUN");
        self.audit |= fallback_flag("AUDIT_RUN");
        self
    }

    /// Check settings that depend on each other or on the CI environment.
    pub fn validate(&self) -> Result<()> {
        if self.cluster_config_path.is_none() {
            return Err(Error::ConfigPathNotSet);
        }
        if self.audit {
            return Ok(());
        }
        if is_drone() {
            if self.kube_config.as_deref().is_none_or(str::is_empty) {
                return Err(Error::InvalidConfig("kube config not set".to_string()));
            }
            if self.kube_context.as_deref().is_none_or(str::is_empty) {
                return Err(Error::InvalidConfig("kube context not set".to_string()));
            }
        }
        Ok(())
    }

    pub fn audit_file(&self) -> PathBuf {
        self.audit_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIT_FILE))
    }
}

fn fallback_env(name: &str) -> Option<String> {
    FALLBACK_PREFIXES
        .iter()
        .filter_map(|prefix| std::env::var(format!("{prefix}{name}")).ok())
        .find(|value| !value.is_empty())
}

fn fallback_flag(name: &str) -> bool {
    fallback_env(name).is_some_and(|value| is_truthy(&value))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn is_drone() -> bool {
    std::env::var("DRONE").is_ok_and(|value| is_truthy(&value))
}
