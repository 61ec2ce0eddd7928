// ABOUTME: Cluster configuration types and parsing for cluster YAML files.
// ABOUTME: Describes releases, package tool settings, and load-time validation.

mod repo;
mod value;

pub use repo::RepoConfig;
pub use value::{Override, Value, ValueError, ValueSource};

use crate::error::{Error, Result};
use crate::types::ReleaseName;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Desired state of one cluster.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Cluster name. Selects `values/<release>/<name>.yaml` when non-empty.
    #[serde(default)]
    pub name: String,

    /// Releases in apply order.
    #[serde(default, alias = "addons")]
    pub releases: Vec<Release>,

    #[serde(default, rename = "helm", alias = "package")]
    pub package: PackageConfig,
}

/// Settings for the package tool shared by every release.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageConfig {
    #[serde(default)]
    pub upgrade: bool,

    #[serde(default)]
    pub skip_setup_helm_repo: bool,

    #[serde(default)]
    pub skip_setup_kube_config: bool,

    /// History retained per release when the release sets none.
    #[serde(default)]
    pub default_history: u32,

    #[serde(default)]
    pub debug: bool,

    /// Package tool log verbosity; 0 leaves the tool default.
    #[serde(default, rename = "log")]
    pub log_level: u32,

    #[serde(default)]
    pub service_account: Option<String>,

    #[serde(default)]
    pub repos: Vec<RepoConfig>,

    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

/// How a release reaches the cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum DeploymentMethod {
    /// `upgrade --install` through the package tool.
    #[default]
    #[serde(rename = "helm", alias = "package")]
    Package,
    /// Render with the package tool, apply with the control tool.
    #[serde(rename = "kubectl", alias = "manifest")]
    Manifest,
}

/// One versioned deployment of a packaged application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub name: ReleaseName,

    #[serde(default, alias = "deployment")]
    pub deployment_method: DeploymentMethod,

    pub version: String,

    pub chart_path: String,

    /// Remote archive fetched and extracted before install.
    #[serde(default)]
    pub charts_source: Option<String>,

    /// Overrides the cluster's `defaultHistory`; 0 means unset.
    #[serde(default, rename = "history", alias = "historyLimit")]
    pub history_limit: u32,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub value_files: Vec<String>,

    #[serde(default)]
    pub overrides: Vec<Override>,

    #[serde(default)]
    pub wait_for_deployment: Vec<String>,

    #[serde(default)]
    pub wait_for_daemon_set: Vec<String>,

    #[serde(default)]
    pub wait_for_stateful_set: Vec<String>,

    /// Files or directories applied with the control tool after install.
    #[serde(default, rename = "kubectlFiles", alias = "postApplyFiles")]
    pub post_apply_files: Vec<PathBuf>,

    /// Allow the package tool to recreate resources with immutable changes.
    #[serde(default)]
    pub force: bool,
}

impl Release {
    /// Minimal release, mostly useful for tests and tooling.
    pub fn new(name: ReleaseName, chart_path: impl Into<String>, version: impl Into<String>) -> Self {
        Release {
            name,
            deployment_method: DeploymentMethod::default(),
            version: version.into(),
            chart_path: chart_path.into(),
            charts_source: None,
            history_limit: 0,
            namespace: None,
            value_files: Vec::new(),
            overrides: Vec::new(),
            wait_for_deployment: Vec::new(),
            wait_for_daemon_set: Vec::new(),
            wait_for_stateful_set: Vec::new(),
            post_apply_files: Vec::new(),
            force: false,
        }
    }

    /// Namespace, treating an empty string as unset.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|ns| !ns.is_empty())
    }

    /// Remote chart archive URL, treating an empty string as unset.
    pub fn charts_source(&self) -> Option<&str> {
        self.charts_source.as_deref().filter(|s| !s.is_empty())
    }

    /// History limit to pass to the package tool, if any.
    pub fn effective_history(&self, default_history: u32) -> Option<u32> {
        match (self.history_limit, default_history) {
            (0, 0) => None,
            (0, default) => Some(default),
            (own, _) => Some(own),
        }
    }

    pub fn has_wait_targets(&self) -> bool {
        !(self.wait_for_deployment.is_empty()
            && self.wait_for_daemon_set.is_empty()
            && self.wait_for_stateful_set.is_empty())
    }
}

impl ClusterConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ClusterConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            Error::Yaml(source) => Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for release in &self.releases {
            if !seen.insert(release.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate release name: {}",
                    release.name
                )));
            }
            if release.version.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "release {} has no version",
                    release.name
                )));
            }
            if release.chart_path.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "release {} has no chartPath",
                    release.name
                )));
            }
        }
        Ok(())
    }

    pub fn release(&self, name: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.name.as_str() == name)
    }
}
