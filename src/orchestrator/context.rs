// ABOUTME: Run-scoped settings threaded through the orchestrator.
// ABOUTME: Holds run flags, working directories, tool binaries, and the generated kubeconfig path.

use std::path::{Path, PathBuf};

use crate::types::ReleaseName;

/// Binaries used for external work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub helm: String,
    pub kubectl: String,
    pub wget: String,
    pub tar: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            helm: "helm".to_string(),
            kubectl: "kubectl".to_string(),
            wget: "wget".to_string(),
            tar: "tar".to_string(),
        }
    }
}

/// Settings for one orchestration run.
#[derive(Debug, Clone)]
pub struct RunContext {
    value_files: Vec<String>,
    kube_config: Option<String>,
    kube_config_base64: bool,
    kube_context: Option<String>,
    dry_run: bool,
    diff_run: bool,
    work_dir: PathBuf,
    kube_dir: PathBuf,
    tools: ToolPaths,
    kubeconfig_file: Option<PathBuf>,
}

impl RunContext {
    /// Context rooted at `work_dir`, which holds `values/` and `downloads/`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let kube_dir = dirs::home_dir()
            .map(|home| home.join(".kube"))
            .unwrap_or_else(|| work_dir.join(".kube"));
        Self {
            value_files: Vec::new(),
            kube_config: None,
            kube_config_base64: false,
            kube_context: None,
            dry_run: false,
            diff_run: false,
            work_dir,
            kube_dir,
            tools: ToolPaths::default(),
            kubeconfig_file: None,
        }
    }

    /// Run-level value files applied to every release, in order.
    pub fn value_files(mut self, files: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.value_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Kubeconfig contents to write before the run.
    pub fn kube_config(mut self, contents: impl Into<String>, base64: bool) -> Self {
        self.kube_config = Some(contents.into());
        self.kube_config_base64 = base64;
        self
    }

    pub fn kube_context(mut self, context: impl Into<String>) -> Self {
        self.kube_context = Some(context.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn diff_run(mut self, diff_run: bool) -> Self {
        self.diff_run = diff_run;
        self
    }

    /// Directory receiving the generated kubeconfig.
    pub fn kube_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.kube_dir = dir.into();
        self
    }

    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    pub fn run_value_files(&self) -> &[String] {
        &self.value_files
    }

    pub fn kube_config_contents(&self) -> Option<&str> {
        self.kube_config.as_deref().filter(|c| !c.is_empty())
    }

    pub fn is_kube_config_base64(&self) -> bool {
        self.kube_config_base64
    }

    pub fn context_name(&self) -> Option<&str> {
        self.kube_context.as_deref().filter(|c| !c.is_empty())
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn is_diff_run(&self) -> bool {
        self.diff_run
    }

    /// False for dry and diff runs, which leave nothing to wait on or apply.
    pub fn is_mutating(&self) -> bool {
        !self.dry_run && !self.diff_run
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn tool_paths(&self) -> &ToolPaths {
        &self.tools
    }

    /// Resolve a config-relative path against the working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.work_dir.join(path)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.work_dir.join("downloads")
    }

    /// `values/<release>/default.yaml`
    pub fn default_values_file(&self, release: &ReleaseName) -> PathBuf {
        self.work_dir
            .join("values")
            .join(release.as_str())
            .join("default.yaml")
    }

    /// `values/<release>/<cluster>.yaml`
    pub fn cluster_values_file(&self, release: &ReleaseName, cluster: &str) -> PathBuf {
        self.work_dir
            .join("values")
            .join(release.as_str())
            .join(format!("{cluster}.yaml"))
    }

    /// Where the kubeconfig for this run is written.
    pub fn kubeconfig_target(&self) -> PathBuf {
        let suffix = self.context_name().unwrap_or("impeller");
        self.kube_dir.join(format!("config-{suffix}"))
    }

    /// Kubeconfig written for this run, once setup has happened.
    pub fn kubeconfig_file(&self) -> Option<&Path> {
        self.kubeconfig_file.as_deref()
    }

    pub(crate) fn set_kubeconfig_file(&mut self, path: PathBuf) {
        self.kubeconfig_file = Some(path);
    }
}
