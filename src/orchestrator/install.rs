// ABOUTME: Chart fetching and the two install paths (package tool, rendered manifests).
// ABOUTME: The manifest path retries a failed apply exactly once with the same input.

use std::path::PathBuf;

use url::Url;

use crate::command::{Arg, CommandBuilder, CommandRunner};
use crate::config::{DeploymentMethod, Release};
use crate::diagnostics::{Diagnostics, Warning};

use super::Orchestrator;
use super::error::ReleaseError;

/// Exit code `kubectl diff` uses to report differences.
const DIFF_FOUND_EXIT_CODE: i32 = 1;

impl<R: CommandRunner> Orchestrator<R> {
    /// Fetch and extract the release's remote chart archive into the download
    /// cache. Returns the archive path, or `None` when no source is declared.
    /// A cached archive is neither downloaded nor extracted again.
    pub async fn fetch_chart(&self, release: &Release) -> Result<Option<PathBuf>, ReleaseError> {
        let Some(source) = release.charts_source() else {
            return Ok(None);
        };
        tracing::info!("Charts source defined for: {}", release.name);

        let downloads = self.ctx.downloads_dir();
        std::fs::create_dir_all(&downloads).map_err(|source| ReleaseError::Downloads {
            path: downloads.clone(),
            source,
        })?;

        let archive = downloads.join(archive_file_name(source)?);
        if archive.exists() {
            tracing::info!("File exists, skipping download: {}", archive.display());
            return Ok(Some(archive));
        }

        tracing::info!("Downloading: {}", archive.display());
        let tools = self.ctx.tool_paths();
        let download = CommandBuilder::new(&tools.wget).args([
            Arg::short("O", archive.display().to_string()),
            Arg::raw(source),
        ]);
        self.runner
            .run(&download)
            .await
            .map_err(ReleaseError::ChartDownload)?;

        let extract = CommandBuilder::new(&tools.tar).args([
            Arg::raw("-xzf"),
            Arg::raw(archive.display().to_string()),
            Arg::short("C", downloads.display().to_string()),
        ]);
        self.runner
            .run(&extract)
            .await
            .map_err(ReleaseError::ChartExtract)?;

        Ok(Some(archive))
    }

    /// Install a release according to its deployment method.
    pub async fn install(
        &self,
        release: &Release,
        diag: &mut Diagnostics,
    ) -> Result<(), ReleaseError> {
        match release.deployment_method {
            DeploymentMethod::Package => self.install_package(release, diag).await,
            DeploymentMethod::Manifest => self.install_manifest(release, diag).await,
        }
    }

    async fn install_package(
        &self,
        release: &Release,
        diag: &mut Diagnostics,
    ) -> Result<(), ReleaseError> {
        if self.ctx.is_diff_run() {
            tracing::info!("Running diff: {}", release.name);
        } else if self.ctx.is_dry_run() {
            tracing::info!("Running dry run: {}", release.name);
        }
        let cmd = self.package_command(release, diag);
        self.runner.run(&cmd).await.map_err(ReleaseError::Install)
    }

    /// `upgrade --install` (or `diff upgrade`) for a release.
    pub fn package_command(&self, release: &Release, diag: &mut Diagnostics) -> CommandBuilder {
        let package = &self.config.package;
        let diff = self.ctx.is_diff_run();
        let mut cmd = self.helm();

        if diff {
            cmd = cmd.args([
                Arg::raw("diff"),
                Arg::raw("upgrade"),
                Arg::raw("--allow-unreleased"),
                Arg::raw("--suppress-secrets"),
            ]);
        } else {
            cmd = cmd.args([Arg::raw("upgrade"), Arg::raw("--install")]);
            if let Some(history) = release.effective_history(package.default_history) {
                cmd.push(Arg::long("history-max", history.to_string()));
            }
            if release.force {
                tracing::info!("Force flag enabled: resources with immutable field changes will be recreated");
                cmd.push(Arg::raw("--force"));
            }
        }

        cmd = cmd.args([
            Arg::raw(release.name.as_str()),
            Arg::raw(&release.chart_path),
            Arg::long("version", &release.version),
        ]);

        if let Some(context) = self.ctx.context_name() {
            cmd.push(Arg::long("kube-context", context));
        }
        if package.debug {
            cmd.push(Arg::raw("--debug"));
        }
        if let Some(namespace) = release.namespace() {
            cmd.push(Arg::long("namespace", namespace));
            if !diff {
                cmd.push(Arg::raw("--create-namespace"));
            }
        }
        if package.log_level != 0 {
            cmd.push(Arg::short("v", package.log_level.to_string()));
        }

        cmd = cmd.args(self.overrides(release, diag));

        if self.ctx.is_dry_run() && !diff {
            cmd.push(Arg::raw("--dry-run"));
        }
        cmd
    }

    /// `template` invocation rendering a release to plain manifests.
    pub fn template_command(&self, release: &Release, diag: &mut Diagnostics) -> CommandBuilder {
        self.helm()
            .args([
                Arg::raw("template"),
                Arg::raw(release.name.as_str()),
                Arg::raw(&release.chart_path),
                Arg::long("version", &release.version),
            ])
            .args(self.overrides(release, diag))
    }

    /// Control tool invocation reading manifests from stdin.
    pub fn apply_command(&self, release: &Release) -> CommandBuilder {
        let verb = if self.ctx.is_diff_run() { "diff" } else { "apply" };
        let mut cmd = self
            .kubectl()
            .args([Arg::raw(verb), Arg::long("filename", "-")]);
        if let Some(context) = self.ctx.context_name() {
            cmd.push(Arg::long("context", context));
        }
        if let Some(namespace) = release.namespace() {
            cmd.push(Arg::long("namespace", namespace));
        }
        if self.ctx.is_dry_run() && !self.ctx.is_diff_run() {
            cmd.push(Arg::raw("--dry-run=server"));
        }
        cmd
    }

    async fn install_manifest(
        &self,
        release: &Release,
        diag: &mut Diagnostics,
    ) -> Result<(), ReleaseError> {
        let template = self.template_command(release, diag);
        let rendered = self
            .runner
            .output(&template)
            .await
            .map_err(ReleaseError::Render)?;

        let apply = self.apply_command(release);

        if self.ctx.is_diff_run() {
            tracing::info!("Running diff: {}", release.name);
            return match self.runner.run_with_stdin(&apply, &rendered).await {
                Ok(()) => Ok(()),
                Err(e) if e.exit_code() == Some(DIFF_FOUND_EXIT_CODE) => {
                    diag.warn(Warning::diff_changes(release.name.as_str()));
                    Ok(())
                }
                Err(e) => Err(ReleaseError::Diff(e)),
            };
        }

        // One unconditional retry with identical input; the second failure is final.
        if let Err(first) = self.runner.run_with_stdin(&apply, &rendered).await {
            diag.warn(Warning::apply_retried(release.name.as_str(), &first));
            self.runner
                .run_with_stdin(&apply, &rendered)
                .await
                .map_err(ReleaseError::ManifestApply)?;
        }
        Ok(())
    }
}

/// File name of a chart archive URL, used as its cache key.
pub(crate) fn archive_file_name(source: &str) -> Result<String, ReleaseError> {
    let url = Url::parse(source).map_err(|e| ReleaseError::ChartSource {
        url: source.to_string(),
        reason: e.to_string(),
    })?;
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ReleaseError::ChartSource {
            url: source.to_string(),
            reason: "URL has no file name".to_string(),
        })
}
