// ABOUTME: Release orchestration: setup, then each release through its state machine.
// ABOUTME: Drives the package and control tools strictly in declaration order.

mod context;
mod error;
mod install;
mod overrides;
mod post_apply;
mod release;
mod setup;
mod state;
mod wait;

pub use context::{RunContext, ToolPaths};
pub use error::ReleaseError;
pub use post_apply::{is_kustomization, manifest_files};
pub use release::ReleaseRun;
pub use state::{ChartReady, Done, Installed, Pending, ResourcesReady};
pub use wait::ResourceKind;

use crate::command::{CommandBuilder, CommandRunner};
use crate::config::{ClusterConfig, Release};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};

/// Applies a cluster's releases using the package and control tools.
#[derive(Debug)]
pub struct Orchestrator<R> {
    config: ClusterConfig,
    ctx: RunContext,
    runner: R,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(config: ClusterConfig, ctx: RunContext, runner: R) -> Self {
        Self {
            config,
            ctx,
            runner,
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Set up cluster access and repositories, then apply every release in order.
    ///
    /// The first failing release aborts the run; later releases are not touched.
    /// With kubeconfig setup skipped only repositories are registered.
    pub async fn run(&mut self, diag: &mut Diagnostics) -> Result<()> {
        self.setup_kubeconfig().await?;
        self.setup_repos(diag).await?;

        if self.config.package.skip_setup_kube_config {
            tracing::info!(
                "Kube config setup skipped, not installing {} release(s)",
                self.config.releases.len()
            );
            return Ok(());
        }

        for release in &self.config.releases {
            self.deploy_release(release, diag)
                .await
                .map_err(|source| Error::Release {
                    name: release.name.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Drive one release from start to finish.
    pub async fn deploy_release(
        &self,
        release: &Release,
        diag: &mut Diagnostics,
    ) -> std::result::Result<(), ReleaseError> {
        tracing::info!("Installing release: {} @ {}", release.name, release.version);

        let chart = ReleaseRun::new(release).fetch_chart(self).await?;
        if let Some(archive) = chart.state().archive() {
            tracing::debug!("Using chart archive: {}", archive.display());
        }

        let done = chart
            .install(self, diag)
            .await?
            .wait_for_resources(self)
            .await?
            .apply_post_files(self, diag)
            .await?;

        tracing::info!("Release {} done", done.release().name);
        Ok(())
    }

    /// Package tool command carrying this run's kubeconfig.
    pub(crate) fn helm(&self) -> CommandBuilder {
        self.tool(&self.ctx.tool_paths().helm)
    }

    /// Control tool command carrying this run's kubeconfig.
    pub(crate) fn kubectl(&self) -> CommandBuilder {
        self.tool(&self.ctx.tool_paths().kubectl)
    }

    fn tool(&self, program: &str) -> CommandBuilder {
        let cmd = CommandBuilder::new(program);
        match self.ctx.kubeconfig_file() {
            Some(path) => cmd.env("KUBECONFIG", path),
            None => cmd,
        }
    }
}
