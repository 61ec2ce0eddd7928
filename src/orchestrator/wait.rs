// ABOUTME: Readiness waits for workloads declared on a release.
// ABOUTME: Deployments and stateful sets use `wait`; daemon sets use `rollout status`.

use std::fmt;

use crate::command::{Arg, CommandBuilder, CommandRunner};
use crate::config::Release;

use super::Orchestrator;
use super::error::ReleaseError;

/// Workload kinds a release can wait on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Deployment,
    DaemonSet,
    StatefulSet,
}

impl ResourceKind {
    /// Resource type as the control tool spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "deployment",
            ResourceKind::DaemonSet => "daemonset",
            ResourceKind::StatefulSet => "statefulset",
        }
    }

    /// Condition passed to `wait --for`, or `None` for rollout-based waits.
    pub fn condition(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Deployment => Some("condition=available"),
            ResourceKind::StatefulSet => Some("condition=ready"),
            ResourceKind::DaemonSet => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<R: CommandRunner> Orchestrator<R> {
    /// Command that blocks until `kind/name` is ready.
    pub fn wait_command(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: Option<&str>,
    ) -> CommandBuilder {
        let resource = format!("{kind}/{name}");
        let mut cmd = match kind.condition() {
            Some(condition) => self.kubectl().args([
                Arg::raw("wait"),
                Arg::long("for", condition),
                Arg::raw(resource),
            ]),
            None => self
                .kubectl()
                .args([Arg::raw("rollout"), Arg::raw("status"), Arg::raw(resource)]),
        };
        if let Some(namespace) = namespace {
            cmd.push(Arg::long("namespace", namespace));
        }
        if let Some(context) = self.ctx.context_name() {
            cmd.push(Arg::long("context", context));
        }
        cmd
    }

    /// Wait on every declared deployment, then daemon set, then stateful set.
    /// Dry and diff runs created nothing, so there is nothing to wait on.
    pub async fn wait_for_resources(&self, release: &Release) -> Result<(), ReleaseError> {
        if !self.ctx.is_mutating() {
            return Ok(());
        }

        let groups = [
            (ResourceKind::Deployment, &release.wait_for_deployment),
            (ResourceKind::DaemonSet, &release.wait_for_daemon_set),
            (ResourceKind::StatefulSet, &release.wait_for_stateful_set),
        ];
        for (kind, names) in groups {
            for name in names {
                tracing::info!("Waiting for {}: {}", kind, name);
                let cmd = self.wait_command(kind, name, release.namespace());
                self.runner
                    .run(&cmd)
                    .await
                    .map_err(|source| ReleaseError::Wait {
                        resource: format!("{kind}/{name}"),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}
