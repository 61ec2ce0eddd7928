// ABOUTME: Per-release state machine using the type state pattern.
// ABOUTME: Each transition consumes the run and returns the next state on success.

use crate::command::CommandRunner;
use crate::config::Release;
use crate::diagnostics::Diagnostics;

use super::Orchestrator;
use super::error::ReleaseError;
use super::state::{ChartReady, Done, Installed, Pending, ResourcesReady};

/// One release moving through `Pending → ChartReady → Installed →
/// ResourcesReady → Done`. Steps cannot be skipped or reordered.
#[derive(Debug)]
pub struct ReleaseRun<'a, S> {
    release: &'a Release,
    state: S,
}

impl<'a, S> ReleaseRun<'a, S> {
    pub fn release(&self) -> &'a Release {
        self.release
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    fn transition<T>(self, state: T) -> ReleaseRun<'a, T> {
        ReleaseRun {
            release: self.release,
            state,
        }
    }
}

impl<'a> ReleaseRun<'a, Pending> {
    pub fn new(release: &'a Release) -> Self {
        Self {
            release,
            state: Pending,
        }
    }

    /// Download and extract the remote chart archive, if one is declared.
    #[must_use = "release state must be used"]
    pub async fn fetch_chart<R: CommandRunner>(
        self,
        orchestrator: &Orchestrator<R>,
    ) -> Result<ReleaseRun<'a, ChartReady>, ReleaseError> {
        let archive = orchestrator.fetch_chart(self.release).await?;
        Ok(self.transition(ChartReady::new(archive)))
    }
}

impl<'a> ReleaseRun<'a, ChartReady> {
    /// Install through the package tool or the control tool.
    #[must_use = "release state must be used"]
    pub async fn install<R: CommandRunner>(
        self,
        orchestrator: &Orchestrator<R>,
        diag: &mut Diagnostics,
    ) -> Result<ReleaseRun<'a, Installed>, ReleaseError> {
        orchestrator.install(self.release, diag).await?;
        Ok(self.transition(Installed))
    }
}

impl<'a> ReleaseRun<'a, Installed> {
    /// Block until every declared workload is ready.
    #[must_use = "release state must be used"]
    pub async fn wait_for_resources<R: CommandRunner>(
        self,
        orchestrator: &Orchestrator<R>,
    ) -> Result<ReleaseRun<'a, ResourcesReady>, ReleaseError> {
        orchestrator.wait_for_resources(self.release).await?;
        Ok(self.transition(ResourcesReady))
    }
}

impl<'a> ReleaseRun<'a, ResourcesReady> {
    /// Apply the release's extra manifest files.
    #[must_use = "release state must be used"]
    pub async fn apply_post_files<R: CommandRunner>(
        self,
        orchestrator: &Orchestrator<R>,
        diag: &mut Diagnostics,
    ) -> Result<ReleaseRun<'a, Done>, ReleaseError> {
        orchestrator.apply_post_files(self.release, diag).await?;
        Ok(self.transition(Done))
    }
}
