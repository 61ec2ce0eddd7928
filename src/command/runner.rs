// ABOUTME: Process execution seam for external tools.
// ABOUTME: ProcessRunner spawns real processes via tokio; tests substitute fakes.

use async_trait::async_trait;
use snafu::{ResultExt, ensure};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;

use super::CommandBuilder;
use super::error::{CommandError, ExitedSnafu, SpawnSnafu, StdinSnafu, WaitSnafu};

/// Executes assembled commands.
///
/// Implementations log the redacted rendering of every command before running
/// it and report a non-zero exit as [`CommandError::Exited`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run with stdout and stderr passed through to this process.
    async fn run(&self, cmd: &CommandBuilder) -> Result<(), CommandError>;

    /// Run with stdin bound to `input`; stdout and stderr are passed through.
    async fn run_with_stdin(&self, cmd: &CommandBuilder, input: &str) -> Result<(), CommandError>;

    /// Run and capture stdout as text; stderr is passed through.
    async fn output(&self, cmd: &CommandBuilder) -> Result<String, CommandError>;
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, cmd: &CommandBuilder) -> Result<(), CommandError> {
        tracing::info!("running: {}", cmd.safe_string());
        let program = cmd.program();

        let status = cmd
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .context(SpawnSnafu { program })?;

        ensure!(
            status.success(),
            ExitedSnafu {
                program,
                code: status.code()
            }
        );
        Ok(())
    }

    async fn run_with_stdin(&self, cmd: &CommandBuilder, input: &str) -> Result<(), CommandError> {
        tracing::info!("running: {} (with stdin)", cmd.safe_string());
        let program = cmd.program();

        let mut child = cmd
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context(SpawnSnafu { program })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .context(StdinSnafu { program })?;
            // Dropping closes the pipe so the child sees EOF.
            drop(stdin);
        }

        let status = child.wait().await.context(WaitSnafu { program })?;
        ensure!(
            status.success(),
            ExitedSnafu {
                program,
                code: status.code()
            }
        );
        Ok(())
    }

    async fn output(&self, cmd: &CommandBuilder) -> Result<String, CommandError> {
        tracing::info!("running: {} (capturing output)", cmd.safe_string());
        let program = cmd.program();

        let output = cmd
            .to_command()
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .await
            .context(SpawnSnafu { program })?;

        ensure!(
            output.status.success(),
            ExitedSnafu {
                program,
                code: output.status.code()
            }
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
