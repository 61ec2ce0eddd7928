// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup, a recording command runner, and config fixtures.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Once;

use async_trait::async_trait;
use impeller::command::{CommandBuilder, CommandError, CommandRunner};
use parking_lot::Mutex;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("impeller=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// One command seen by [`RecordingRunner`].
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Call {
    pub program: String,
    pub argv: Vec<String>,
    pub logged: String,
    pub stdin: Option<String>,
    pub envs: Vec<(String, OsString)>,
}

impl Call {
    /// Program and arguments joined by spaces.
    #[allow(dead_code)]
    pub fn line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.argv.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug)]
#[allow(dead_code)]
struct ScriptedFailure {
    needle: String,
    remaining: usize,
    code: i32,
}

/// Fake runner that records every command instead of executing it.
///
/// Failures are scripted by substring: the first `times` commands whose line
/// contains the needle exit with the given code.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Vec<ScriptedFailure>>,
    output: Mutex<String>,
}

#[allow(dead_code)]
impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_when(self, needle: &str, times: usize, code: i32) -> Self {
        self.failures.lock().push(ScriptedFailure {
            needle: needle.to_string(),
            remaining: times,
            code,
        });
        self
    }

    /// Stdout returned by every `output` call.
    pub fn with_output(self, text: &str) -> Self {
        *self.output.lock() = text.to_string();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls.lock().iter().map(Call::line).collect()
    }

    fn record(&self, cmd: &CommandBuilder, stdin: Option<&str>) -> Result<(), CommandError> {
        let call = Call {
            program: cmd.program().to_string(),
            argv: cmd.argv(),
            logged: cmd.safe_string(),
            stdin: stdin.map(str::to_string),
            envs: cmd.envs().to_vec(),
        };
        let line = call.line();
        self.calls.lock().push(call);

        let mut failures = self.failures.lock();
        if let Some(failure) = failures
            .iter_mut()
            .find(|f| f.remaining > 0 && line.contains(&f.needle))
        {
            failure.remaining -= 1;
            return Err(CommandError::Exited {
                program: cmd.program().to_string(),
                code: Some(failure.code),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, cmd: &CommandBuilder) -> Result<(), CommandError> {
        self.record(cmd, None)
    }

    async fn run_with_stdin(&self, cmd: &CommandBuilder, input: &str) -> Result<(), CommandError> {
        self.record(cmd, Some(input))
    }

    async fn output(&self, cmd: &CommandBuilder) -> Result<String, CommandError> {
        self.record(cmd, None)?;
        Ok(self.output.lock().clone())
    }
}

/// Write `contents` to `dir/relative`, creating parent directories.
#[allow(dead_code)]
pub fn write_file(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
