// ABOUTME: Typed command construction with secret-aware rendering.
// ABOUTME: Renders a redacted string for logs and the exact argv for execution.

mod error;
mod runner;

pub use error::{CommandError, ExitedSnafu, SpawnSnafu, StdinSnafu, WaitSnafu};
pub use runner::{CommandRunner, ProcessRunner};

use std::ffi::OsString;
use std::fmt;

/// Placeholder shown in logs instead of a secret value.
pub const REDACTED: &str = "[SECRET]";

/// How an argument is rendered on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    /// Value only.
    Raw,
    /// `-<name> <value>`
    Short(String),
    /// `--<name> <value>`
    Long(String),
}

/// A single command-line argument.
///
/// The `secret` bit only affects [`Arg::safe_string`]; [`Arg::argv`] always
/// yields the real value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    kind: ArgKind,
    value: String,
    secret: bool,
}

impl Arg {
    pub fn raw(value: impl Into<String>) -> Self {
        Self {
            kind: ArgKind::Raw,
            value: value.into(),
            secret: false,
        }
    }

    pub fn short(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ArgKind::Short(name.into()),
            value: value.into(),
            secret: false,
        }
    }

    pub fn long(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ArgKind::Long(name.into()),
            value: value.into(),
            secret: false,
        }
    }

    /// Mark (or unmark) the value as secret.
    pub fn secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    pub fn kind(&self) -> &ArgKind {
        &self.kind
    }

    /// Flag name, or `None` for raw arguments.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ArgKind::Raw => None,
            ArgKind::Short(name) | ArgKind::Long(name) => Some(name),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    fn safe_value(&self) -> &str {
        if self.secret { REDACTED } else { &self.value }
    }

    /// Rendering for logs, with secrets redacted.
    pub fn safe_string(&self) -> String {
        match &self.kind {
            ArgKind::Raw => self.safe_value().to_string(),
            ArgKind::Short(name) => format!("-{} {}", name, self.safe_value()),
            ArgKind::Long(name) => format!("--{} {}", name, self.safe_value()),
        }
    }

    /// Rendering for execution: one or two argv entries, never redacted.
    pub fn argv(&self) -> Vec<String> {
        match &self.kind {
            ArgKind::Raw => vec![self.value.clone()],
            ArgKind::Short(name) => vec![format!("-{name}"), self.value.clone()],
            ArgKind::Long(name) => vec![format!("--{name}"), self.value.clone()],
        }
    }
}

/// An external command assembled from typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    program: String,
    args: Vec<Arg>,
    envs: Vec<(String, OsString)>,
}

impl CommandBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    /// Append several arguments in order.
    pub fn args(mut self, args: impl IntoIterator<Item = Arg>) -> Self {
        self.args.extend(args);
        self
    }

    /// Append an argument in place.
    pub fn push(&mut self, arg: Arg) {
        self.args.push(arg);
    }

    /// Set an environment variable for the child process. Never logged.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn parts(&self) -> &[Arg] {
        &self.args
    }

    pub fn envs(&self) -> &[(String, OsString)] {
        &self.envs
    }

    /// Redacted one-line rendering suitable for logging.
    pub fn safe_string(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(Arg::safe_string))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Exact argument vector, excluding the program name.
    pub fn argv(&self) -> Vec<String> {
        self.args.iter().flat_map(Arg::argv).collect()
    }

    /// A process command with real argument values and the configured environment.
    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(self.argv());
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.safe_string())
    }
}
