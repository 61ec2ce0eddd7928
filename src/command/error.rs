// ABOUTME: Error types for external tool invocations, SNAFU style.
// ABOUTME: Carries the program name and exit code for diagnostics.

use snafu::Snafu;

/// Failure running an external program.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CommandError {
    #[snafu(display("failed to start {program}: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("failed to write stdin of {program}: {source}"))]
    Stdin {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("failed waiting for {program}: {source}"))]
    Wait {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("{program} exited with {}", exit_description(*code)))]
    Exited { program: String, code: Option<i32> },
}

impl CommandError {
    /// Exit code of the program, when it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Exited { code, .. } => *code,
            _ => None,
        }
    }

    pub fn program(&self) -> &str {
        match self {
            CommandError::Spawn { program, .. }
            | CommandError::Stdin { program, .. }
            | CommandError::Wait { program, .. }
            | CommandError::Exited { program, .. } => program,
        }
    }
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exited_display_includes_code() {
        let err = CommandError::Exited {
            program: "helm".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "helm exited with exit code 2");
        assert_eq!(err.exit_code(), Some(2));
    }

    #[test]
    fn signal_exit_has_no_code() {
        let err = CommandError::Exited {
            program: "kubectl".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "kubectl exited with a signal");
        assert_eq!(err.exit_code(), None);
        assert_eq!(err.program(), "kubectl");
    }
}
