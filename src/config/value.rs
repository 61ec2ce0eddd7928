// ABOUTME: Value sources for overrides and repository credentials.
// ABOUTME: Resolves literals, environment variables, and files; decides log redaction.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::command::Arg;

/// Errors resolving a value.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("no value provided: set either `value` or `valueFrom`")]
    NoValueSource,

    #[error("`valueFrom` must name an `environment` variable or a `file`")]
    EmptyValueFrom,

    #[error("failed to read value file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where a value comes from. Exactly one source per value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    Literal(String),
    FromEnv(String),
    FromFile(PathBuf),
}

/// A value plus its redaction policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawValue")]
pub struct Value {
    pub source: ValueSource,
    /// Show the value in logs. Off by default.
    pub reveal: bool,
}

impl Value {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            source: ValueSource::Literal(value.into()),
            reveal: false,
        }
    }

    pub fn from_env(var: impl Into<String>) -> Self {
        Self {
            source: ValueSource::FromEnv(var.into()),
            reveal: false,
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ValueSource::FromFile(path.into()),
            reveal: false,
        }
    }

    pub fn revealed(mut self, reveal: bool) -> Self {
        self.reveal = reveal;
        self
    }

    /// Resolve to the actual value.
    ///
    /// An unset environment variable resolves to the empty string. File
    /// contents are read in full.
    pub fn resolve(&self) -> Result<String, ValueError> {
        match &self.source {
            ValueSource::Literal(value) => Ok(value.clone()),
            ValueSource::FromEnv(var) => Ok(std::env::var(var).unwrap_or_default()),
            ValueSource::FromFile(path) => {
                std::fs::read_to_string(path).map_err(|source| ValueError::ReadFile {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    /// Build the package tool argument that sets `target` to this value.
    ///
    /// Literal and environment values become `--set target=value`, secret
    /// unless revealed. File values become `--set-file target=path`; the path
    /// is passed instead of the contents and is never secret.
    pub fn to_arg(&self, target: &str) -> Arg {
        match &self.source {
            ValueSource::Literal(value) => set_arg(target, value, self.reveal),
            ValueSource::FromEnv(var) => {
                let value = std::env::var(var).unwrap_or_default();
                set_arg(target, &value, self.reveal)
            }
            ValueSource::FromFile(path) => {
                Arg::long("set-file", format!("{}={}", target, path.display()))
            }
        }
    }

    /// True when the value is provably blank without touching the filesystem.
    pub fn is_blank(&self) -> bool {
        match &self.source {
            ValueSource::Literal(value) => value.is_empty(),
            ValueSource::FromEnv(var) => !matches!(std::env::var(var), Ok(v) if !v.is_empty()),
            ValueSource::FromFile(_) => false,
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        match &self.source {
            ValueSource::FromFile(path) => Some(path),
            _ => None,
        }
    }
}

fn set_arg(target: &str, value: &str, reveal: bool) -> Arg {
    Arg::long("set", format!("{target}={value}")).secret(!reveal)
}

/// A single key-path substitution, e.g. `image.tag`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawOverride")]
pub struct Override {
    pub target: String,
    pub value: Value,
}

impl Override {
    pub fn new(target: impl Into<String>, value: Value) -> Self {
        Self {
            target: target.into(),
            value,
        }
    }

    pub fn to_arg(&self) -> Arg {
        self.value.to_arg(&self.target)
    }

    pub fn resolve(&self) -> Result<String, ValueError> {
        self.value.resolve()
    }
}

// On-disk shapes. `value` wins over `valueFrom`, and `environment` over `file`.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValueFrom {
    #[serde(default)]
    environment: Option<String>,
    #[serde(default)]
    file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValue {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    value_from: Option<RawValueFrom>,
    #[serde(default)]
    show_value: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOverride {
    target: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    value_from: Option<RawValueFrom>,
    #[serde(default)]
    show_value: bool,
}

fn source_from_parts(
    value: Option<String>,
    value_from: Option<RawValueFrom>,
) -> Result<ValueSource, ValueError> {
    if let Some(value) = value {
        return Ok(ValueSource::Literal(value));
    }
    let from = value_from.ok_or(ValueError::NoValueSource)?;
    match (from.environment, from.file) {
        (Some(var), _) if !var.is_empty() => Ok(ValueSource::FromEnv(var)),
        (_, Some(path)) if !path.as_os_str().is_empty() => Ok(ValueSource::FromFile(path)),
        _ => Err(ValueError::EmptyValueFrom),
    }
}

impl TryFrom<RawValue> for Value {
    type Error = ValueError;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        Ok(Value {
            source: source_from_parts(raw.value, raw.value_from)?,
            reveal: raw.show_value,
        })
    }
}

impl TryFrom<RawOverride> for Override {
    type Error = String;

    fn try_from(raw: RawOverride) -> Result<Self, Self::Error> {
        let source = source_from_parts(raw.value, raw.value_from)
            .map_err(|e| format!("override `{}`: {}", raw.target, e))?;
        Ok(Override {
            target: raw.target,
            value: Value {
                source,
                reveal: raw.show_value,
            },
        })
    }
}
