// ABOUTME: Diagnostics accumulator for non-fatal warnings during a run.
// ABOUTME: Collects warnings that shouldn't fail a release but should be shown to users.

use std::path::Path;

/// Collects non-fatal warnings during orchestration.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Count warnings of one kind.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal warning collected during orchestration.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A declared value file does not exist and was skipped.
    pub fn missing_value_file(path: &str) -> Self {
        Self {
            kind: WarningKind::MissingValueFile,
            message: format!("value file does not exist, skipping: {path}"),
        }
    }

    /// An override resolved to an empty string.
    pub fn blank_override(target: &str) -> Self {
        Self {
            kind: WarningKind::BlankOverride,
            message: format!("override value for {target} is blank"),
        }
    }

    /// A repository credential resolved to an empty string.
    pub fn blank_credential(repo: &str, field: &str) -> Self {
        Self {
            kind: WarningKind::BlankCredential,
            message: format!("{field} for helm repo {repo} is blank"),
        }
    }

    /// A post-apply directory contained no manifest files.
    pub fn empty_manifest_dir(dir: &Path) -> Self {
        Self {
            kind: WarningKind::EmptyManifestDir,
            message: format!("no manifest files found in directory: {}", dir.display()),
        }
    }

    /// The first manifest apply failed and is being retried.
    pub fn apply_retried(release: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            kind: WarningKind::ApplyRetried,
            message: format!("apply of {release} failed ({reason}), retrying once"),
        }
    }

    /// A diff run found differences against the live cluster.
    pub fn diff_changes(release: &str) -> Self {
        Self {
            kind: WarningKind::DiffChanges,
            message: format!("{release} differs from the cluster"),
        }
    }
}

/// Categories of warnings that can occur during orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    MissingValueFile,
    BlankOverride,
    BlankCredential,
    EmptyManifestDir,
    /// First manifest apply failed; a second attempt follows.
    ApplyRetried,
    DiffChanges,
}
