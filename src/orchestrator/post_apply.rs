// ABOUTME: Applies a release's extra manifest files after install.
// ABOUTME: Directories are expanded to their manifest files; kustomization files are skipped.

use std::io;
use std::path::{Path, PathBuf};

use crate::command::{Arg, CommandBuilder, CommandRunner};
use crate::config::Release;
use crate::diagnostics::{Diagnostics, Warning};

use super::Orchestrator;
use super::error::ReleaseError;

const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml"];

const KUSTOMIZATION_FILES: &[&str] = &[
    "kustomization.yaml",
    "kustomization.yml",
    "Kustomization.yaml",
    "Kustomization.yml",
];

/// Whether `file_name` is reserved for a kustomization overlay.
pub fn is_kustomization(file_name: &str) -> bool {
    KUSTOMIZATION_FILES.contains(&file_name)
}

/// Manifest files directly inside `dir`, sorted by path.
///
/// Subdirectories and kustomization files are not included.
pub fn manifest_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        let is_manifest = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext));
        let reserved = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_kustomization);
        if is_manifest && !reserved {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl<R: CommandRunner> Orchestrator<R> {
    /// `apply --filename <file>`, leaving the namespace to the manifest itself.
    pub fn apply_file_command(&self, file: &Path) -> CommandBuilder {
        let mut cmd = self.kubectl().args([
            Arg::raw("apply"),
            Arg::long("filename", file.display().to_string()),
        ]);
        if let Some(context) = self.ctx.context_name() {
            cmd.push(Arg::long("context", context));
        }
        cmd
    }

    /// Apply every declared post-install path. Skipped for dry and diff runs.
    pub async fn apply_post_files(
        &self,
        release: &Release,
        diag: &mut Diagnostics,
    ) -> Result<(), ReleaseError> {
        if !self.ctx.is_mutating() {
            return Ok(());
        }

        for declared in &release.post_apply_files {
            let path = self.ctx.resolve(declared);
            let metadata =
                std::fs::metadata(&path).map_err(|source| ReleaseError::PostApplyPath {
                    path: path.clone(),
                    source,
                })?;

            let files = if metadata.is_dir() {
                let files =
                    manifest_files(&path).map_err(|source| ReleaseError::PostApplyPath {
                        path: path.clone(),
                        source,
                    })?;
                if files.is_empty() {
                    diag.warn(Warning::empty_manifest_dir(&path));
                }
                files
            } else {
                vec![path]
            };

            for file in files {
                tracing::info!("Applying kubectl file: {}", file.display());
                let cmd = self.apply_file_command(&file);
                self.runner
                    .run(&cmd)
                    .await
                    .map_err(|source| ReleaseError::PostApply { path: file, source })?;
            }
        }
        Ok(())
    }
}
