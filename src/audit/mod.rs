// ABOUTME: Read-only audit over a directory of cluster configs.
// ABOUTME: Parses every config file and records its releases; never runs external tools.

mod report;

pub use report::{AuditDetail, AuditKey, AuditReport, REPORT_HEADER, value_files_summary};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::ClusterConfig;
use crate::error::Result;

/// Report path used when none is given.
pub const DEFAULT_AUDIT_FILE: &str = "./auditreport.csv";

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("error listing cluster configs in {path}: {source}")]
    ListClusters {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error creating audit report {path}: {source}")]
    CreateReport {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error writing audit report {path}: {source}")]
    WriteReport {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// File names of the cluster configs in `dir`. Subdirectories are ignored.
pub fn list_clusters(dir: &Path) -> std::result::Result<BTreeSet<String>, AuditError> {
    let list_err = |source| AuditError::ListClusters {
        path: dir.to_path_buf(),
        source,
    };

    let mut clusters = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        if entry.file_type().map_err(list_err)?.is_dir() {
            continue;
        }
        clusters.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(clusters)
}

/// Build the report for every cluster config in `dir`.
pub fn build_report(dir: &Path) -> Result<AuditReport> {
    let mut report = AuditReport::new();
    for cluster in list_clusters(dir)? {
        let config = ClusterConfig::load(&dir.join(&cluster))?;
        for release in &config.releases {
            report.add(
                AuditKey {
                    name: release.name.to_string(),
                    cluster: cluster.clone(),
                    namespace: release.namespace().unwrap_or_default().to_string(),
                },
                AuditDetail {
                    version: release.version.clone(),
                    chart_path: release.chart_path.clone(),
                    charts_source: release.charts_source().unwrap_or_default().to_string(),
                    value_files: value_files_summary(&release.value_files),
                },
            );
        }
    }
    Ok(report)
}

/// Audit `dir` and write the report to `out`.
pub fn run_audit(dir: &Path, out: &Path) -> Result<AuditReport> {
    tracing::info!("Generating audit report for: {}", dir.display());
    let report = build_report(dir)?;
    report.write(out)?;
    tracing::info!("Audit report written to: {} ({} records)", out.display(), report.len());
    Ok(report)
}
