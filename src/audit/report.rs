// ABOUTME: In-memory audit report keyed by release, cluster, and namespace.
// ABOUTME: Serializes to a fixed-header CSV; a repeated key keeps the last record.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;

use super::AuditError;

/// Header row of every audit report.
pub const REPORT_HEADER: &str = "Name,Cluster,Namespace,Version,ChartPath,ChartsSource,ValueFiles";

/// Identity of one audited release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuditKey {
    pub name: String,
    pub cluster: String,
    pub namespace: String,
}

/// What was found for an audited release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditDetail {
    pub version: String,
    pub chart_path: String,
    pub charts_source: String,
    pub value_files: String,
}

/// Audit records for one pass over a cluster directory.
///
/// Row order follows map iteration and is not stable between runs.
#[derive(Debug, Default)]
pub struct AuditReport {
    records: HashMap<AuditKey, AuditDetail>,
}

impl AuditReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `detail` under `key`, replacing any earlier record.
    pub fn add(&mut self, key: AuditKey, detail: AuditDetail) {
        self.records.insert(key, detail);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &AuditKey) -> Option<&AuditDetail> {
        self.records.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AuditKey, &AuditDetail)> {
        self.records.iter()
    }

    /// Write header and rows. Fields are written as-is, without quoting.
    pub fn write_to(&self, mut out: impl Write) -> io::Result<()> {
        writeln!(out, "{REPORT_HEADER}")?;
        for (key, detail) in &self.records {
            writeln!(
                out,
                "{},{},{},{},{},{},{}",
                key.name,
                key.cluster,
                key.namespace,
                detail.version,
                detail.chart_path,
                detail.charts_source,
                detail.value_files
            )?;
        }
        out.flush()
    }

    /// Create (or truncate) `path` and write the report to it.
    pub fn write(&self, path: &Path) -> Result<(), AuditError> {
        let file = std::fs::File::create(path).map_err(|source| AuditError::CreateReport {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(io::BufWriter::new(file))
            .map_err(|source| AuditError::WriteReport {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Summary column for a release's value files: ` |a |b`, or `no overrides`.
pub fn value_files_summary(files: &[String]) -> String {
    if files.is_empty() {
        return "no overrides".to_string();
    }
    files.iter().map(|file| format!(" |{file}")).collect()
}
