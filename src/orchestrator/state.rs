// ABOUTME: Release state marker types for the type state pattern.
// ABOUTME: Each marker names a step of the per-release state machine.

use std::path::{Path, PathBuf};

/// Nothing done yet.
/// Available actions: `fetch_chart()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pending;

/// Remote chart archive (if any) is on disk.
/// Available actions: `install()`
#[derive(Debug, Clone, Default)]
pub struct ChartReady {
    archive: Option<PathBuf>,
}

impl ChartReady {
    pub(crate) fn new(archive: Option<PathBuf>) -> Self {
        Self { archive }
    }

    /// Local archive path, when the release declared a charts source.
    pub fn archive(&self) -> Option<&Path> {
        self.archive.as_deref()
    }
}

/// Install (or dry/diff equivalent) succeeded.
/// Available actions: `wait_for_resources()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Installed;

/// Declared workloads report ready.
/// Available actions: `apply_post_files()`
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourcesReady;

/// Post-install manifests applied; the release is finished.
#[derive(Debug, Clone, Copy, Default)]
pub struct Done;
