//! Run report: which inputs were seen, which entries were claimed and what was written

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// An entry a transformer claimed while the pipeline walked its archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedEntry {
    /// Archive the entry came from
    pub archive: String,
    /// Entry path as the archive spelled it
    pub path: String,
    /// Name of the transformer that received it
    pub transformer: String,
}

/// Summary of one shading run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadeReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Archives processed, in order
    pub sources: Vec<String>,
    /// Claimed entries, in encounter order
    pub claimed: Vec<ClaimedEntry>,
    /// Paths of emitted entries
    pub written: Vec<String>,
}

impl Default for ShadeReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadeReport {
    /// Start a new report stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            sources: Vec::new(),
            claimed: Vec::new(),
            written: Vec::new(),
        }
    }

    /// Entries claimed by one transformer, in encounter order
    pub fn claimed_by(&self, transformer: &str) -> Vec<&ClaimedEntry> {
        self.claimed
            .iter()
            .filter(|c| c.transformer == transformer)
            .collect()
    }

    /// Load a report from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the report to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claimed(archive: &str, transformer: &str) -> ClaimedEntry {
        ClaimedEntry {
            archive: archive.to_string(),
            path: "META-INF/MANIFEST.MF".to_string(),
            transformer: transformer.to_string(),
        }
    }

    #[test]
    fn test_claimed_by_filters_in_order() {
        let mut report = ShadeReport::new();
        report.claimed.push(claimed("a.jar", "manifest"));
        report.claimed.push(claimed("b.jar", "services"));
        report.claimed.push(claimed("c.jar", "manifest"));

        let manifests = report.claimed_by("manifest");
        assert_eq!(manifests.len(), 2);
        assert_eq!(manifests[0].archive, "a.jar");
        assert_eq!(manifests[1].archive, "c.jar");
    }

    #[test]
    fn test_report_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut report = ShadeReport::new();
        report.sources.push("a.jar".to_string());
        report.claimed.push(claimed("a.jar", "manifest"));
        report.written.push("META-INF/MANIFEST.MF".to_string());
        report.save(&path).unwrap();

        let loaded = ShadeReport::load(&path).unwrap();
        assert_eq!(loaded.started_at, report.started_at);
        assert_eq!(loaded.sources, report.sources);
        assert_eq!(loaded.claimed, report.claimed);
        assert_eq!(loaded.written, report.written);
    }
}
