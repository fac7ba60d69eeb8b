//! Shading pipeline: routes archive entries to resource transformers

use crate::archive::{ArchiveReader, ArchiveWriter, OutputEntry};
use crate::error::Result;
use crate::report::{ClaimedEntry, ShadeReport};
use std::io::Read;
use tracing::{debug, info};

/// A pipeline stage that claims entries by path, folds their content and
/// emits a replacement entry at the end of the run
pub trait ResourceTransformer {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Whether this transformer takes ownership of the entry at `path`
    fn can_transform_resource(&self, path: &str) -> bool;

    /// Fold one claimed entry. `source` identifies the entry for errors;
    /// the reader is only borrowed for the call.
    fn process_resource(&mut self, source: &str, reader: &mut dyn Read) -> Result<()>;

    /// Whether `emit` will produce an entry
    fn has_transformed_resource(&self) -> bool;

    /// Produce the output entry. Consumes the transformer.
    fn emit(self: Box<Self>) -> Result<OutputEntry>;
}

/// Runs archives through a set of transformers for one output archive
pub struct ShadePipeline {
    transformers: Vec<Box<dyn ResourceTransformer>>,
    report: ShadeReport,
}

impl Default for ShadePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadePipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self {
            transformers: Vec::new(),
            report: ShadeReport::new(),
        }
    }

    /// Add a transformer. Earlier transformers get first claim on an entry.
    pub fn with_transformer<T: ResourceTransformer + 'static>(mut self, transformer: T) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// Report collected so far
    pub fn report(&self) -> &ShadeReport {
        &self.report
    }

    /// Offer every entry of `archive` to the transformers, in the order the
    /// archive yields them. Returns the number of claimed entries.
    pub fn process_archive(&mut self, archive: &dyn ArchiveReader) -> Result<usize> {
        let archive_name = archive.name().to_string();
        self.report.sources.push(archive_name.clone());

        let mut claimed = 0;
        for path in archive.entries()? {
            let Some(transformer) = self
                .transformers
                .iter_mut()
                .find(|t| t.can_transform_resource(&path))
            else {
                continue;
            };

            let source = format!("{}!/{}", archive_name, path);
            debug!(source = %source, transformer = transformer.name(), "processing entry");

            let mut reader = archive.open(&path)?;
            transformer.process_resource(&source, &mut *reader)?;
            drop(reader);

            self.report.claimed.push(ClaimedEntry {
                archive: archive_name.clone(),
                path,
                transformer: transformer.name().to_string(),
            });
            claimed += 1;
        }

        info!(archive = %archive_name, claimed, "processed archive");
        Ok(claimed)
    }

    /// Emit every transformer that has output and write each entry once
    pub fn finish(self, writer: &mut dyn ArchiveWriter) -> Result<ShadeReport> {
        let mut report = self.report;

        for transformer in self.transformers {
            if !transformer.has_transformed_resource() {
                continue;
            }
            let entry = transformer.emit()?;
            writer.write_entry(&entry)?;
            debug!(path = %entry.path, bytes = entry.bytes.len(), "wrote entry");
            report.written.push(entry.path);
        }

        Ok(report)
    }
}
