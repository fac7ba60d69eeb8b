//! shade-core: manifest merging for archive shading
//!
//! This library provides functionality to:
//! - Recognise `META-INF/MANIFEST.MF` entries across input archives
//! - Parse and serialize the manifest main section
//! - Merge manifests with a first-wins policy plus configured overrides
//! - Route archive entries through resource transformers into one output

pub mod archive;
pub mod config;
pub mod error;
pub mod manifest;
pub mod merger;
pub mod pipeline;
pub mod report;

pub use archive::{
    ArchiveReader, ArchiveWriter, DirectoryArchive, DirectoryWriter, MemoryArchive, MemoryWriter,
    OutputEntry,
};
pub use config::{ManifestConfig, ManifestEntry};
pub use error::{Error, Result};
pub use manifest::{
    is_manifest_path, parse_manifest, parse_manifest_file, read_manifest, Attribute, AttributeName,
    Attributes, MAIN_CLASS, MANIFEST_PATH,
};
pub use merger::{ManifestMerger, Overrides};
pub use pipeline::{ResourceTransformer, ShadePipeline};
pub use report::{ClaimedEntry, ShadeReport};
