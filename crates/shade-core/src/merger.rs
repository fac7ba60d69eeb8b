//! Merge policy for `META-INF/MANIFEST.MF`
//!
//! The first manifest encountered wins; every later one is dropped unread.
//! Overrides are applied on top when the merged entry is emitted. Because the
//! first manifest wins, swapping the order of input archives changes the
//! output.

use crate::archive::OutputEntry;
use crate::error::{Error, Result};
use crate::manifest::{
    is_manifest_path, read_manifest, Attribute, AttributeName, Attributes, MAIN_CLASS,
    MANIFEST_PATH,
};
use crate::pipeline::ResourceTransformer;
use std::io::Read;
use tracing::debug;

/// Values forced into the merged manifest, fixed for the whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    main_class: Option<String>,
    additional: Vec<Attribute>,
}

impl Overrides {
    /// No overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `Main-Class` value. An empty value leaves the override unset.
    pub fn with_main_class(mut self, main_class: impl Into<String>) -> Result<Self> {
        let main_class = main_class.into();
        check_value(MAIN_CLASS, &main_class)?;
        self.main_class = if main_class.is_empty() {
            None
        } else {
            Some(main_class)
        };
        Ok(self)
    }

    /// Append an additional attribute; applied in the order added
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Result<Self> {
        let name = AttributeName::new(name)?;
        let value = value.into();
        check_value(name.as_str(), &value)?;
        self.additional.push(Attribute::new(name, value));
        Ok(self)
    }

    pub fn main_class(&self) -> Option<&str> {
        self.main_class.as_deref()
    }

    pub fn additional(&self) -> &[Attribute] {
        &self.additional
    }

    pub fn is_empty(&self) -> bool {
        self.main_class.is_none() && self.additional.is_empty()
    }

    /// Apply the main class first, then additional attributes in order
    pub fn apply(&self, attributes: &mut Attributes) {
        if let Some(main_class) = &self.main_class {
            attributes.insert(AttributeName::main_class(), main_class.clone());
        }
        for attr in &self.additional {
            attributes.insert(attr.name.clone(), attr.value.clone());
        }
    }
}

/// A value spanning lines would be written out as extra headers
fn check_value(name: &str, value: &str) -> Result<()> {
    if value.contains(|c: char| c == '\r' || c == '\n') {
        return Err(Error::InvalidAttributeValue {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Accumulated merge state
#[derive(Debug, Clone)]
enum MergeState {
    /// No manifest seen yet
    Empty,
    /// The first manifest has been folded in
    Discovered(Attributes),
}

impl MergeState {
    fn into_attributes(self) -> Attributes {
        match self {
            MergeState::Empty => Attributes::new(),
            MergeState::Discovered(attributes) => attributes,
        }
    }
}

/// Merges manifest entries across all input archives of one shading run.
///
/// Create one per run; `emit` consumes it.
#[derive(Debug)]
pub struct ManifestMerger {
    overrides: Overrides,
    state: MergeState,
    discarded: Vec<String>,
}

impl ManifestMerger {
    /// Create a merger with the run's overrides
    pub fn new(overrides: Overrides) -> Self {
        Self {
            overrides,
            state: MergeState::Empty,
            discarded: Vec::new(),
        }
    }

    /// Whether `path` is the manifest entry this merger owns
    pub fn matches(&self, path: &str) -> bool {
        is_manifest_path(path)
    }

    /// Fold a matched manifest into the merge state.
    ///
    /// Only the first call parses its stream. Later streams are left unread
    /// and only their source is recorded.
    pub fn accumulate<R: Read + ?Sized>(&mut self, source: &str, reader: &mut R) -> Result<()> {
        if self.is_discovered() {
            debug!(source, "ignoring manifest, an earlier one was kept");
            self.discarded.push(source.to_string());
            return Ok(());
        }

        let attributes = read_manifest(reader, source)?;
        debug!(source, attributes = attributes.len(), "using manifest");
        self.state = MergeState::Discovered(attributes);
        Ok(())
    }

    pub fn is_discovered(&self) -> bool {
        matches!(self.state, MergeState::Discovered(_))
    }

    /// Sources of manifests that were dropped because one was already kept
    pub fn discarded(&self) -> &[String] {
        &self.discarded
    }

    /// Preview the attributes `emit` would write
    pub fn merged_attributes(&self) -> Attributes {
        let mut attributes = self.state.clone().into_attributes();
        self.overrides.apply(&mut attributes);
        attributes
    }

    /// Produce the merged manifest entry. Always yields an entry, even when no
    /// manifest was found.
    pub fn emit(self) -> OutputEntry {
        let mut attributes = self.state.into_attributes();
        self.overrides.apply(&mut attributes);
        debug!(attributes = attributes.len(), "emitting merged manifest");
        OutputEntry::new(MANIFEST_PATH, attributes.to_bytes())
    }
}

impl ResourceTransformer for ManifestMerger {
    fn name(&self) -> &str {
        "manifest"
    }

    fn can_transform_resource(&self, path: &str) -> bool {
        self.matches(path)
    }

    fn process_resource(&mut self, source: &str, reader: &mut dyn Read) -> Result<()> {
        self.accumulate(source, reader)
    }

    fn has_transformed_resource(&self) -> bool {
        true
    }

    fn emit(self: Box<Self>) -> Result<OutputEntry> {
        Ok(ManifestMerger::emit(*self))
    }
}
