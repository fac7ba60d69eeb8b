//! Manifest attribute model and the `Name: Value` text format
//!
//! Only the main attribute section is kept. Per-entry sections that follow
//! the first blank line are checked for well-formed headers and dropped.

use crate::error::{Error, Result};
use std::fmt::{self, Write as _};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Path of the manifest entry inside an archive
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Attribute naming the primary executable entry point
pub const MAIN_CLASS: &str = "Main-Class";

const MAX_NAME_LEN: usize = 70;

/// Check whether a path names the manifest entry (ASCII case-insensitive)
pub fn is_manifest_path(path: &str) -> bool {
    path.eq_ignore_ascii_case(MANIFEST_PATH)
}

/// A validated attribute name.
///
/// Names compare ASCII case-insensitively; the original spelling is kept for
/// output.
#[derive(Debug, Clone)]
pub struct AttributeName(String);

impl AttributeName {
    /// Create a name, rejecting anything outside `[A-Za-z0-9_-]{1,70}`
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if is_valid_name(&name) {
            Ok(Self(name))
        } else {
            Err(Error::InvalidAttributeName(name))
        }
    }

    /// The `Main-Class` attribute name
    pub fn main_class() -> Self {
        Self(MAIN_CLASS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a raw name, ignoring ASCII case
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for AttributeName {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for AttributeName {}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A single `Name: Value` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: AttributeName,
    pub value: String,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: AttributeName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Main-section attributes in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by name, ignoring ASCII case
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name.matches(name))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, returning the previous value if there was one.
    ///
    /// An existing attribute keeps its position and original spelling; a new
    /// one is appended.
    pub fn insert(&mut self, name: AttributeName, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.entries.push(Attribute::new(name, value));
                None
            }
        }
    }

    /// Iterate attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    /// Attribute names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|a| a.name.as_str()).collect()
    }

    /// Render as manifest text, one `Name: Value` line per attribute
    pub fn to_manifest_string(&self) -> String {
        let mut out = String::new();
        for attr in &self.entries {
            // Writing into a String cannot fail
            let _ = writeln!(out, "{}: {}", attr.name, attr.value);
        }
        out
    }

    /// Render as manifest bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_manifest_string().into_bytes()
    }
}

/// Parse a manifest file from disk
pub fn parse_manifest_file<P: AsRef<Path>>(path: P) -> Result<Attributes> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_manifest(&bytes, &path.display().to_string())
}

/// Read a stream to its end and parse it as a manifest
pub fn read_manifest<R: Read + ?Sized>(reader: &mut R, source_name: &str) -> Result<Attributes> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_manifest(&bytes, source_name)
}

/// Parse manifest bytes into main-section attributes
pub fn parse_manifest(bytes: &[u8], source_name: &str) -> Result<Attributes> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        let line = bytes[..e.valid_up_to()]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;
        Error::malformed(source_name, line, "content is not valid UTF-8")
    })?;

    let mut attributes = Attributes::new();
    let mut in_main_section = true;

    for (idx, line) in split_lines(text).into_iter().enumerate() {
        let line_no = idx + 1;

        if line.is_empty() {
            in_main_section = false;
            continue;
        }

        let (name, value) = parse_header(line, source_name, line_no)?;
        if in_main_section {
            attributes.insert(name, value);
        }
    }

    Ok(attributes)
}

fn parse_header(line: &str, source_name: &str, line_no: usize) -> Result<(AttributeName, String)> {
    if line.starts_with(' ') {
        return Err(Error::malformed(
            source_name,
            line_no,
            "continuation lines are not supported",
        ));
    }

    let (name, value) = line.split_once(": ").ok_or_else(|| {
        Error::malformed(source_name, line_no, format!("invalid header field '{}'", line))
    })?;

    let name = AttributeName::new(name).map_err(|_| {
        Error::malformed(source_name, line_no, format!("invalid attribute name '{}'", name))
    })?;

    Ok((name, value.to_string()))
}

/// Split on `\n`, `\r\n` or `\r`. A trailing terminator does not produce an
/// extra empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(idx) => {
                lines.push(&rest[..idx]);
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}
