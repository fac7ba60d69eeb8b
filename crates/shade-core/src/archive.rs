//! Archive reader and writer collaborators
//!
//! The shading pipeline only needs entry paths, a byte stream per entry and a
//! place to put output entries. Container formats plug in behind these traits;
//! this crate ships an exploded-directory implementation and an in-memory one.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single entry to be written into the output archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    /// Archive-relative path, `/`-separated
    pub path: String,
    /// Entry content
    pub bytes: Vec<u8>,
}

impl OutputEntry {
    /// Create a new output entry
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

/// Source of archive entries
pub trait ArchiveReader {
    /// Display name used in logs, errors and reports
    fn name(&self) -> &str;

    /// Entry paths in the order the container yields them
    fn entries(&self) -> Result<Vec<String>>;

    /// Open an entry for reading. The caller owns and drops the stream.
    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>>;
}

/// Destination for output entries
pub trait ArchiveWriter {
    /// Write one entry
    fn write_entry(&mut self, entry: &OutputEntry) -> Result<()>;
}

/// An exploded archive on disk
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
    name: String,
}

impl DirectoryArchive {
    /// Create a reader over the files below `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let name = root.display().to_string();
        Self { root, name }
    }
}

impl ArchiveReader for DirectoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> Result<Vec<String>> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            // Entries below root always have root as a prefix
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                entries.push(to_entry_path(relative));
            }
        }

        Ok(entries)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let full_path = self.root.join(path);
        let file = File::open(&full_path).map_err(|e| Error::FileRead {
            path: full_path,
            source: e,
        })?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Join path components with `/` regardless of platform
fn to_entry_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Writes output entries below a directory
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    root: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectoryWriter {
    /// Create a writer rooted at `root`; the directory is created on first write
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            written: Vec::new(),
        }
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ArchiveWriter for DirectoryWriter {
    fn write_entry(&mut self, entry: &OutputEntry) -> Result<()> {
        let output_path = self.root.join(&entry.path);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, &entry.bytes)?;
        self.written.push(output_path);
        Ok(())
    }
}

/// An archive held in memory, entries kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    name: String,
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    /// Create an empty archive
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry
    pub fn with_entry(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.push((path.into(), bytes.into()));
        self
    }
}

impl ArchiveReader for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.entries.iter().map(|(path, _)| path.clone()).collect())
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let (_, bytes) = self
            .entries
            .iter()
            .find(|(p, _)| p == path)
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no entry '{}' in {}", path, self.name),
                ))
            })?;
        Ok(Box::new(bytes.as_slice()))
    }
}

/// Collects output entries in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    pub entries: Vec<OutputEntry>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a written entry by exact path
    pub fn get(&self, path: &str) -> Option<&OutputEntry> {
        self.entries.iter().find(|e| e.path == path)
    }
}

impl ArchiveWriter for MemoryWriter {
    fn write_entry(&mut self, entry: &OutputEntry) -> Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(archive: &dyn ArchiveReader, path: &str) -> String {
        let mut out = String::new();
        archive.open(path).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_directory_archive_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("META-INF")).unwrap();
        fs::create_dir_all(dir.path().join("com/example")).unwrap();
        fs::write(dir.path().join("META-INF/MANIFEST.MF"), "A: 1\n").unwrap();
        fs::write(dir.path().join("com/example/App.class"), b"\xCA\xFE").unwrap();

        let archive = DirectoryArchive::new(dir.path());
        let entries = archive.entries().unwrap();

        assert_eq!(entries, vec!["META-INF/MANIFEST.MF", "com/example/App.class"]);
        assert_eq!(read_all(&archive, "META-INF/MANIFEST.MF"), "A: 1\n");
    }

    #[test]
    fn test_directory_archive_missing_root() {
        let archive = DirectoryArchive::new("/nonexistent/shade-root");
        assert!(matches!(archive.entries(), Err(Error::WalkDir(_))));
    }

    #[test]
    fn test_directory_archive_open_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = DirectoryArchive::new(dir.path());

        assert!(matches!(
            archive.open("META-INF/MANIFEST.MF"),
            Err(Error::FileRead { .. })
        ));
    }

    #[test]
    fn test_directory_writer_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DirectoryWriter::new(dir.path().join("out"));

        writer
            .write_entry(&OutputEntry::new("META-INF/MANIFEST.MF", b"A: 1\n".to_vec()))
            .unwrap();

        let written = fs::read_to_string(dir.path().join("out/META-INF/MANIFEST.MF")).unwrap();
        assert_eq!(written, "A: 1\n");
        assert_eq!(writer.written().len(), 1);
    }

    #[test]
    fn test_memory_archive_preserves_order() {
        let archive = MemoryArchive::new("mem")
            .with_entry("b.txt", "b")
            .with_entry("a.txt", "a");

        assert_eq!(archive.entries().unwrap(), vec!["b.txt", "a.txt"]);
        assert_eq!(read_all(&archive, "a.txt"), "a");
        assert!(archive.open("missing").is_err());
    }
}
