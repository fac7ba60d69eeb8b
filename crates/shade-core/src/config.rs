//! Manifest override configuration (JSON)
//!
//! Additional attributes are stored as an array so the declared order
//! survives a save/load cycle.

use crate::error::{Error, Result};
use crate::merger::Overrides;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// One configured `name = value` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub value: String,
}

impl ManifestEntry {
    /// Create a new entry
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl FromStr for ManifestEntry {
    type Err = Error;

    /// Parse `NAME=VALUE`; the value may itself contain `=`
    fn from_str(s: &str) -> Result<Self> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidAssignment(s.to_string()))?;
        if name.is_empty() {
            return Err(Error::InvalidAssignment(s.to_string()));
        }
        Ok(Self::new(name, value))
    }
}

/// Overrides applied to the merged manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Forced `Main-Class` value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    /// Extra attributes, applied after `main_class` in this order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manifest_entries: Vec<ManifestEntry>,
}

impl ManifestConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an additional attribute
    pub fn add_entry(&mut self, entry: ManifestEntry) {
        self.manifest_entries.push(entry);
    }

    /// Load a configuration from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the configuration to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check that `to_overrides` would accept this configuration
    pub fn validate(&self) -> Result<()> {
        self.to_overrides().map(|_| ())
    }

    /// Validate attribute names and values and build the run's overrides
    pub fn to_overrides(&self) -> Result<Overrides> {
        let mut overrides = Overrides::new();
        if let Some(main_class) = &self.main_class {
            overrides = overrides.with_main_class(main_class.clone())?;
        }
        for entry in &self.manifest_entries {
            overrides = overrides.with_attribute(&entry.name, entry.value.clone())?;
        }
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_entry_from_str() {
        let entry: ManifestEntry = "Built-By=ci".parse().unwrap();
        assert_eq!(entry, ManifestEntry::new("Built-By", "ci"));

        let entry: ManifestEntry = "X-Args=a=b".parse().unwrap();
        assert_eq!(entry.value, "a=b");

        let entry: ManifestEntry = "X-Empty=".parse().unwrap();
        assert_eq!(entry.value, "");

        assert!("no-equals".parse::<ManifestEntry>().is_err());
        assert!("=value".parse::<ManifestEntry>().is_err());
    }

    #[test]
    fn test_config_serialization_keeps_order() {
        let mut config = ManifestConfig::new();
        config.main_class = Some("com.example.Main".to_string());
        config.add_entry(ManifestEntry::new("Zeta", "1"));
        config.add_entry(ManifestEntry::new("Alpha", "2"));

        let json = serde_json::to_string_pretty(&config).unwrap();
        let loaded: ManifestConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.manifest_entries[0].name, "Zeta");
    }

    #[test]
    fn test_config_defaults_when_fields_missing() {
        let loaded: ManifestConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded, ManifestConfig::new());
        assert!(loaded.to_overrides().unwrap().is_empty());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");

        let mut config = ManifestConfig::new();
        config.add_entry(ManifestEntry::new("Built-By", "ci"));
        config.save(&path).unwrap();

        assert_eq!(ManifestConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = ManifestConfig::load("/nonexistent/manifest.json").unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_to_overrides() {
        let mut config = ManifestConfig::new();
        config.main_class = Some("com.example.Main".to_string());
        config.add_entry(ManifestEntry::new("Built-By", "ci"));
        config.add_entry(ManifestEntry::new("X-Team", "build"));

        let overrides = config.to_overrides().unwrap();
        assert_eq!(overrides.main_class(), Some("com.example.Main"));

        let names: Vec<&str> = overrides.additional().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Built-By", "X-Team"]);
    }

    #[test]
    fn test_validate() {
        let mut config = ManifestConfig::new();
        config.add_entry("Built-By=ci".parse().unwrap());
        assert!(config.validate().is_ok());

        config.add_entry("Bad Name=x".parse().unwrap());
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidAttributeName(name)) if name == "Bad Name"
        ));
    }

    #[test]
    fn test_to_overrides_rejects_multiline_value() {
        let mut config = ManifestConfig::new();
        config.main_class = Some("com.example.Main\nX: y".to_string());

        assert!(matches!(
            config.to_overrides(),
            Err(Error::InvalidAttributeValue { .. })
        ));
    }

    #[test]
    fn test_to_overrides_rejects_invalid_name() {
        let mut config = ManifestConfig::new();
        config.add_entry(ManifestEntry::new("Not Valid", "x"));

        assert!(matches!(
            config.to_overrides(),
            Err(Error::InvalidAttributeName(name)) if name == "Not Valid"
        ));
    }
}
