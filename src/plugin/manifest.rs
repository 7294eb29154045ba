//! Package manifest decoding.
//!
//! A package declares its metadata and core compatibility in `plugin.json`
//! (or `manifest.json`). The content is JSON, with YAML accepted as a
//! fallback. Decoding never fails past this module: anything unreadable is
//! reported as [`ManifestDecode::Empty`], which the compatibility gate treats
//! as "always compatible".

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::widgets::UiSpec;

/// Manifest file names, in lookup order.
pub const MANIFEST_FILES: [&str; 2] = ["plugin.json", "manifest.json"];

/// Key holding the minimum supported core version.
pub const MIN_CORE_VERSION_KEY: &str = "min_core_version";

/// Keys holding an explicit list of supported core versions (synonyms).
pub const COMPATIBLE_VERSIONS_KEYS: [&str; 2] = ["compatible_core_versions", "compatible_versions"];

/// A decoded manifest document.
///
/// The document is kept as a loose value so that anything a package author
/// wrote can be shown back to the user; compatibility keys are read on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Value);

impl Manifest {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Mapping view, if the document is a mapping.
    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    /// Whether the document carries no content at all.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn version(&self) -> Option<&str> {
        self.get_str("version")
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }
}

impl std::fmt::Display for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of decoding a manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestDecode {
    /// A manifest document was decoded.
    Parsed(Manifest),
    /// No manifest, or nothing decodable.
    Empty,
}

impl ManifestDecode {
    /// The decoded manifest, with `Empty` mapped to an empty document.
    pub fn into_manifest(self) -> Manifest {
        match self {
            Self::Parsed(manifest) => manifest,
            Self::Empty => Manifest::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Decode manifest text: JSON first, then YAML.
pub fn decode(text: &str) -> ManifestDecode {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => return ManifestDecode::Parsed(Manifest(value)),
        Err(e) => tracing::trace!(error = %e, "Manifest is not JSON, trying YAML"),
    }

    match serde_yaml::from_str::<Value>(text) {
        Ok(value) => ManifestDecode::Parsed(Manifest(value)),
        Err(e) => {
            tracing::debug!(error = %e, "Manifest could not be decoded");
            ManifestDecode::Empty
        }
    }
}

/// Read the manifest of an installed package directory.
///
/// The first manifest file that exists wins, even if it does not decode.
pub fn read_local(package_dir: &Path) -> ManifestDecode {
    for file_name in MANIFEST_FILES {
        let path = package_dir.join(file_name);
        if !path.exists() {
            continue;
        }

        return match std::fs::read_to_string(&path) {
            Ok(text) => decode(&text),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read manifest");
                ManifestDecode::Empty
            }
        };
    }

    ManifestDecode::Empty
}

/// Manifest written by the package exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name (also its store directory name).
    pub name: String,
    /// Package version.
    pub version: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Minimum core version required.
    pub min_core_version: String,
    /// Declarative editor description.
    #[serde(default)]
    pub ui: UiSpec,
}

impl PackageManifest {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Loose view for the compatibility gate.
    pub fn to_manifest(&self) -> serde_json::Result<Manifest> {
        serde_json::to_value(self).map(Manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_decode_json() {
        let decoded = decode(r#"{"name": "i3-bar", "min_core_version": "0.2.0"}"#);
        let ManifestDecode::Parsed(manifest) = decoded else { panic!("expected manifest") };
        assert_eq!(manifest.name(), Some("i3-bar"));
        assert_eq!(manifest.get(MIN_CORE_VERSION_KEY), Some(&json!("0.2.0")));
    }

    #[test]
    fn test_decode_yaml_fallback() {
        let decoded = decode("name: i3-bar\ncompatible_versions:\n  - 0.2.0\n  - 0.3.0\n");
        let manifest = decoded.into_manifest();
        assert_eq!(manifest.name(), Some("i3-bar"));
        assert_eq!(manifest.get("compatible_versions"), Some(&json!(["0.2.0", "0.3.0"])));
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        assert_eq!(decode("{ not: [valid"), ManifestDecode::Empty);
    }

    #[test]
    fn test_read_local_missing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_local(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_read_local_prefers_plugin_json() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("plugin.json"), r#"{"name": "primary"}"#).unwrap();
        std::fs::write(temp_dir.path().join("manifest.json"), r#"{"name": "secondary"}"#).unwrap();

        assert_eq!(read_local(temp_dir.path()).into_manifest().name(), Some("primary"));
    }

    #[test]
    fn test_read_local_first_found_wins_even_if_invalid() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("plugin.json"), "{ broken: [").unwrap();
        std::fs::write(temp_dir.path().join("manifest.json"), r#"{"name": "secondary"}"#).unwrap();

        assert!(read_local(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_read_local_secondary_name() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("manifest.json"), r#"{"name": "secondary"}"#).unwrap();

        assert_eq!(read_local(temp_dir.path()).into_manifest().name(), Some("secondary"));
    }

    #[test]
    fn test_manifest_emptiness() {
        assert!(Manifest::default().is_empty());
        assert!(Manifest::new(json!({})).is_empty());
        assert!(Manifest::new(json!([])).is_empty());
        assert!(!Manifest::new(json!({"name": "x"})).is_empty());
        assert!(!Manifest::new(json!("text")).is_empty());
    }

    #[test]
    fn test_package_manifest_roundtrip_view() {
        let manifest = PackageManifest {
            name: "demo".to_string(),
            version: "0.1.0".to_string(),
            description: "Demo".to_string(),
            min_core_version: "0.2.0".to_string(),
            ui: UiSpec::default(),
        };

        let json = manifest.to_json().unwrap();
        assert!(json.contains("\"min_core_version\": \"0.2.0\""));
        let loose = manifest.to_manifest().unwrap();
        assert_eq!(loose.name(), Some("demo"));
        assert_eq!(loose.version(), Some("0.1.0"));
    }
}
