//! Library manifest format
//!
//! A loadable library candidate on disk is a `*.toollib` file: YAML
//! frontmatter naming the library and the tool constructors it needs,
//! followed by an optional markdown description body.
//!
//! ```text
//! ---
//! id: grid_filters
//! name: Grid Filters
//! version: "1.3"
//! api: 1
//! tools:
//!   - grid_filters.smooth
//!   - grid_filters.slope
//! ---
//!
//! Simple raster filter tools.
//! ```

use super::loader::LoadError;
use serde::{Deserialize, Serialize};

/// File extension marking a manifest candidate
pub const MANIFEST_EXTENSION: &str = "toollib";

/// Manifest interface version this runtime understands
pub const SUPPORTED_API: u32 = 1;

/// Parsed manifest frontmatter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryManifest {
    /// Library identifier, unique per registry
    pub id: String,

    /// Display name; defaults to the identifier
    #[serde(default)]
    pub name: Option<String>,

    /// Library version string
    #[serde(default = "default_version")]
    pub version: String,

    /// Manifest interface version
    pub api: u32,

    /// Constructor names resolved against the process-registered factories
    #[serde(default)]
    pub tools: Vec<String>,

    /// Description body following the frontmatter (not part of the YAML)
    #[serde(skip)]
    pub description: String,
}

fn default_version() -> String {
    "0.0".to_string()
}

impl LibraryManifest {
    /// Parse manifest content: YAML frontmatter between `---` fences plus
    /// an optional description body
    pub fn parse(content: &str) -> Result<Self, LoadError> {
        let content = content.trim_start();
        if !content.starts_with("---") {
            return Err(LoadError::invalid_manifest(
                "manifest must start with YAML frontmatter (---)",
            ));
        }

        let rest = &content[3..];
        let end = rest.find("\n---").ok_or_else(|| {
            LoadError::invalid_manifest("manifest frontmatter not closed (---)")
        })?;

        let frontmatter = &rest[..end];
        let body = rest[end + 4..].trim();

        let mut manifest: LibraryManifest = serde_yaml::from_str(frontmatter)
            .map_err(|e| LoadError::invalid_manifest(format!("bad frontmatter: {}", e)))?;
        manifest.description = body.to_string();

        if manifest.id.trim().is_empty() {
            return Err(LoadError::invalid_manifest("library id must not be empty"));
        }
        if manifest.api != SUPPORTED_API {
            return Err(LoadError::IncompatibleVersion {
                found: manifest.api,
                supported: SUPPORTED_API,
            });
        }

        Ok(manifest)
    }

    /// Display name, falling back to the identifier
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"---
id: grid_filters
name: Grid Filters
version: "1.3"
api: 1
tools:
  - grid_filters.smooth
  - grid_filters.slope
---

Simple raster filter tools.
"#;

    #[test]
    fn parses_frontmatter_and_body() {
        let manifest = LibraryManifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.id, "grid_filters");
        assert_eq!(manifest.display_name(), "Grid Filters");
        assert_eq!(manifest.version, "1.3");
        assert_eq!(manifest.tools.len(), 2);
        assert!(manifest.description.contains("raster filter"));
    }

    #[test]
    fn rejects_missing_frontmatter() {
        assert!(matches!(
            LibraryManifest::parse("just some text"),
            Err(LoadError::InvalidManifest { .. })
        ));
    }

    #[test]
    fn rejects_unsupported_api() {
        let content = "---\nid: x\napi: 99\n---\n";
        assert!(matches!(
            LibraryManifest::parse(content),
            Err(LoadError::IncompatibleVersion { found: 99, .. })
        ));
    }

    #[test]
    fn rejects_empty_identifier() {
        let content = "---\nid: \"\"\napi: 1\n---\n";
        assert!(matches!(
            LibraryManifest::parse(content),
            Err(LoadError::InvalidManifest { .. })
        ));
    }
}
