//! Tool metadata for discovery and display

use serde::{Deserialize, Serialize};

/// Descriptive metadata of a tool, immutable once its library is loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Identifier, unique within the owning library
    pub id: String,

    /// Human-readable display name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Category shown by tool browsers, e.g. "Grid|Filters"
    pub category: Option<String>,

    /// Author attribution
    pub author: Option<String>,

    /// Tool version
    pub version: Option<String>,
}

impl ToolInfo {
    /// Create metadata with the required fields
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: None,
            author: None,
            version: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_fields() {
        let info = ToolInfo::new("slope", "Slope")
            .with_description("Local slope from a grid")
            .with_category("Terrain|Morphometry")
            .with_author("O. Conrad")
            .with_version("1.2");

        assert_eq!(info.id, "slope");
        assert_eq!(info.category.as_deref(), Some("Terrain|Morphometry"));
        assert!(info.version.is_some());
    }
}
