//! The tool library container

use crate::tool::{BoxedTool, ToolInfo};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A named, versioned collection of tools, loaded as a unit
#[derive(Clone)]
pub struct ToolLibrary {
    id: String,
    name: String,
    description: String,
    version: String,
    path: Option<PathBuf>,
    tools: Vec<BoxedTool>,
}

impl std::fmt::Debug for ToolLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolLibrary")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("path", &self.path)
            .field("tool_count", &self.tools.len())
            .finish()
    }
}

impl ToolLibrary {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            version: version.into(),
            path: None,
            tools: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Append a tool; declaration order is preserved
    pub fn with_tool(mut self, tool: BoxedTool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// File-system origin, if the library was loaded from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Tools in declaration order
    pub fn tools(&self) -> &[BoxedTool] {
        &self.tools
    }

    /// Look up a tool by its library-scoped identifier
    pub fn tool(&self, id: &str) -> Option<BoxedTool> {
        self.tools.iter().find(|t| t.id() == id).map(Arc::clone)
    }

    /// Metadata of every tool, for listings
    pub fn tool_infos(&self) -> Vec<ToolInfo> {
        self.tools.iter().map(|t| t.info().clone()).collect()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}
