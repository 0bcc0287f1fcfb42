//! Loader capability and its provided implementations

use super::library::ToolLibrary;
use super::manifest::{LibraryManifest, MANIFEST_EXTENSION};
use crate::tool::BoxedTool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Typed failure of one load attempt
///
/// Every kind carries enough detail for direct display; the manager records
/// these per candidate and never aborts a scan over one of them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// No loadable library at this path
    #[error("not a loadable library: {path}")]
    NotFound { path: String },

    /// Manifest declares an interface version this runtime does not speak
    #[error("incompatible library version: manifest api {found}, supported {supported}")]
    IncompatibleVersion { found: u32, supported: u32 },

    /// A constructor named by the manifest is not registered
    #[error("unresolved tool constructor: {symbol}")]
    SymbolResolutionFailed { symbol: String },

    /// Manifest exists but cannot be understood
    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    /// Another library already claimed this identifier
    #[error("duplicate library identifier: {id}")]
    DuplicateIdentifier { id: String },
}

impl LoadError {
    pub fn not_found(path: impl AsRef<Path>) -> Self {
        LoadError::NotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        LoadError::InvalidManifest {
            message: message.into(),
        }
    }
}

/// Loader capability the manager depends on
///
/// `is_candidate` filters a directory scan down to paths worth attempting;
/// `load` turns one candidate into a library or a typed failure.
pub trait LibraryLoader: Send + Sync {
    /// Whether a scanned path looks like something this loader handles
    fn is_candidate(&self, path: &Path) -> bool;

    /// Attempt to load the library at `path`
    fn load(&self, path: &Path) -> Result<ToolLibrary, LoadError>;
}

/// Constructor for one tool, registered under a manifest symbol name
pub type ToolFactory = Arc<dyn Fn() -> BoxedTool + Send + Sync>;

/// Loader for `*.toollib` manifest files
///
/// The dynamically-loaded analogue: a manifest names the tool constructors
/// it needs, and those are resolved against the factory table registered
/// here. A name with no registered factory fails the whole library with
/// `SymbolResolutionFailed`.
#[derive(Clone, Default)]
pub struct ManifestLoader {
    factories: HashMap<String, ToolFactory>,
}

impl std::fmt::Debug for ManifestLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestLoader")
            .field("symbols", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ManifestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool constructor under its manifest symbol name
    pub fn register(mut self, symbol: impl Into<String>, factory: ToolFactory) -> Self {
        self.factories.insert(symbol.into(), factory);
        self
    }

    /// Registered symbol names, for diagnostics
    pub fn symbols(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl LibraryLoader for ManifestLoader {
    fn is_candidate(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(MANIFEST_EXTENSION))
    }

    fn load(&self, path: &Path) -> Result<ToolLibrary, LoadError> {
        if !self.is_candidate(path) {
            return Err(LoadError::not_found(path));
        }

        let content =
            std::fs::read_to_string(path).map_err(|_| LoadError::not_found(path))?;
        let manifest = LibraryManifest::parse(&content)?;

        let mut library = ToolLibrary::new(&manifest.id, &manifest.version)
            .with_name(manifest.display_name())
            .with_description(&manifest.description)
            .with_path(path);

        for symbol in &manifest.tools {
            let factory =
                self.factories
                    .get(symbol)
                    .ok_or_else(|| LoadError::SymbolResolutionFailed {
                        symbol: symbol.clone(),
                    })?;
            library = library.with_tool(factory());
        }

        tracing::debug!(
            library = %manifest.id,
            tools = manifest.tools.len(),
            path = %path.display(),
            "loaded library manifest"
        );
        Ok(library)
    }
}

/// Loader over statically linked libraries
///
/// Libraries registered here are keyed by a virtual path; scans and loads
/// resolve against the in-memory table. Doubles as the test fake.
#[derive(Clone, Default)]
pub struct StaticLoader {
    libraries: HashMap<PathBuf, ToolLibrary>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a library under a virtual path
    pub fn register(mut self, path: impl Into<PathBuf>, library: ToolLibrary) -> Self {
        self.libraries.insert(path.into(), library);
        self
    }

    /// Virtual paths of every registered library
    pub fn paths(&self) -> Vec<&Path> {
        self.libraries.keys().map(PathBuf::as_path).collect()
    }
}

impl LibraryLoader for StaticLoader {
    fn is_candidate(&self, path: &Path) -> bool {
        self.libraries.contains_key(path)
    }

    fn load(&self, path: &Path) -> Result<ToolLibrary, LoadError> {
        self.libraries
            .get(path)
            .cloned()
            .map(|library| library.with_path(path))
            .ok_or_else(|| LoadError::not_found(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterList;
    use crate::tool::{ExecutionContext, Tool, ToolFailure, ToolInfo};
    use async_trait::async_trait;

    struct NoopTool {
        info: ToolInfo,
    }

    impl NoopTool {
        fn new(id: &str) -> Self {
            Self {
                info: ToolInfo::new(id, id),
            }
        }
    }

    #[async_trait]
    impl Tool for NoopTool {
        fn info(&self) -> &ToolInfo {
            &self.info
        }

        fn parameters(&self) -> ParameterList {
            ParameterList::new()
        }

        async fn run(
            &self,
            _parameters: &mut ParameterList,
            _ctx: &ExecutionContext,
        ) -> Result<(), ToolFailure> {
            Ok(())
        }
    }

    fn loader() -> ManifestLoader {
        ManifestLoader::new()
            .register("demo.noop", Arc::new(|| Arc::new(NoopTool::new("noop"))))
    }

    #[test]
    fn manifest_load_resolves_registered_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.toollib");
        std::fs::write(
            &path,
            "---\nid: demo\nversion: \"1.0\"\napi: 1\ntools:\n  - demo.noop\n---\nDemo tools.\n",
        )
        .unwrap();

        let library = loader().load(&path).unwrap();
        assert_eq!(library.id(), "demo");
        assert_eq!(library.tool_count(), 1);
        assert!(library.tool("noop").is_some());
        assert_eq!(library.path(), Some(path.as_path()));
    }

    #[test]
    fn unresolved_symbol_fails_the_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.toollib");
        std::fs::write(
            &path,
            "---\nid: demo\napi: 1\ntools:\n  - demo.missing\n---\n",
        )
        .unwrap();

        let result = loader().load(&path);
        assert!(matches!(
            result,
            Err(LoadError::SymbolResolutionFailed { symbol }) if symbol == "demo.missing"
        ));
    }

    #[test]
    fn foreign_files_are_not_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("readme.txt");
        std::fs::write(&readme, "not a library").unwrap();

        let loader = loader();
        assert!(!loader.is_candidate(&readme));
        assert!(matches!(
            loader.load(&readme),
            Err(LoadError::NotFound { .. })
        ));
    }

    #[test]
    fn static_loader_resolves_virtual_paths() {
        let library = ToolLibrary::new("builtin", "1.0")
            .with_tool(Arc::new(NoopTool::new("noop")));
        let loader = StaticLoader::new().register("builtin://demo", library);

        assert!(loader.is_candidate(Path::new("builtin://demo")));
        let loaded = loader.load(Path::new("builtin://demo")).unwrap();
        assert_eq!(loaded.id(), "builtin");
        assert!(loader.load(Path::new("builtin://other")).is_err());
    }
}
