//! The library registry

use super::in_flight::InFlight;
use super::report::{InitReport, LoadOutcome};
use crate::error::{Result, TellusError};
use crate::library::{LibraryLoader, ToolLibrary};
use crate::tool::{BoxedTool, ToolInfo};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-wide registry and loader of tool libraries
pub struct ToolLibraryManager {
    registry: RwLock<Registry>,
    in_flight: Arc<InFlight>,
}

#[derive(Default)]
struct Registry {
    /// Libraries by identifier; a later load with the same identifier wins
    libraries: HashMap<String, Arc<ToolLibrary>>,
    /// Resolved path -> identifier, for idempotent re-initialization
    paths: HashMap<PathBuf, String>,
}

impl Default for ToolLibraryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolLibraryManager {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            in_flight: InFlight::new(),
        }
    }

    /// Execution tracker shared with the engine
    pub fn in_flight(&self) -> Arc<InFlight> {
        Arc::clone(&self.in_flight)
    }

    /// Scan search paths and attempt a load per candidate.
    ///
    /// Partial success is the normal case: one bad candidate never aborts
    /// the scan, it only contributes a failed report line. Re-scanning a
    /// path whose libraries are already registered reports `AlreadyLoaded`
    /// and changes nothing.
    pub async fn scan(
        &self,
        loader: &dyn LibraryLoader,
        search_paths: &[PathBuf],
        recursive: bool,
    ) -> InitReport {
        let mut report = InitReport::new();
        for path in search_paths {
            if !path.is_dir() {
                report.warn(format!("search path is not a directory: {}", path.display()));
                continue;
            }
            for candidate in collect_candidates(path, recursive) {
                let outcome = self.load_candidate(loader, &candidate).await;
                report_outcome(&mut report, &candidate, outcome);
            }
        }
        report
    }

    /// Attempt a single load and register the result
    pub async fn load(&self, loader: &dyn LibraryLoader, path: &Path) -> LoadOutcome {
        self.load_candidate(loader, path).await
    }

    async fn load_candidate(&self, loader: &dyn LibraryLoader, path: &Path) -> LoadOutcome {
        let resolved = resolve(path);

        {
            let registry = self.registry.read().await;
            if let Some(id) = registry.paths.get(&resolved) {
                return LoadOutcome::AlreadyLoaded {
                    library: id.clone(),
                };
            }
        }

        let library = if loader.is_candidate(path) {
            match loader.load(path) {
                Ok(library) => library,
                Err(error) => return LoadOutcome::failed(error),
            }
        } else {
            return LoadOutcome::failed(crate::library::LoadError::not_found(path));
        };

        self.register_loaded(library, resolved).await
    }

    /// Register a statically linked library directly
    pub async fn register(&self, library: ToolLibrary) -> LoadOutcome {
        let resolved = library
            .path()
            .map(resolve)
            .unwrap_or_else(|| PathBuf::from(format!("static://{}", library.id())));

        {
            let registry = self.registry.read().await;
            if let Some(id) = registry.paths.get(&resolved) {
                return LoadOutcome::AlreadyLoaded {
                    library: id.clone(),
                };
            }
        }

        self.register_loaded(library, resolved).await
    }

    async fn register_loaded(&self, library: ToolLibrary, resolved: PathBuf) -> LoadOutcome {
        let id = library.id().to_string();
        let tools = library.tool_count();
        let mut registry = self.registry.write().await;

        let previous = registry.libraries.insert(id.clone(), Arc::new(library));
        registry.paths.retain(|_, lib_id| lib_id != &id);
        registry.paths.insert(resolved, id.clone());

        match previous {
            Some(old) => {
                let previous_path = old.path().map(Path::to_path_buf);
                tracing::warn!(
                    library = %id,
                    previous = ?previous_path,
                    "library identifier reclaimed, last-loaded wins"
                );
                LoadOutcome::Replaced {
                    library: id,
                    previous_path,
                }
            }
            None => LoadOutcome::Loaded { library: id, tools },
        }
    }

    /// Unload a library, invalidating every lookup of its tools.
    ///
    /// Fails with `InUse` while any tool from the library is mid-execution.
    pub async fn unload(&self, id: &str) -> Result<()> {
        if self.in_flight.library_active(id) {
            return Err(TellusError::InUse(id.to_string()));
        }
        let mut registry = self.registry.write().await;
        if registry.libraries.remove(id).is_none() {
            return Err(TellusError::LibraryNotFound(id.to_string()));
        }
        registry.paths.retain(|_, lib_id| lib_id != id);
        tracing::info!(library = %id, "library unloaded");
        Ok(())
    }

    /// Look up a tool by library and tool identifier
    pub async fn find(&self, library: &str, tool: &str) -> Option<BoxedTool> {
        let registry = self.registry.read().await;
        registry.libraries.get(library)?.tool(tool)
    }

    /// A registered library by identifier
    pub async fn library(&self, id: &str) -> Option<Arc<ToolLibrary>> {
        self.registry.read().await.libraries.get(id).cloned()
    }

    /// Snapshot of the registered libraries at call time
    ///
    /// Later loads and unloads do not affect an already produced snapshot.
    pub async fn list_libraries(&self) -> Vec<Arc<ToolLibrary>> {
        let registry = self.registry.read().await;
        let mut libraries: Vec<_> = registry.libraries.values().cloned().collect();
        libraries.sort_by(|a, b| a.id().cmp(b.id()));
        libraries
    }

    /// Snapshot of one library's tool metadata
    pub async fn list_tools(&self, library: &str) -> Option<Vec<ToolInfo>> {
        let registry = self.registry.read().await;
        registry.libraries.get(library).map(|l| l.tool_infos())
    }

    /// Number of registered libraries
    pub async fn library_count(&self) -> usize {
        self.registry.read().await.libraries.len()
    }

    /// Number of tools across all registered libraries
    pub async fn tool_count(&self) -> usize {
        let registry = self.registry.read().await;
        registry.libraries.values().map(|l| l.tool_count()).sum()
    }
}

/// Canonicalize where possible; virtual paths stay as-is
fn resolve(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn report_outcome(report: &mut InitReport, path: &Path, outcome: LoadOutcome) {
    if let LoadOutcome::Replaced { library, previous_path } = &outcome {
        // Policy downgrades the duplicate to a warning: last-loaded wins.
        let duplicate = crate::library::LoadError::DuplicateIdentifier {
            id: library.clone(),
        };
        report.warn(format!(
            "{}; tools from {} are no longer reachable",
            duplicate,
            previous_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "an earlier load".to_string()),
        ));
    }
    report.push(path, outcome);
}

/// All regular files under a search path, sorted for deterministic reports
fn collect_candidates(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut queue = vec![dir.to_path_buf()];
    while let Some(current) = queue.pop() {
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if recursive {
                    queue.push(path);
                }
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{LoadError, StaticLoader};
    use crate::params::ParameterList;
    use crate::tool::{ExecutionContext, Tool, ToolFailure, ToolInfo};
    use async_trait::async_trait;

    struct NoopTool {
        info: ToolInfo,
    }

    impl NoopTool {
        fn boxed(id: &str) -> BoxedTool {
            Arc::new(Self {
                info: ToolInfo::new(id, id),
            })
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
        ) -> std::result::Result<(), ToolFailure> {
            Ok(())
        }
    }

    fn library(id: &str, tools: &[&str]) -> ToolLibrary {
        tools.iter().fold(ToolLibrary::new(id, "1.0"), |lib, t| {
            lib.with_tool(NoopTool::boxed(t))
        })
    }

    #[tokio::test]
    async fn register_find_unload_roundtrip() {
        let manager = ToolLibraryManager::new();
        manager.register(library("terrain", &["slope", "aspect"])).await;

        assert!(manager.find("terrain", "slope").await.is_some());
        assert_eq!(manager.library_count().await, 1);
        assert_eq!(manager.tool_count().await, 2);

        manager.unload("terrain").await.unwrap();
        assert!(manager.find("terrain", "slope").await.is_none());
        assert!(matches!(
            manager.unload("terrain").await,
            Err(TellusError::LibraryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn loading_same_path_twice_reports_already_loaded() {
        let manager = ToolLibraryManager::new();
        let loader = StaticLoader::new().register("static://demo", library("demo", &["noop"]));
        let path = Path::new("static://demo");

        let first = manager.load(&loader, path).await;
        assert!(matches!(first, LoadOutcome::Loaded { .. }));

        let second = manager.load(&loader, path).await;
        assert!(matches!(second, LoadOutcome::AlreadyLoaded { library } if library == "demo"));
        assert_eq!(manager.library_count().await, 1);
    }

    #[tokio::test]
    async fn identifier_collision_last_loaded_wins_with_warning() {
        let manager = ToolLibraryManager::new();
        let loader = StaticLoader::new()
            .register("static://a", library("terrain", &["slope"]))
            .register("static://b", library("terrain", &["curvature"]));

        let mut report = InitReport::new();
        let first = manager.load(&loader, Path::new("static://a")).await;
        report_outcome(&mut report, Path::new("static://a"), first);
        let second = manager.load(&loader, Path::new("static://b")).await;
        report_outcome(&mut report, Path::new("static://b"), second);

        // Last loaded wins; the first library's tools are unreachable.
        assert!(manager.find("terrain", "curvature").await.is_some());
        assert!(manager.find("terrain", "slope").await.is_none());
        assert_eq!(manager.library_count().await, 1);
        assert_eq!(report.warnings().len(), 1);
        assert!(report.warnings()[0].contains("duplicate library identifier: terrain"));
    }

    #[tokio::test]
    async fn unload_refused_while_in_flight() {
        let manager = ToolLibraryManager::new();
        manager.register(library("terrain", &["slope"])).await;

        let guard = manager.in_flight().begin("terrain", "slope").unwrap();
        assert!(matches!(
            manager.unload("terrain").await,
            Err(TellusError::InUse(_))
        ));

        drop(guard);
        assert!(manager.unload("terrain").await.is_ok());
    }

    #[tokio::test]
    async fn scan_mixes_successes_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("grid_filters.toollib"),
            "---\nid: grid_filters\napi: 1\ntools: []\n---\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("readme.txt"), "hello").unwrap();

        let manager = ToolLibraryManager::new();
        let loader = crate::library::ManifestLoader::new();
        let report = manager
            .scan(&loader, &[dir.path().to_path_buf()], false)
            .await;

        assert_eq!(report.loaded_count(), 1);
        assert_eq!(report.failed_count(), 1);
        let readme = dir.path().join("readme.txt");
        assert!(matches!(
            report.outcome_for(&readme),
            Some(LoadOutcome::Failed { error: Some(LoadError::NotFound { .. }), .. })
        ));
        assert_eq!(manager.library_count().await, 1);
        assert!(manager.library("grid_filters").await.is_some());
    }

    #[tokio::test]
    async fn rescan_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("demo.toollib"),
            "---\nid: demo\napi: 1\ntools: []\n---\n",
        )
        .unwrap();

        let manager = ToolLibraryManager::new();
        let loader = crate::library::ManifestLoader::new();
        let paths = vec![dir.path().to_path_buf()];

        let first = manager.scan(&loader, &paths, false).await;
        assert_eq!(first.loaded_count(), 1);

        let second = manager.scan(&loader, &paths, false).await;
        assert_eq!(second.loaded_count(), 0);
        let manifest = dir.path().join("demo.toollib");
        assert!(matches!(
            second.outcome_for(&manifest),
            Some(LoadOutcome::AlreadyLoaded { .. })
        ));
        assert_eq!(manager.library_count().await, 1);
    }

    #[tokio::test]
    async fn snapshots_do_not_track_later_changes() {
        let manager = ToolLibraryManager::new();
        manager.register(library("a", &["x"])).await;

        let snapshot = manager.list_libraries().await;
        manager.register(library("b", &["y"])).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(manager.list_libraries().await.len(), 2);
    }
}
