use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use crate::config::TellusConfig;
use crate::data::DataStore;
use crate::engine::{ExecutionEngine, ExecutionOutcome, RunOptions};
use crate::error::Result;
use crate::library::{LibraryLoader, ToolLibrary};
use crate::manager::{InitReport, LoadOutcome, ToolLibraryManager};
use crate::messages::{SharedSink, TracingSink};

/// A fully wired runtime session.
///
/// Owns the data store, the library manager, and the execution engine, and
/// exposes the handful of calls embedders need: load libraries, look things
/// up, execute tools, and report what is loaded.
pub struct Environment {
    config: TellusConfig,
    manager: Arc<ToolLibraryManager>,
    store: Arc<DataStore>,
    engine: ExecutionEngine,
    sink: SharedSink,
}

impl Environment {
    /// Bootstrap a session.
    ///
    /// When `autoload` is on, scans the configured search paths with the
    /// given loader ([`TellusConfig::load`] already folds `TELLUS_TOOL_PATH`
    /// into them). The returned report says per candidate what happened; a
    /// failed candidate never fails the bootstrap.
    pub async fn initialize(
        config: TellusConfig,
        loader: &dyn LibraryLoader,
    ) -> Result<(Self, InitReport)> {
        Self::initialize_with_sink(config, loader, Arc::new(TracingSink)).await
    }

    pub async fn initialize_with_sink(
        config: TellusConfig,
        loader: &dyn LibraryLoader,
        sink: SharedSink,
    ) -> Result<(Self, InitReport)> {
        let manager = Arc::new(ToolLibraryManager::new());
        let store = Arc::new(DataStore::new());
        let engine = ExecutionEngine::new(Arc::clone(&manager), Arc::clone(&store))
            .with_sink(Arc::clone(&sink));

        let report = if config.autoload {
            manager
                .scan(loader, &config.search_paths, config.recursive_scan)
                .await
        } else {
            InitReport::default()
        };

        if config.verbose {
            for line in report.summary_lines() {
                sink.message(&line);
            }
            for warning in report.warnings() {
                sink.warning(warning);
            }
        }

        info!(
            libraries = manager.library_count().await,
            tools = manager.tool_count().await,
            "environment initialized"
        );

        let environment = Self {
            config,
            manager,
            store,
            engine,
            sink,
        };
        Ok((environment, report))
    }

    pub fn config(&self) -> &TellusConfig {
        &self.config
    }

    pub fn manager(&self) -> Arc<ToolLibraryManager> {
        Arc::clone(&self.manager)
    }

    pub fn store(&self) -> Arc<DataStore> {
        Arc::clone(&self.store)
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    pub fn sink(&self) -> &dyn crate::messages::MessageSink {
        self.sink.as_ref()
    }

    /// Register a statically linked library.
    pub async fn register(&self, library: ToolLibrary) -> LoadOutcome {
        self.manager.register(library).await
    }

    /// Execute a tool by library and tool identifier.
    pub async fn execute(
        &self,
        library: &str,
        tool: &str,
        values: Map<String, Value>,
        options: RunOptions,
    ) -> ExecutionOutcome {
        self.engine.execute(library, tool, values, options).await
    }

    /// Human-readable summary of the session: version line plus loaded
    /// library and tool counts. A pure read, safe to call at any time.
    pub async fn version_summary(&self) -> Vec<String> {
        let libraries = self.manager.library_count().await;
        let tools = self.manager.tool_count().await;
        vec![
            format!("Tellus {}", crate::VERSION),
            format!("{libraries} tool libraries, {tools} tools loaded"),
        ]
    }

    /// Write the version summary through the message sink.
    pub async fn report_version(&self) {
        for line in self.version_summary().await {
            self.sink.message(&line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataKind;
    use crate::library::StaticLoader;
    use crate::params::{Parameter, ParameterList};
    use crate::tool::{ExecutionContext, Tool, ToolFailure, ToolInfo};
    use async_trait::async_trait;
    use serde_json::json;

    struct Renamer {
        info: ToolInfo,
    }

    impl Renamer {
        fn new() -> Self {
            Self {
                info: ToolInfo::new("rename", "Rename Object"),
            }
        }
    }

    #[async_trait]
    impl Tool for Renamer {
        fn info(&self) -> &ToolInfo {
            &self.info
        }

        fn parameters(&self) -> ParameterList {
            ParameterList::new()
                .with(Parameter::text("name", "New name"))
                .with(Parameter::output("result", "Result", DataKind::Table))
        }

        async fn run(
            &self,
            parameters: &mut ParameterList,
            ctx: &ExecutionContext,
        ) -> std::result::Result<(), ToolFailure> {
            let name = parameters
                .get("name")
                .and_then(|p| p.value.as_text())
                .ok_or_else(|| ToolFailure::error("name not bound"))?
                .to_string();
            let object = parameters
                .get("result")
                .and_then(|p| p.value.as_object())
                .and_then(|id| ctx.store().get(id))
                .ok_or_else(|| ToolFailure::error("result not bound"))?;
            match object.lock() {
                Ok(mut guard) => guard.set_name(name),
                Err(poisoned) => poisoned.into_inner().set_name(name),
            }
            Ok(())
        }
    }

    fn demo_loader() -> StaticLoader {
        let library = ToolLibrary::new("demo", "1.0")
            .with_name("Demo Tools")
            .with_tool(Arc::new(Renamer::new()));
        StaticLoader::new().register("static://demo", library)
    }

    #[tokio::test]
    async fn initialize_scans_and_reports() {
        let config = TellusConfig::default()
            .with_search_path("static://")
            .with_autoload(true);
        let loader = demo_loader();

        let (env, report) = Environment::initialize(config, &loader).await.unwrap();
        // "static://" is not a real directory, so the scan warns instead of
        // loading; registration still works explicitly.
        assert!(!report.warnings().is_empty());
        assert_eq!(env.manager.library_count().await, 0);

        let outcome = env
            .register(
                ToolLibrary::new("demo", "1.0").with_tool(Arc::new(Renamer::new())),
            )
            .await;
        assert!(outcome.is_loaded());
        assert_eq!(env.manager.tool_count().await, 1);
    }

    #[tokio::test]
    async fn verbose_init_emits_candidate_lines_through_the_sink() {
        use crate::messages::{BufferSink, MessageLevel};

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "not a library").unwrap();

        let config = TellusConfig::default()
            .with_search_path(dir.path())
            .with_verbose(true);
        let loader = demo_loader();
        let sink = Arc::new(BufferSink::new());

        let (_env, report) =
            Environment::initialize_with_sink(config, &loader, sink.clone() as SharedSink)
                .await
                .unwrap();

        assert_eq!(report.failed_count(), 1);
        assert!(sink
            .with_level(MessageLevel::Info)
            .iter()
            .any(|m| m.contains("readme.txt")));
    }

    #[tokio::test]
    async fn autoload_off_skips_scanning() {
        let config = TellusConfig::default().with_autoload(false);
        let loader = demo_loader();

        let (_env, report) = Environment::initialize(config, &loader).await.unwrap();
        assert!(report.candidates().is_empty());
        assert!(report.warnings().is_empty());
    }

    #[tokio::test]
    async fn version_summary_counts_loaded_tools() {
        let config = TellusConfig::default().with_autoload(false);
        let loader = demo_loader();
        let (env, _) = Environment::initialize(config, &loader).await.unwrap();

        env.register(
            ToolLibrary::new("demo", "1.0").with_tool(Arc::new(Renamer::new())),
        )
        .await;

        let lines = env.version_summary().await;
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Tellus "));
        assert_eq!(lines[1], "1 tool libraries, 1 tools loaded");
    }

    #[tokio::test]
    async fn execute_through_environment() {
        let config = TellusConfig::default().with_autoload(false);
        let loader = demo_loader();
        let (env, _) = Environment::initialize(config, &loader).await.unwrap();
        env.register(
            ToolLibrary::new("demo", "1.0").with_tool(Arc::new(Renamer::new())),
        )
        .await;

        let mut values = Map::new();
        values.insert("name".into(), json!("elevation"));
        let outcome = env
            .execute("demo", "rename", values, RunOptions::default())
            .await;
        assert!(outcome.is_success());

        let object = env.store().get(outcome.outputs[0]).unwrap();
        let guard = object.lock().unwrap();
        assert_eq!(guard.name(), Some("elevation"));
    }
}
