//! The tool trait

use super::context::ExecutionContext;
use super::info::ToolInfo;
use crate::params::ParameterList;
use async_trait::async_trait;
use std::sync::Arc;

/// Why a tool's run body stopped without succeeding
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolFailure {
    /// Stopped at a checkpoint after a cancellation request or caller veto
    #[error("cancelled")]
    Cancelled,

    /// Internal fault with a displayable diagnostic
    #[error("{0}")]
    Error(String),
}

impl ToolFailure {
    pub fn error(message: impl Into<String>) -> Self {
        ToolFailure::Error(message.into())
    }
}

/// A self-contained geoprocessing algorithm exposed through the runtime
///
/// Implementations declare their parameters and provide the run body; the
/// execution engine owns validation, output binding, history recording, and
/// result translation. The run body must call
/// [`ExecutionContext::progress`] periodically and stop when it returns
/// `false`; that checkpoint is the only place cancellation is observed.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Descriptive metadata
    fn info(&self) -> &ToolInfo;

    /// Identifier within the owning library (convenience)
    fn id(&self) -> &str {
        &self.info().id
    }

    /// Display name (convenience)
    fn name(&self) -> &str {
        &self.info().name
    }

    /// A fresh copy of the declared parameter list.
    ///
    /// Each run gets its own copy; nothing set for one run leaks into the
    /// next.
    fn parameters(&self) -> ParameterList;

    /// The tool-specific computation.
    ///
    /// Called only after every parameter passed validation and outputs were
    /// bound. Mutates or produces data objects through the context's store.
    async fn run(
        &self,
        parameters: &mut ParameterList,
        ctx: &ExecutionContext,
    ) -> Result<(), ToolFailure>;
}

/// Shared tool handle
pub type BoxedTool = Arc<dyn Tool>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataKind, DataStore};
    use crate::params::Parameter;

    struct EchoTool {
        info: ToolInfo,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                info: ToolInfo::new("echo", "Echo").with_description("Repeats a message"),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn info(&self) -> &ToolInfo {
            &self.info
        }

        fn parameters(&self) -> ParameterList {
            ParameterList::new()
                .with(Parameter::text("message", "Message"))
                .with(Parameter::output("out", "Output Table", DataKind::Table))
        }

        async fn run(
            &self,
            parameters: &mut ParameterList,
            ctx: &ExecutionContext,
        ) -> Result<(), ToolFailure> {
            if !ctx.progress(0.5, "echoing") {
                return Err(ToolFailure::Cancelled);
            }
            let message = parameters
                .get("message")
                .and_then(|p| p.value.as_text().map(str::to_string))
                .ok_or_else(|| ToolFailure::error("message missing"))?;
            ctx.sink().message(&message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_consumes_bound_parameters() {
        let tool = EchoTool::new();
        let ctx = ExecutionContext::new(Arc::new(DataStore::new()));
        let mut params = tool.parameters();
        params
            .get_mut("message")
            .map(|p| p.set_value(serde_json::json!("hello")));

        assert!(tool.run(&mut params, &ctx).await.is_ok());
    }

    #[tokio::test]
    async fn run_stops_at_cancelled_checkpoint() {
        let tool = EchoTool::new();
        let ctx = ExecutionContext::new(Arc::new(DataStore::new()));
        ctx.cancellation().cancel();

        let mut params = tool.parameters();
        let result = tool.run(&mut params, &ctx).await;
        assert!(matches!(result, Err(ToolFailure::Cancelled)));
    }

    #[test]
    fn fresh_parameter_list_per_call() {
        let tool = EchoTool::new();
        let mut first = tool.parameters();
        first
            .get_mut("message")
            .map(|p| p.set_value(serde_json::json!("sticky?")));

        let second = tool.parameters();
        assert!(second.get("message").unwrap().value.is_empty());
    }
}
