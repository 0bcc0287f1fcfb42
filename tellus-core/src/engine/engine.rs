use std::sync::{Arc, MutexGuard};
use std::time::Instant;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::outcome::{ExecutionOutcome, ExecutionStatus};
use crate::data::{DataObject, DataStore, HistoryEntry, ObjectId, SharedObject};
use crate::error::TellusError;
use crate::manager::ToolLibraryManager;
use crate::messages::{SharedSink, TracingSink};
use crate::params::{ParameterKind, ParameterList, ParameterValue};
use crate::tool::{ExecutionContext, ProgressCallback, RunState, ToolFailure};

/// Per-run knobs supplied by the caller.
#[derive(Clone, Default)]
pub struct RunOptions {
    /// External cancellation handle; a fresh, never-cancelled token when
    /// the caller does not care.
    pub cancellation: CancellationToken,
    /// Optional veto callback, polled at every progress checkpoint.
    pub progress: Option<ProgressCallback>,
}

impl RunOptions {
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }
}

/// Drives one tool run from raw values to a terminal outcome.
///
/// The engine owns everything around the run body: parameter binding and
/// validation, output creation and claiming, cancellation plumbing, and
/// writing provenance into the produced objects. Tools never see any of it.
pub struct ExecutionEngine {
    manager: Arc<ToolLibraryManager>,
    store: Arc<DataStore>,
    sink: SharedSink,
}

impl ExecutionEngine {
    pub fn new(manager: Arc<ToolLibraryManager>, store: Arc<DataStore>) -> Self {
        Self {
            manager,
            store,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn store(&self) -> Arc<DataStore> {
        Arc::clone(&self.store)
    }

    pub fn manager(&self) -> Arc<ToolLibraryManager> {
        Arc::clone(&self.manager)
    }

    /// Execute one tool with the given raw parameter values.
    ///
    /// Runs on the calling task; concurrency is the caller's choice. The
    /// same tool instance never runs twice at once: a second call while
    /// one is active comes back immediately with [`ExecutionStatus::Busy`].
    pub async fn execute(
        &self,
        library: &str,
        tool: &str,
        values: Map<String, Value>,
        options: RunOptions,
    ) -> ExecutionOutcome {
        let started = Instant::now();
        let finish = |status: ExecutionStatus, state: RunState, outputs: Vec<ObjectId>| {
            ExecutionOutcome {
                library: library.to_string(),
                tool: tool.to_string(),
                status,
                state,
                outputs,
                elapsed: started.elapsed(),
            }
        };

        // Take the run slot before resolving the tool. The in-flight mark
        // is what blocks unload, so marking first leaves no window where a
        // resolved tool could outlive its library's registration.
        let Some(_guard) = self.manager.in_flight().begin(library, tool) else {
            warn!(library, tool, "tool is already executing");
            return finish(ExecutionStatus::Busy, RunState::Created, Vec::new());
        };

        let Some(tool_impl) = self.manager.find(library, tool).await else {
            debug!(library, tool, "tool not found");
            return finish(
                ExecutionStatus::NotFound {
                    library: library.to_string(),
                    tool: tool.to_string(),
                },
                RunState::Created,
                Vec::new(),
            );
        };

        // Bind and validate together: a failed coercion must not hide the
        // constraint violations still present elsewhere in the list.
        let mut params = tool_impl.parameters();
        let mut report = params.bind(&values);
        report.merge(params.validate(&self.store));
        if !report.is_ok() {
            self.sink.error(&format!(
                "{library}.{tool}: validation failed with {} issue(s)",
                report.len()
            ));
            return finish(
                ExecutionStatus::InvalidParameters { report },
                RunState::Failed,
                Vec::new(),
            );
        }

        // Create objects for required outputs the caller left unbound, then
        // claim every output target so no concurrent run writes into it.
        let created = self.create_missing_outputs(&mut params);
        let outputs = bound_outputs(&params);
        let mut claimed: Vec<ObjectId> = Vec::with_capacity(outputs.len());
        for id in &outputs {
            match self.store.claim_output(*id) {
                Ok(()) => claimed.push(*id),
                Err(err) => {
                    for held in &claimed {
                        self.store.release_output(*held);
                    }
                    // Nothing ran yet; objects created for this run only
                    // must not outlive it.
                    for fresh in &created {
                        let _ = self.store.release(*fresh);
                    }
                    let object = match &err {
                        TellusError::ObjectBusy(name) => name.clone(),
                        _ => id.to_string(),
                    };
                    self.sink
                        .error(&format!("{library}.{tool}: output object {object} is busy"));
                    return finish(
                        ExecutionStatus::ObjectBusy { object },
                        RunState::Failed,
                        Vec::new(),
                    );
                }
            }
        }

        debug_assert!(RunState::Validating.can_transition_to(RunState::Running));
        info!(library, tool, "executing");
        self.sink.message(&format!("Executing {library}.{tool}"));

        let mut ctx = ExecutionContext::new(Arc::clone(&self.store))
            .with_sink(Arc::clone(&self.sink))
            .with_cancellation(options.cancellation);
        if let Some(progress) = options.progress {
            ctx = ctx.with_progress(progress);
        }

        let result = tool_impl.run(&mut params, &ctx).await;

        for id in &claimed {
            self.store.release_output(*id);
        }

        match result {
            Ok(()) => {
                let snapshot = params.snapshot();
                let produced = bound_outputs(&params);
                for id in &produced {
                    if let Some(object) = self.store.get(*id) {
                        lock_object(&object).record_history(HistoryEntry::new(
                            library,
                            tool,
                            snapshot.clone(),
                        ));
                    }
                }
                info!(library, tool, outputs = produced.len(), "run succeeded");
                self.sink.message(&format!("{library}.{tool}: done"));
                finish(ExecutionStatus::Succeeded, RunState::Succeeded, produced)
            }
            Err(ToolFailure::Cancelled) => {
                info!(library, tool, "run cancelled");
                self.sink.warning(&format!("{library}.{tool}: cancelled"));
                finish(ExecutionStatus::Cancelled, RunState::Cancelled, Vec::new())
            }
            Err(ToolFailure::Error(message)) => {
                warn!(library, tool, error = %message, "run failed");
                self.sink.error(&format!("{library}.{tool}: {message}"));
                finish(
                    ExecutionStatus::Failed { message },
                    RunState::Failed,
                    Vec::new(),
                )
            }
        }
    }

    /// Bind a fresh data object to every required output parameter the
    /// caller left empty, returning the created identifiers. Optional
    /// outputs left empty are simply not produced.
    fn create_missing_outputs(&self, params: &mut ParameterList) -> Vec<ObjectId> {
        let pending: Vec<(String, crate::data::DataKind)> = params
            .outputs()
            .iter()
            .filter(|p| p.required && matches!(p.value, ParameterValue::Empty))
            .filter_map(|p| match &p.kind {
                ParameterKind::Output { data } => Some((p.id.clone(), *data)),
                _ => None,
            })
            .collect();

        let mut created = Vec::with_capacity(pending.len());
        for (param_id, kind) in pending {
            let shared = self.store.create(kind);
            let object_id = lock_object(&shared).id();
            if let Some(param) = params.get_mut(&param_id) {
                param.set_object(object_id);
                created.push(object_id);
            }
        }
        created
    }
}

fn bound_outputs(params: &ParameterList) -> Vec<ObjectId> {
    params
        .outputs()
        .iter()
        .filter_map(|p| p.value.as_object())
        .collect()
}

fn lock_object(object: &SharedObject) -> MutexGuard<'_, DataObject> {
    match object.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
