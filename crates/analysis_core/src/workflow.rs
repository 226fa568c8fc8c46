//! Simulated Processing Workflow: one run at a time, driven by an [`AnalysisBackend`] task
//! whose progress is applied in order and discarded once the run is closed or superseded.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use shared::{
    domain::{DisplayRef, FileRef, ProcessingStatus, RunId},
    protocol::{PhaseProgress, WorkflowEvent},
};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::{
    backend::{
        AnalysisBackend, AnalysisOutput, AnalysisRequest, ProgressReporter,
        PROGRESS_CHANNEL_CAPACITY,
    },
    display::DisplayRefProvider,
    record::ProcessingRecord,
};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("no files to process")]
    NoInput,
    #[error("no processing run is active")]
    NoActiveRun,
    #[error("run is {status:?}; only failed runs can be retried")]
    NotRetryable { status: ProcessingStatus },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingSnapshot {
    pub run_id: RunId,
    pub file: FileRef,
    pub staged_count: usize,
    pub record: ProcessingRecord,
}

struct ActiveRun {
    run_id: RunId,
    files: Vec<FileRef>,
    record: ProcessingRecord,
    /// Dropping this tells the run task to stop.
    cancel: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct WorkflowState {
    last_run_id: i64,
    active: Option<ActiveRun>,
}

pub struct ProcessingWorkflow {
    backend: Arc<dyn AnalysisBackend>,
    display_refs: Arc<dyn DisplayRefProvider>,
    state: Arc<Mutex<WorkflowState>>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl ProcessingWorkflow {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        display_refs: Arc<dyn DisplayRefProvider>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            display_refs,
            state: Arc::new(Mutex::new(WorkflowState::default())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    /// Starts a run visualizing `files[0]`, superseding any earlier run.
    pub async fn start(&self, files: Vec<FileRef>) -> Result<RunId, WorkflowError> {
        let Some(first) = files.first().cloned() else {
            return Err(WorkflowError::NoInput);
        };

        let mut state = self.state.lock().await;
        if let Some(previous) = state.active.take() {
            debug!(run_id = %previous.run_id, "superseding previous run");
            teardown(previous, self.display_refs.as_ref(), &self.events);
        }

        state.last_run_id += 1;
        let run_id = RunId(state.last_run_id);
        info!(
            run_id = %run_id,
            file_name = %first.name,
            staged = files.len(),
            "starting processing run"
        );
        let _ = self.events.send(WorkflowEvent::RunStarted {
            run_id,
            file_name: first.name.clone(),
            staged_count: files.len(),
            started_at: Utc::now(),
        });

        let run = match self.display_refs.acquire(&first) {
            Ok(original) => {
                let record = ProcessingRecord::new(Some(original));
                let _ = self.events.send(WorkflowEvent::StatusChanged {
                    run_id,
                    status: record.status(),
                    progress: record.progress(),
                });
                let ctx = RunContext {
                    run_id,
                    state: Arc::clone(&self.state),
                    events: self.events.clone(),
                    display_refs: Arc::clone(&self.display_refs),
                };
                let request = AnalysisRequest {
                    file: first,
                    original,
                };
                let (cancel, cancelled) = oneshot::channel();
                tokio::spawn(drive_run(
                    ctx,
                    Arc::clone(&self.backend),
                    request,
                    cancelled,
                ));
                ActiveRun {
                    run_id,
                    files,
                    record,
                    cancel: Some(cancel),
                }
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(run_id = %run_id, error = %reason, "could not acquire display reference");
                let mut record = ProcessingRecord::new(None);
                record.fail(reason.clone());
                let _ = self.events.send(WorkflowEvent::Failed { run_id, reason });
                ActiveRun {
                    run_id,
                    files,
                    record,
                    cancel: None,
                }
            }
        };
        state.active = Some(run);
        Ok(run_id)
    }

    /// Re-enters the workflow with the files of a failed run.
    pub async fn retry(&self) -> Result<RunId, WorkflowError> {
        let files = {
            let state = self.state.lock().await;
            let run = state.active.as_ref().ok_or(WorkflowError::NoActiveRun)?;
            let status = run.record.status();
            if status != ProcessingStatus::Failed {
                return Err(WorkflowError::NotRetryable { status });
            }
            run.files.clone()
        };
        info!("retrying failed run");
        self.start(files).await
    }

    /// Cancels the active run and releases its display references.
    pub async fn close(&self) -> Option<RunId> {
        let run = self.state.lock().await.active.take()?;
        let run_id = run.run_id;
        teardown(run, self.display_refs.as_ref(), &self.events);
        Some(run_id)
    }

    pub async fn snapshot(&self) -> Option<ProcessingSnapshot> {
        let state = self.state.lock().await;
        state.active.as_ref().and_then(|run| {
            run.files.first().map(|file| ProcessingSnapshot {
                run_id: run.run_id,
                file: file.clone(),
                staged_count: run.files.len(),
                record: run.record.clone(),
            })
        })
    }
}

impl Drop for ProcessingWorkflow {
    fn drop(&mut self) {
        let Ok(mut state) = self.state.try_lock() else {
            warn!("workflow dropped while its state was locked; run left to finish");
            return;
        };
        if let Some(run) = state.active.take() {
            teardown(run, self.display_refs.as_ref(), &self.events);
        }
    }
}

fn teardown(
    mut run: ActiveRun,
    display_refs: &dyn DisplayRefProvider,
    events: &broadcast::Sender<WorkflowEvent>,
) {
    drop(run.cancel.take());
    let (original, result) = run.record.take_refs();
    if let Some(original) = original {
        display_refs.release(original);
    }
    if let Some(result) = result.filter(|result| Some(*result) != original) {
        display_refs.release(result);
    }
    info!(run_id = %run.run_id, status = ?run.record.status(), "closed processing run");
    let _ = events.send(WorkflowEvent::Closed { run_id: run.run_id });
}

struct RunContext {
    run_id: RunId,
    state: Arc<Mutex<WorkflowState>>,
    events: broadcast::Sender<WorkflowEvent>,
    display_refs: Arc<dyn DisplayRefProvider>,
}

/// Runs the backend until it returns or the run is cancelled. An outcome that arrives after
/// the run was closed still goes through `finish`, which releases its result.
async fn drive_run(
    ctx: RunContext,
    backend: Arc<dyn AnalysisBackend>,
    request: AnalysisRequest,
    cancelled: oneshot::Receiver<()>,
) {
    let original = request.original;
    let (tx, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
    let analysis = backend.analyze(request, ProgressReporter::new(tx));
    let apply = async {
        // Owned here so a stale run closes the channel and stops the backend.
        let mut rx = rx;
        while let Some(progress) = rx.recv().await {
            if !ctx.apply_progress(progress).await {
                break;
            }
        }
    };
    let work = async { tokio::join!(analysis, apply) };
    tokio::select! {
        biased;
        (outcome, ()) = work => ctx.finish(outcome, original).await,
        _ = cancelled => debug!(run_id = %ctx.run_id, "run cancelled"),
    }
}

impl RunContext {
    /// Returns false once this run is no longer the active one.
    async fn apply_progress(&self, progress: PhaseProgress) -> bool {
        let mut state = self.state.lock().await;
        let Some(run) = state
            .active
            .as_mut()
            .filter(|run| run.run_id == self.run_id)
        else {
            debug!(run_id = %self.run_id, "dropping progress for stale run");
            return false;
        };

        match progress {
            PhaseProgress::PhaseStarted { phase } => {
                if run.record.begin_phase(phase) {
                    debug!(run_id = %self.run_id, status = ?run.record.status(), "phase started");
                    let _ = self.events.send(WorkflowEvent::StatusChanged {
                        run_id: self.run_id,
                        status: run.record.status(),
                        progress: run.record.progress(),
                    });
                }
            }
            PhaseProgress::Step { phase, percent } => {
                if run.record.advance(phase, percent) {
                    let _ = self.events.send(WorkflowEvent::Progress {
                        run_id: self.run_id,
                        status: run.record.status(),
                        progress: run.record.progress(),
                    });
                } else {
                    debug!(run_id = %self.run_id, ?phase, percent, "ignoring out-of-order step");
                }
            }
        }
        true
    }

    async fn finish(&self, outcome: Result<AnalysisOutput>, original: DisplayRef) {
        let mut state = self.state.lock().await;
        let Some(run) = state
            .active
            .as_mut()
            .filter(|run| run.run_id == self.run_id)
        else {
            if let Ok(output) = outcome {
                if output.result != original {
                    self.display_refs.release(output.result);
                }
            }
            return;
        };
        run.cancel = None;

        match outcome {
            Ok(output) => {
                run.record.complete(output.result);
                info!(run_id = %self.run_id, result_ref = %output.result, "processing completed");
                let _ = self.events.send(WorkflowEvent::Completed {
                    run_id: self.run_id,
                    result_ref: output.result,
                });
            }
            Err(err) => {
                let reason = format!("{err:#}");
                run.record.fail(reason.clone());
                warn!(run_id = %self.run_id, error = %reason, "processing failed");
                let _ = self.events.send(WorkflowEvent::Failed {
                    run_id: self.run_id,
                    reason,
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
