//! Parent view container: one navigation controller, one workflow, the history list.

use shared::domain::{FileRef, HistoryEntry, NavTarget, RunId, ViewState};
use tracing::info;

use crate::{
    intake::{IngestReport, IngestSource, StagingError},
    navigation::NavigationController,
    views::{self, Screen},
    workflow::{ProcessingSnapshot, ProcessingWorkflow, WorkflowError},
};

pub struct PortalSession {
    navigation: NavigationController,
    workflow: ProcessingWorkflow,
    history: Vec<HistoryEntry>,
}

impl PortalSession {
    pub fn new(workflow: ProcessingWorkflow, history: Vec<HistoryEntry>) -> Self {
        Self {
            navigation: NavigationController::new(),
            workflow,
            history,
        }
    }

    pub fn view(&self) -> ViewState {
        self.navigation.view()
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn workflow(&self) -> &ProcessingWorkflow {
        &self.workflow
    }

    pub fn ingest(
        &mut self,
        source: IngestSource,
        candidates: impl IntoIterator<Item = FileRef>,
    ) -> IngestReport {
        self.navigation.ingest(source, candidates)
    }

    pub fn remove_staged(&mut self, index: usize) -> Result<FileRef, StagingError> {
        self.navigation.remove(index)
    }

    pub async fn navigate(&mut self, target: NavTarget) {
        if self.navigation.view() == ViewState::Processing {
            self.workflow.close().await;
        }
        self.navigation.navigate(target);
    }

    /// Hands the staged files to the workflow. `Ok(None)` when nothing is staged.
    pub async fn start_processing(&mut self) -> Result<Option<RunId>, WorkflowError> {
        let files = self.navigation.staged().files().to_vec();
        if !self.navigation.start_processing(files.clone()) {
            return Ok(None);
        }
        let run_id = self.workflow.start(files).await?;
        Ok(Some(run_id))
    }

    pub async fn retry(&self) -> Result<RunId, WorkflowError> {
        self.workflow.retry().await
    }

    pub async fn back(&mut self) {
        if let Some(run_id) = self.workflow.close().await {
            info!(run_id = %run_id, "left processing view");
        }
        self.navigation.back();
    }

    pub async fn processing_snapshot(&self) -> Option<ProcessingSnapshot> {
        self.workflow.snapshot().await
    }

    pub async fn render(&self) -> Screen {
        let snapshot = self.workflow.snapshot().await;
        views::render(
            self.navigation.view(),
            self.navigation.staged(),
            snapshot.as_ref(),
            &self.history,
        )
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
