//! Navigation State Controller: active view plus the staged file set.

use shared::domain::{FileRef, NavTarget, ViewState};
use tracing::{debug, info};

use crate::intake::{IngestReport, IngestSource, StagedFileSet, StagingError};

#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    view: ViewState,
    staged: StagedFileSet,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn staged(&self) -> &StagedFileSet {
        &self.staged
    }

    pub fn ingest(
        &mut self,
        source: IngestSource,
        candidates: impl IntoIterator<Item = FileRef>,
    ) -> IngestReport {
        self.staged.ingest(source, candidates)
    }

    pub fn remove(&mut self, index: usize) -> Result<FileRef, StagingError> {
        self.staged.remove(index)
    }

    pub fn navigate(&mut self, target: NavTarget) {
        if target == NavTarget::Home {
            self.staged.clear();
        }
        debug!(from = ?self.view, to = ?target, "navigate");
        self.view = target.into();
    }

    /// Stores `files` as the staged set and enters Processing. Returns false and changes
    /// nothing when `files` is empty.
    pub fn start_processing(&mut self, files: Vec<FileRef>) -> bool {
        if files.is_empty() {
            debug!("ignoring start_processing with no files");
            return false;
        }
        info!(staged = files.len(), "entering processing view");
        self.staged = StagedFileSet::from(files);
        self.view = ViewState::Processing;
        true
    }

    pub fn back(&mut self) {
        self.navigate(NavTarget::Home);
        self.staged.clear();
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
