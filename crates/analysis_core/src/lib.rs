//! Navigation, file intake and the simulated processing workflow behind the imaging portal.

pub mod backend;
pub mod display;
pub mod history;
pub mod intake;
pub mod navigation;
pub mod record;
pub mod schedule;
pub mod session;
pub mod views;
pub mod workflow;

use std::sync::Arc;

pub use backend::{
    AnalysisBackend, AnalysisOutput, AnalysisRequest, ProgressReporter, SimulatedBackend,
};
pub use display::{DisplayRefProvider, InMemoryDisplayRefs};
pub use intake::{IngestReport, IngestSource, StagedFileSet, StagingError};
pub use navigation::NavigationController;
pub use record::ProcessingRecord;
pub use schedule::{PhaseSchedule, ScheduleError, SimulationSchedule};
pub use session::PortalSession;
pub use views::Screen;
pub use workflow::{ProcessingSnapshot, ProcessingWorkflow, WorkflowError};

/// A session wired to the simulated backend and in-memory display references.
pub fn simulated_session(
    schedule: SimulationSchedule,
    display_refs: Arc<InMemoryDisplayRefs>,
) -> PortalSession {
    let workflow =
        ProcessingWorkflow::new(Arc::new(SimulatedBackend::new(schedule)), display_refs);
    PortalSession::new(workflow, history::sample_history())
}
