use super::*;
use std::sync::Arc;

use shared::protocol::WorkflowEvent;

use crate::{
    backend::SimulatedBackend, display::InMemoryDisplayRefs, history::sample_history,
    schedule::SimulationSchedule, simulated_session,
};

fn session() -> (PortalSession, Arc<InMemoryDisplayRefs>) {
    let refs = Arc::new(InMemoryDisplayRefs::new());
    (
        simulated_session(SimulationSchedule::default(), Arc::clone(&refs)),
        refs,
    )
}

fn scan(name: &str) -> FileRef {
    FileRef::new(name, "image/jpeg", vec![1; 32])
}

#[tokio::test(start_paused = true)]
async fn start_processing_without_staged_files_is_a_no_op() {
    let (mut session, _) = session();
    assert_eq!(session.start_processing().await, Ok(None));
    assert_eq!(session.view(), ViewState::Home);
    assert!(session.processing_snapshot().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn leaving_processing_through_history_closes_the_run() {
    let (mut session, refs) = session();
    session.ingest(IngestSource::DragDrop, vec![scan("a.jpg")]);
    session.start_processing().await.expect("start").expect("run");
    assert_eq!(session.view(), ViewState::Processing);
    assert_eq!(refs.live_count(), 1);

    session.navigate(NavTarget::History).await;
    assert_eq!(session.view(), ViewState::History);
    assert!(session.processing_snapshot().await.is_none());
    assert_eq!(refs.live_count(), 0);
    assert!(matches!(session.render().await, Screen::History(_)));
}

#[tokio::test(start_paused = true)]
async fn remove_staged_updates_home_screen() {
    let (mut session, _) = session();
    session.ingest(
        IngestSource::FileDialog,
        vec![scan("a.jpg"), scan("b.jpg"), scan("c.jpg")],
    );
    let removed = session.remove_staged(0).expect("remove");
    assert_eq!(removed.name, "a.jpg");
    assert!(session.remove_staged(5).is_err());

    let Screen::Home(home) = session.render().await else {
        panic!("expected home screen");
    };
    let names: Vec<_> = home.staged.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["b.jpg", "c.jpg"]);
}

#[tokio::test(start_paused = true)]
async fn retry_after_failed_acquisition_stays_on_processing() {
    let (mut session, _) = session();
    session.ingest(
        IngestSource::FileDialog,
        vec![FileRef::new("zero.png", "image/png", Vec::new())],
    );
    let mut rx = session.workflow().subscribe();
    session.start_processing().await.expect("start");
    assert!(matches!(
        rx.recv().await.expect("event"),
        WorkflowEvent::RunStarted { .. }
    ));
    assert!(matches!(
        rx.recv().await.expect("event"),
        WorkflowEvent::Failed { .. }
    ));

    let retried = session.retry().await.expect("retry");
    assert_eq!(session.view(), ViewState::Processing);
    let snapshot = session.processing_snapshot().await.expect("snapshot");
    assert_eq!(snapshot.run_id, retried);
    assert_eq!(snapshot.record.status(), shared::domain::ProcessingStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn sessions_are_independent() {
    let refs = Arc::new(InMemoryDisplayRefs::new());
    let mut first = simulated_session(SimulationSchedule::default(), Arc::clone(&refs));
    let second = PortalSession::new(
        ProcessingWorkflow::new(Arc::new(SimulatedBackend::default()), refs.clone()),
        sample_history(),
    );

    first.ingest(IngestSource::DragDrop, vec![scan("a.jpg")]);
    first.start_processing().await.expect("start");
    assert_eq!(first.view(), ViewState::Processing);
    assert_eq!(second.view(), ViewState::Home);
    assert!(second.processing_snapshot().await.is_none());
}
