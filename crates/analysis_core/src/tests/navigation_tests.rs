use super::*;

fn image(name: &str) -> FileRef {
    FileRef::new(name, "image/png", vec![7; 16])
}

#[test]
fn starts_at_home_with_nothing_staged() {
    let controller = NavigationController::new();
    assert_eq!(controller.view(), ViewState::Home);
    assert!(controller.staged().is_empty());
}

#[test]
fn navigating_to_history_keeps_staged_files() {
    let mut controller = NavigationController::new();
    controller.ingest(IngestSource::FileDialog, vec![image("a.png")]);

    controller.navigate(NavTarget::History);
    assert_eq!(controller.view(), ViewState::History);
    assert_eq!(controller.staged().len(), 1);

    controller.navigate(NavTarget::Home);
    assert_eq!(controller.view(), ViewState::Home);
    assert!(controller.staged().is_empty());
}

#[test]
fn start_processing_with_no_files_changes_nothing() {
    let mut controller = NavigationController::new();
    controller.navigate(NavTarget::History);

    assert!(!controller.start_processing(Vec::new()));
    assert_eq!(controller.view(), ViewState::History);

    assert!(!controller.start_processing(Vec::new()));
    assert_eq!(controller.view(), ViewState::History);
}

#[test]
fn start_processing_stores_files_and_switches_view() {
    let mut controller = NavigationController::new();
    let files = vec![image("a.png"), image("b.png")];

    assert!(controller.start_processing(files.clone()));
    assert_eq!(controller.view(), ViewState::Processing);
    assert_eq!(controller.staged().files(), files.as_slice());
}

#[test]
fn back_returns_home_and_clears_staged() {
    let mut controller = NavigationController::new();
    controller.start_processing(vec![image("a.png")]);

    controller.back();
    assert_eq!(controller.view(), ViewState::Home);
    assert!(controller.staged().is_empty());
}
