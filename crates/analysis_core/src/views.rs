//! View-models for the three top-level screens. Every function here is a pure function of
//! its inputs; the front end only draws what it is handed.

use shared::domain::{DisplayRef, HistoryEntry, HistoryStatus, ProcessingStatus, ViewState};

use crate::{
    intake::{StagedFileSet, ACCEPTED_FORMATS},
    workflow::ProcessingSnapshot,
};

pub const COMPLETED_ANALYSIS_TYPE: &str = "AI Enhancement";
const UNKNOWN_FILE_TYPE: &str = "Medical Image";

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Home(HomeView),
    History(HistoryView),
    Processing(ProcessingView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFileRow {
    pub index: usize,
    pub name: String,
    pub size_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeView {
    pub staged: Vec<StagedFileRow>,
    pub can_process: bool,
    pub accepted_formats: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBar {
    pub label: &'static str,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPanel {
    InProgress,
    Enhanced(DisplayRef),
    Failed { reason: Option<String>, can_retry: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingAction {
    DownloadOriginal,
    DownloadEnhanced,
    ViewReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingView {
    pub file_name: String,
    pub size_label: String,
    pub type_label: String,
    pub status: ProcessingStatus,
    pub badge: &'static str,
    pub progress_bar: Option<ProgressBar>,
    pub original: Option<DisplayRef>,
    pub result_panel: ResultPanel,
    pub analysis_type: Option<&'static str>,
    pub actions: Vec<ProcessingAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryPreview {
    Comparison { original: String, processed: String },
    Spinner,
    ErrorGlyph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Download,
    View,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub entry: HistoryEntry,
    pub badge: &'static str,
    pub preview: HistoryPreview,
    pub actions: Vec<HistoryAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryView {
    pub rows: Vec<HistoryRow>,
}

pub fn megabytes_label(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / 1024.0 / 1024.0)
}

pub fn status_badge(status: ProcessingStatus) -> &'static str {
    match status {
        ProcessingStatus::Uploading => "Uploading Image...",
        ProcessingStatus::Processing => "AI Processing...",
        ProcessingStatus::Completed => "Analysis Complete",
        ProcessingStatus::Failed => "Processing Failed",
    }
}

pub fn home_view(staged: &StagedFileSet) -> HomeView {
    HomeView {
        staged: staged
            .files()
            .iter()
            .enumerate()
            .map(|(index, file)| StagedFileRow {
                index,
                name: file.name.clone(),
                size_label: megabytes_label(file.size_bytes),
            })
            .collect(),
        can_process: !staged.is_empty(),
        accepted_formats: ACCEPTED_FORMATS,
    }
}

pub fn processing_view(snapshot: &ProcessingSnapshot) -> ProcessingView {
    let record = &snapshot.record;
    let status = record.status();
    let progress_bar = match status {
        ProcessingStatus::Uploading => Some(ProgressBar {
            label: "Uploading",
            percent: record.progress(),
        }),
        ProcessingStatus::Processing => Some(ProgressBar {
            label: "Processing",
            percent: record.progress(),
        }),
        ProcessingStatus::Completed | ProcessingStatus::Failed => None,
    };
    let result_panel = match (status, record.result_ref()) {
        (ProcessingStatus::Completed, Some(result)) => ResultPanel::Enhanced(result),
        (ProcessingStatus::Failed, _) => ResultPanel::Failed {
            reason: record.failure_reason().map(str::to_string),
            can_retry: true,
        },
        _ => ResultPanel::InProgress,
    };
    let completed = status == ProcessingStatus::Completed;
    let type_label = if snapshot.file.mime_type.is_empty() {
        UNKNOWN_FILE_TYPE.to_string()
    } else {
        snapshot.file.mime_type.clone()
    };

    ProcessingView {
        file_name: snapshot.file.name.clone(),
        size_label: megabytes_label(snapshot.file.size_bytes),
        type_label,
        status,
        badge: status_badge(status),
        progress_bar,
        original: record.original_ref(),
        result_panel,
        analysis_type: completed.then_some(COMPLETED_ANALYSIS_TYPE),
        actions: if completed {
            vec![
                ProcessingAction::DownloadOriginal,
                ProcessingAction::DownloadEnhanced,
                ProcessingAction::ViewReport,
            ]
        } else {
            Vec::new()
        },
    }
}

pub fn history_view(entries: &[HistoryEntry]) -> HistoryView {
    HistoryView {
        rows: entries
            .iter()
            .map(|entry| {
                let (badge, preview, actions) = match entry.status {
                    HistoryStatus::Completed => (
                        "Completed",
                        HistoryPreview::Comparison {
                            original: entry.original_image.clone(),
                            processed: entry.processed_image.clone(),
                        },
                        vec![HistoryAction::Download, HistoryAction::View],
                    ),
                    HistoryStatus::Processing => {
                        ("Processing", HistoryPreview::Spinner, Vec::new())
                    }
                    HistoryStatus::Failed => ("Failed", HistoryPreview::ErrorGlyph, Vec::new()),
                };
                HistoryRow {
                    entry: entry.clone(),
                    badge,
                    preview,
                    actions,
                }
            })
            .collect(),
    }
}

/// Picks the one screen to draw. A Processing view without a live run falls back to Home.
pub fn render(
    view: ViewState,
    staged: &StagedFileSet,
    processing: Option<&ProcessingSnapshot>,
    history: &[HistoryEntry],
) -> Screen {
    match (view, processing) {
        (ViewState::Home, _) | (ViewState::Processing, None) => Screen::Home(home_view(staged)),
        (ViewState::History, _) => Screen::History(history_view(history)),
        (ViewState::Processing, Some(snapshot)) => Screen::Processing(processing_view(snapshot)),
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
