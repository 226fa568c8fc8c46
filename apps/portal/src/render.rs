//! Plain-text drawing of the view-models for the terminal front end.

use std::fmt::Write as _;

use analysis_core::{
    views::{
        HistoryAction, HistoryPreview, HistoryView, HomeView, ProcessingAction, ProcessingView,
        ResultPanel,
    },
    Screen,
};
use shared::protocol::WorkflowEvent;

const BAR_WIDTH: usize = 40;

pub fn screen(screen: &Screen) -> String {
    match screen {
        Screen::Home(view) => home(view),
        Screen::History(view) => history(view),
        Screen::Processing(view) => processing(view),
    }
}

fn home(view: &HomeView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Medical Image Analysis Platform");
    let _ = writeln!(out, "Supports: {} formats", view.accepted_formats.join(", "));
    if view.staged.is_empty() {
        let _ = writeln!(out, "No files selected.");
        return out;
    }
    let _ = writeln!(out, "Uploaded Files ({})", view.staged.len());
    for row in &view.staged {
        let _ = writeln!(out, "  [{}] {}  {}", row.index, row.name, row.size_label);
    }
    if view.can_process {
        let _ = writeln!(out, "Ready: Process Images");
    }
    out
}

fn history(view: &HistoryView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analysis History");
    for row in &view.rows {
        let entry = &row.entry;
        let _ = writeln!(
            out,
            "  {} [{}] {} | {} | {}",
            entry.file_name, row.badge, entry.analysis_type, entry.upload_date, entry.file_size
        );
        let preview = match &row.preview {
            HistoryPreview::Comparison {
                original,
                processed,
            } => format!("original {original} / processed {processed}"),
            HistoryPreview::Spinner => "analysis in progress".to_string(),
            HistoryPreview::ErrorGlyph => "analysis failed".to_string(),
        };
        let _ = writeln!(out, "    {preview}");
        if !row.actions.is_empty() {
            let actions: Vec<&str> = row
                .actions
                .iter()
                .map(|action| match action {
                    HistoryAction::Download => "Download",
                    HistoryAction::View => "View",
                })
                .collect();
            let _ = writeln!(out, "    actions: {}", actions.join(", "));
        }
    }
    out
}

fn processing(view: &ProcessingView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Image Analysis: {} [{}]", view.file_name, view.badge);
    let _ = writeln!(out, "  File Size: {}", view.size_label);
    let _ = writeln!(out, "  Type: {}", view.type_label);
    if let Some(bar) = view.progress_bar {
        let _ = writeln!(out, "  {}", progress_line(bar.label, bar.percent));
    }
    match &view.result_panel {
        ResultPanel::InProgress => {
            let _ = writeln!(out, "  AI Analysis in Progress");
        }
        ResultPanel::Enhanced(result) => {
            let _ = writeln!(out, "  Enhanced image ready (display ref {result})");
        }
        ResultPanel::Failed { reason, can_retry } => {
            let _ = writeln!(
                out,
                "  Processing Failed: {}",
                reason.as_deref().unwrap_or("unknown error")
            );
            if *can_retry {
                let _ = writeln!(out, "  Retry available");
            }
        }
    }
    if let Some(analysis_type) = view.analysis_type {
        let _ = writeln!(out, "  Analysis Type: {analysis_type}");
    }
    if !view.actions.is_empty() {
        let actions: Vec<&str> = view
            .actions
            .iter()
            .map(|action| match action {
                ProcessingAction::DownloadOriginal => "Download Original",
                ProcessingAction::DownloadEnhanced => "Download Enhanced",
                ProcessingAction::ViewReport => "View Detailed Report",
            })
            .collect();
        let _ = writeln!(out, "  actions: {}", actions.join(", "));
    }
    out
}

pub fn progress_line(label: &str, percent: u8) -> String {
    let filled = BAR_WIDTH * usize::from(percent.min(100)) / 100;
    format!(
        "{label:<10} [{}{}] {percent:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

pub fn event_line(event: &WorkflowEvent) -> String {
    match event {
        WorkflowEvent::RunStarted {
            run_id,
            file_name,
            staged_count,
            ..
        } => format!("run {run_id}: analyzing {file_name} ({staged_count} staged)"),
        WorkflowEvent::StatusChanged {
            run_id, status, ..
        } => format!("run {run_id}: {status:?}"),
        WorkflowEvent::Progress {
            status, progress, ..
        } => progress_line(&format!("{status:?}"), *progress),
        WorkflowEvent::Completed { run_id, result_ref } => {
            format!("run {run_id}: completed (result ref {result_ref})")
        }
        WorkflowEvent::Failed { run_id, reason } => format!("run {run_id}: failed: {reason}"),
        WorkflowEvent::Closed { run_id } => format!("run {run_id}: closed"),
    }
}
