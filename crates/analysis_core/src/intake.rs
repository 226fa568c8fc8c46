//! File intake: the staged set and the image-type filter shared by every entry point.

use shared::domain::FileRef;
use thiserror::Error;
use tracing::debug;

/// Advisory list shown on the upload screen. Only the MIME prefix is enforced.
pub const ACCEPTED_FORMATS: &[&str] = &["DICOM", "PNG", "JPEG", "TIFF"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestSource {
    DragDrop,
    FileDialog,
}

impl IngestSource {
    fn as_str(self) -> &'static str {
        match self {
            IngestSource::DragDrop => "drag_drop",
            IngestSource::FileDialog => "file_dialog",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StagingError {
    #[error("staged file index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ordered files selected for processing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedFileSet {
    files: Vec<FileRef>,
}

impl StagedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the image candidates in their original order. Anything else is dropped.
    pub fn ingest(
        &mut self,
        source: IngestSource,
        candidates: impl IntoIterator<Item = FileRef>,
    ) -> IngestReport {
        let mut report = IngestReport::default();
        for candidate in candidates {
            if candidate.is_image() {
                self.files.push(candidate);
                report.accepted += 1;
            } else {
                debug!(
                    source = source.as_str(),
                    file_name = %candidate.name,
                    mime_type = %candidate.mime_type,
                    "dropping non-image candidate"
                );
                report.rejected.push(candidate.name);
            }
        }
        debug!(
            source = source.as_str(),
            accepted = report.accepted,
            rejected = report.rejected.len(),
            staged = self.files.len(),
            "ingested candidates"
        );
        report
    }

    pub fn remove(&mut self, index: usize) -> Result<FileRef, StagingError> {
        if index >= self.files.len() {
            return Err(StagingError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        Ok(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl From<Vec<FileRef>> for StagedFileSet {
    fn from(files: Vec<FileRef>) -> Self {
        Self { files }
    }
}

#[cfg(test)]
#[path = "tests/intake_tests.rs"]
mod tests;
