use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(RunId);
id_newtype!(DisplayRef);
id_newtype!(HistoryEntryId);

pub const IMAGE_MIME_PREFIX: &str = "image/";

/// Which top-level screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Home,
    History,
    Processing,
}

/// Targets reachable through explicit navigation. Processing is only entered by
/// handing files to the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavTarget {
    Home,
    History,
}

impl From<NavTarget> for ViewState {
    fn from(value: NavTarget) -> Self {
        match value {
            NavTarget::Home => ViewState::Home,
            NavTarget::History => ViewState::History,
        }
    }
}

/// A file-like object picked by the user: declared metadata plus the raw bytes.
#[derive(Clone, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    #[serde(skip)]
    pub payload: Arc<Vec<u8>>,
}

impl FileRef {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: payload.len() as u64,
            mime_type: mime_type.into(),
            payload: Arc::new(payload),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with(IMAGE_MIME_PREFIX)
    }
}

impl fmt::Debug for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRef")
            .field("name", &self.name)
            .field("size_bytes", &self.size_bytes)
            .field("mime_type", &self.mime_type)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl PartialEq for FileRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.size_bytes == other.size_bytes
            && self.mime_type == other.mime_type
            && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }
}

/// A timed stage of the workflow with its own progress range. Ordered by when it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uploading,
    Processing,
}

impl Phase {
    pub fn status(self) -> ProcessingStatus {
        match self {
            Phase::Uploading => ProcessingStatus::Uploading,
            Phase::Processing => ProcessingStatus::Processing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Completed,
    Processing,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub file_name: String,
    pub upload_date: NaiveDate,
    pub status: HistoryStatus,
    pub analysis_type: String,
    pub file_size: String,
    pub original_image: String,
    pub processed_image: String,
}
