//! Sample analysis history. Read-only: nothing in the workflow writes here yet.

use chrono::NaiveDate;
use shared::domain::{HistoryEntry, HistoryEntryId, HistoryStatus};

const CHEST_XRAY_IMAGE: &str = "https://images.unsplash.com/photo-1631651363531-fd29aec4cb5c";
const BRAIN_MRI_IMAGE: &str = "https://images.unsplash.com/photo-1758691463569-66de91d76452";
const CT_SCAN_IMAGE: &str = "https://images.unsplash.com/photo-1706065638524-eb52e7165abf";

pub fn sample_history() -> Vec<HistoryEntry> {
    vec![
        entry(
            1,
            "chest_xray_patient_001.dcm",
            (2025, 1, 15),
            HistoryStatus::Completed,
            "Chest X-Ray Analysis",
            "2.4 MB",
            CHEST_XRAY_IMAGE,
        ),
        entry(
            2,
            "brain_mri_patient_007.dcm",
            (2025, 1, 14),
            HistoryStatus::Completed,
            "Brain MRI Analysis",
            "5.1 MB",
            BRAIN_MRI_IMAGE,
        ),
        entry(
            3,
            "ct_abdomen_patient_012.dcm",
            (2025, 1, 13),
            HistoryStatus::Processing,
            "CT Scan Analysis",
            "8.7 MB",
            CT_SCAN_IMAGE,
        ),
    ]
}

fn entry(
    id: i64,
    file_name: &str,
    (year, month, day): (i32, u32, u32),
    status: HistoryStatus,
    analysis_type: &str,
    file_size: &str,
    image: &str,
) -> HistoryEntry {
    HistoryEntry {
        id: HistoryEntryId(id),
        file_name: file_name.to_string(),
        upload_date: NaiveDate::from_ymd_opt(year, month, day)
            .expect("sample history dates are valid calendar days"),
        status,
        analysis_type: analysis_type.to_string(),
        file_size: file_size.to_string(),
        original_image: image.to_string(),
        processed_image: image.to_string(),
    }
}
