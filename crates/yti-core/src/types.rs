use serde::{Deserialize, Serialize};

/// Identifies one of the three canonical standup sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionName {
    Yesterday,
    Today,
    Impediments,
}

/// The canonical, normalized standup content.
///
/// Invariants maintained by the normalizer: no section contains two entries
/// that are case-insensitive duplicates, every entry is non-empty after
/// trimming, and `impediments` always holds at least one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandupSections {
    pub yesterday: Vec<String>,
    pub today: Vec<String>,
    pub impediments: Vec<String>,
}

/// Section lists as extracted from model output, before normalization.
///
/// `None` means the model did not provide the section (or provided something
/// that was not an array), which is distinct from an empty list. The
/// distinction collapses only inside the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialSections {
    pub yesterday: Option<Vec<String>>,
    pub today: Option<Vec<String>>,
    pub impediments: Option<Vec<String>>,
}

/// Best-effort parse of the model's raw text output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelEnvelope {
    pub raw_transcript: Option<String>,
    pub sections: PartialSections,
}

/// One persisted standup. Constructed once per ingestion, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandupEntry {
    pub id: String,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    pub display_name: String,
    pub raw_transcript: String,
    pub formatted_text: String,
    pub markdown_content: String,
    pub markdown_file_name: String,
    pub sections: StandupSections,
    pub created_at: String,
}
