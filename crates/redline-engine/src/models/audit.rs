use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact location of a specific span inside one paragraph.
///
/// Offsets are byte offsets into the paragraph's visible text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMatch {
    pub paragraph_index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl ResolvedMatch {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_offset..self.end_offset
    }
}

/// Terminal state of one edit request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStatus {
    Applied,
    SkippedNotFound,
    SkippedAmbiguous,
    SkippedOutOfContext,
    Failed,
}

impl EditStatus {
    pub const ALL: [EditStatus; 5] = [
        EditStatus::Applied,
        EditStatus::SkippedNotFound,
        EditStatus::SkippedAmbiguous,
        EditStatus::SkippedOutOfContext,
        EditStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EditStatus::Applied => "applied",
            EditStatus::SkippedNotFound => "skipped_not_found",
            EditStatus::SkippedAmbiguous => "skipped_ambiguous",
            EditStatus::SkippedOutOfContext => "skipped_out_of_context",
            EditStatus::Failed => "failed",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            EditStatus::SkippedNotFound
                | EditStatus::SkippedAmbiguous
                | EditStatus::SkippedOutOfContext
        )
    }
}

impl fmt::Display for EditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record for one edit request. Exactly one is produced per request,
/// in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub edit_index: usize,
    pub status: EditStatus,
    pub detail: String,
    pub reason_for_change: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ResolvedMatch>,
}
