//! Drives a list of edit requests through resolve → apply, strictly in order.
//!
//! Each request moves `pending → resolving → applying → applied`, or stops at
//! `skipped` (resolution failed) or `failed` (invalid request or structural
//! failure while applying). Every request ends with exactly one [`LogEntry`].
//! The visible text map is rebuilt for every request because any mutation
//! invalidates the offsets of the previous one.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::editing::{
    Annotation, EditError, EditOptions, VisibleTextMap, replace_span, resolve,
};
use crate::io::{DocumentStore, StoreError, store_for_path};
use crate::models::{Attribution, Document, EditRequest, EditStatus, LogEntry};

pub struct EditEngine {
    options: EditOptions,
}

impl EditEngine {
    pub fn new(options: EditOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EditOptions {
        &self.options
    }

    /// Apply every request to `document` in order. Individual failures are
    /// logged and never stop the remaining requests.
    pub fn apply_edits(&self, document: &mut Document, requests: &[EditRequest]) -> EditReport {
        let log = requests
            .iter()
            .enumerate()
            .map(|(edit_index, request)| self.apply_one(document, edit_index, request))
            .collect();
        EditReport::new(log)
    }

    /// Load `input`, apply the requests and save to `output`, choosing the
    /// document store for each path by its extension.
    pub fn run(
        &self,
        input: &Path,
        output: &Path,
        requests: &[EditRequest],
    ) -> Result<EditOutcome, StoreError> {
        let source = store_for_path(input)?;
        let sink = store_for_path(output)?;
        self.run_with_stores(source.as_ref(), sink.as_ref(), input, output, requests)
    }

    /// Store failures are fatal: nothing is written when loading fails, and a
    /// failed save leaves no partial file at `output`.
    pub fn run_with_stores(
        &self,
        source: &dyn DocumentStore,
        sink: &dyn DocumentStore,
        input: &Path,
        output: &Path,
        requests: &[EditRequest],
    ) -> Result<EditOutcome, StoreError> {
        let mut document = source.load(input)?;
        log::info!(
            "loaded {} ({} paragraphs), applying {} edits",
            input.display(),
            document.paragraphs.len(),
            requests.len()
        );

        let report = self.apply_edits(&mut document, requests);
        sink.save(&document, output)?;
        log::info!(
            "saved {} with {}/{} edits applied",
            output.display(),
            report.edits_applied,
            requests.len()
        );

        Ok(EditOutcome {
            success: true,
            output_path: output.to_path_buf(),
            edits_applied: report.edits_applied,
            log: report.log,
        })
    }

    fn apply_one(&self, document: &mut Document, edit_index: usize, request: &EditRequest) -> LogEntry {
        log::debug!("edit {edit_index}: resolving");
        let resolution = {
            let map = VisibleTextMap::build(document);
            resolve(&map, request, &self.options)
        };

        let resolution = match resolution {
            Ok(resolution) => resolution,
            Err(err) => return self.rejected(edit_index, request, err),
        };

        log::debug!(
            "edit {edit_index}: applying at paragraph {} bytes {}..{}",
            resolution.location.paragraph_index,
            resolution.location.start_offset,
            resolution.location.end_offset
        );
        let attribution = Attribution::now(&self.options.author_name);
        let comment = (self.options.add_comments && !request.reason_for_change.is_empty())
            .then_some(request.reason_for_change.as_str());
        let annotation = Annotation {
            attribution: &attribution,
            track_changes: self.options.add_tracked_changes,
            comment,
        };

        match replace_span(
            document,
            &resolution.location,
            &request.specific_new_text,
            &annotation,
        ) {
            Ok(summary) => {
                let mut detail = format!(
                    "replaced {:?} with {:?} in paragraph {} ({} run(s))",
                    request.specific_old_text,
                    request.specific_new_text,
                    resolution.location.paragraph_index,
                    summary.runs_replaced
                );
                for note in &resolution.notes {
                    detail.push_str("; ");
                    detail.push_str(note);
                }
                log::info!("edit {edit_index}: {detail}");
                LogEntry {
                    edit_index,
                    status: EditStatus::Applied,
                    detail,
                    reason_for_change: request.reason_for_change.clone(),
                    location: Some(resolution.location),
                }
            }
            Err(err) => self.rejected(edit_index, request, err),
        }
    }

    fn rejected(&self, edit_index: usize, request: &EditRequest, err: EditError) -> LogEntry {
        let status = err.status();
        log::warn!("edit {edit_index}: {status}: {err}");
        LogEntry {
            edit_index,
            status,
            detail: err.to_string(),
            reason_for_change: request.reason_for_change.clone(),
            location: None,
        }
    }
}

/// Outcome of applying a request list to an in-memory document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditReport {
    pub edits_applied: usize,
    pub log: Vec<LogEntry>,
}

impl EditReport {
    pub fn new(log: Vec<LogEntry>) -> Self {
        let edits_applied = log
            .iter()
            .filter(|entry| entry.status == EditStatus::Applied)
            .count();
        Self { edits_applied, log }
    }

    pub fn count(&self, status: EditStatus) -> usize {
        self.log.iter().filter(|entry| entry.status == status).count()
    }

    /// Human-readable summary: totals per status, then one line per edit
    pub fn summary(&self) -> String {
        let mut out = format!("{} of {} edits applied\n", self.edits_applied, self.log.len());
        for status in EditStatus::ALL {
            let count = self.count(status);
            if count > 0 && status != EditStatus::Applied {
                out.push_str(&format!("  {status}: {count}\n"));
            }
        }
        for entry in &self.log {
            out.push_str(&format!(
                "#{} [{}] {}",
                entry.edit_index, entry.status, entry.detail
            ));
            if !entry.reason_for_change.is_empty() {
                out.push_str(&format!(" (reason: {})", entry.reason_for_change));
            }
            out.push('\n');
        }
        out
    }
}

/// Result surface of a file-level run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOutcome {
    /// The edited document was saved
    pub success: bool,
    pub output_path: PathBuf,
    pub edits_applied: usize,
    pub log: Vec<LogEntry>,
}
