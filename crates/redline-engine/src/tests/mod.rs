use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::models::{Attribution, Paragraph, RevisionKind, Run, RunFormat};

/// Create a temporary directory for document fixtures
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test file with content
pub fn create_test_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

/// Paragraph of text runs, each flagged bold or plain
pub fn formatted_paragraph(runs: &[(&str, bool)]) -> Paragraph {
    Paragraph::new(
        runs.iter()
            .map(|(text, bold)| {
                let format = if *bold {
                    RunFormat::bold()
                } else {
                    RunFormat::default()
                };
                Run::text(*text).with_format(format)
            })
            .collect(),
    )
}

/// Text run already marked as a tracked deletion
pub fn deleted(text: &str) -> Run {
    Run::text(text).with_revision(Attribution::now("Earlier Reviewer").revision(RevisionKind::Deletion))
}
