use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use redline_engine::io::{DocumentStore, default_output_path, load_edit_requests};
use redline_engine::{
    Document, EditEngine, EditOptions, EditRequest, EditStatus, JsonStore, LogEntry,
    MarkdownStore, StoreError,
};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Copy a fixture into a fresh temp dir so outputs land next to it
fn staged_fixture(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::copy(fixture(name), &path).unwrap();
    (dir, path)
}

fn statuses(log: &[LogEntry]) -> Vec<EditStatus> {
    log.iter().map(|entry| entry.status).collect()
}

#[test]
fn markdown_untracked_edits() {
    // Given the agreement fixture and its edit list
    let (_dir, input) = staged_fixture("agreement.md");
    let requests = load_edit_requests(&fixture("agreement.edits.json")).unwrap();
    let output = default_output_path(&input, "_redlined");
    let engine = EditEngine::new(EditOptions {
        add_tracked_changes: false,
        ..EditOptions::default()
    });

    // When running the engine end to end
    let outcome = engine.run(&input, &output, &requests).unwrap();

    // Then three edits land and the missing clause is skipped
    assert!(outcome.success);
    assert_eq!(outcome.edits_applied, 3);
    assert_eq!(
        statuses(&outcome.log),
        vec![
            EditStatus::Applied,
            EditStatus::Applied,
            EditStatus::Applied,
            EditStatus::SkippedNotFound,
        ]
    );
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "# Service Agreement\n\n\
         The total cost would be $208 , to a new number of units.\n\n\
         - Payment is due within **45 days** of invoice.\n\n\
         - Late payments accrue interest.\n\n\
         The vendor must deliver the goods.\n"
    );
    // Input is never modified
    assert_eq!(
        fs::read_to_string(&input).unwrap(),
        fs::read_to_string(fixture("agreement.md")).unwrap()
    );
}

#[test]
fn markdown_tracked_edits_with_comments() {
    let (_dir, input) = staged_fixture("agreement.md");
    let requests = load_edit_requests(&fixture("agreement.edits.json")).unwrap();
    let output = default_output_path(&input, "_redlined");
    let engine = EditEngine::new(EditOptions {
        author_name: "Reviewer".to_string(),
        add_tracked_changes: true,
        add_comments: true,
        ..EditOptions::default()
    });

    let outcome = engine.run(&input, &output, &requests).unwrap();

    assert_eq!(outcome.edits_applied, 3);
    let rendered = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = rendered.lines().filter(|line| !line.is_empty()).collect();
    assert_eq!(
        lines,
        vec![
            "# Service Agreement",
            "The total cost would be {--$101--}{++$208++}{>>Reviewer: price update<<} , to a new number of units.",
            "- Payment is due within {--**30 days**--}{++**45 days**++}{>>Reviewer: terms<<} of invoice.",
            "- Late payments accrue interest.",
            "The vendor {--shall--}{++must++} deliver the goods.",
        ]
    );
}

#[test]
fn markdown_to_json_keeps_review_metadata() {
    // Given a markdown input and a JSON output
    let (dir, input) = staged_fixture("agreement.md");
    let requests = load_edit_requests(&fixture("agreement.edits.json")).unwrap();
    let output = dir.path().join("agreement.json");
    let engine = EditEngine::new(EditOptions {
        add_comments: true,
        ..EditOptions::default()
    });

    // When running through both stores
    engine.run(&input, &output, &requests).unwrap();

    // Then the JSON document carries revisions and both comments
    let doc: Document = JsonStore.load(&output).unwrap();
    assert_eq!(doc.comments.len(), 2);
    assert_eq!(doc.comments[0].text, "price update");
    assert!(doc.paragraphs[1].runs.iter().any(|run| run.is_deleted()));
    assert!(doc.paragraphs[1].runs.iter().any(|run| run.is_inserted()));
    // Visible text reflects the edits, hiding tracked deletions
    assert!(doc.visible_text().contains("cost would be $208 ,"));
    assert!(!doc.visible_text().contains("$101"));
}

#[test]
fn json_round_trip_run_with_sequential_edits() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.json");
    let source = Document::from_plain_paragraphs(["alpha beta gamma", "delta"]);
    JsonStore.save(&source, &input).unwrap();
    let requests = vec![
        EditRequest::new("alpha beta", "beta", "BETA", ""),
        // Only resolvable once the first edit has been applied
        EditRequest::new("BETA gamma", "gamma", "GAMMA", ""),
    ];
    let output = default_output_path(&input, "_redlined");

    let outcome = EditEngine::new(EditOptions {
        add_tracked_changes: false,
        ..EditOptions::default()
    })
    .run(&input, &output, &requests)
    .unwrap();

    assert_eq!(outcome.edits_applied, 2);
    assert_eq!(outcome.output_path, dir.path().join("doc_redlined.json"));
    let saved = JsonStore.load(&output).unwrap();
    assert_eq!(saved.visible_text(), "alpha BETA GAMMA\ndelta");
}

#[test]
fn missing_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.md");
    let output = dir.path().join("absent_redlined.md");

    let result = EditEngine::new(EditOptions::default()).run(&input, &output, &[]);

    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert!(!output.exists());
}

#[test]
fn unsupported_output_format_is_rejected_before_loading() {
    let (dir, input) = staged_fixture("agreement.md");
    let output = dir.path().join("agreement.docx");

    let result = EditEngine::new(EditOptions::default()).run(&input, &output, &[]);

    assert!(matches!(result, Err(StoreError::UnsupportedFormat(_))));
    assert!(!output.exists());
}

#[test]
fn empty_request_list_saves_unchanged_document() {
    let (dir, input) = staged_fixture("agreement.md");
    let output = dir.path().join("copy.md");

    let outcome = EditEngine::new(EditOptions::default())
        .run(&input, &output, &[])
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.edits_applied, 0);
    assert!(outcome.log.is_empty());
    let original = MarkdownStore.load(&input).unwrap();
    let copy = MarkdownStore.load(&output).unwrap();
    assert_eq!(copy.visible_text(), original.visible_text());
}
