use std::path::Path;

use crate::io::{DocumentStore, StoreError, read_file, write_atomic};
use crate::models::Document;

/// Lossless JSON representation of the document model
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStore;

impl DocumentStore for JsonStore {
    fn load(&self, path: &Path) -> Result<Document, StoreError> {
        let content = read_file(path)?;
        serde_json::from_str(&content).map_err(|err| StoreError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn save(&self, document: &Document, path: &Path) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(document)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        bytes.push(b'\n');
        write_atomic(path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribution, Paragraph, RevisionKind, Run, RunFormat};
    use crate::tests::{create_test_dir, create_test_file};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_and_load_preserves_model() {
        let dir = create_test_dir();
        let path = dir.path().join("doc.json");
        let reviewer = Attribution::now("Reviewer");
        let mut doc = Document::new(vec![
            Paragraph::new(vec![
                Run::text("Bold").with_format(RunFormat::bold()),
                Run::text(" gone").with_revision(reviewer.revision(RevisionKind::Deletion)),
                Run::object("image", "![a](a.png)"),
            ])
            .with_style("Heading1"),
            Paragraph::default(),
        ]);
        let id = doc.next_comment_id().unwrap();
        doc.add_comment(id, &reviewer, "check this");
        doc.paragraphs[0].runs[0].comments.push(id);

        JsonStore.save(&doc, &path).unwrap();
        let loaded = JsonStore.load(&path).unwrap();

        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_load_minimal_hand_written_document() {
        let dir = create_test_dir();
        let path = create_test_file(
            &dir,
            "doc.json",
            r#"{"paragraphs": [{"runs": [{"content": {"text": "Hello "}}, {"content": {"text": "world"}, "format": {"italic": true}}]}]}"#,
        );

        let doc = JsonStore.load(&path).unwrap();

        assert_eq!(doc.visible_text(), "Hello world");
        assert!(doc.paragraphs[0].runs[1].format.italic);
        assert!(doc.comments.is_empty());
    }

    #[test]
    fn test_load_errors() {
        let dir = create_test_dir();
        assert!(matches!(
            JsonStore.load(&dir.path().join("absent.json")),
            Err(StoreError::NotFound(_))
        ));

        let corrupt = create_test_file(&dir, "corrupt.json", r#"{"paragraphs": 5}"#);
        assert!(matches!(
            JsonStore.load(&corrupt),
            Err(StoreError::Parse { .. })
        ));
    }
}
