pub mod json;
pub mod markdown;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::{Document, EditRequest};

pub use json::JsonStore;
pub use markdown::MarkdownStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Failed to serialize document: {0}")]
    Serialize(String),
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Backing store for documents: how a [`Document`] is read from and written
/// to disk.
pub trait DocumentStore {
    fn load(&self, path: &Path) -> Result<Document, StoreError>;
    fn save(&self, document: &Document, path: &Path) -> Result<(), StoreError>;
}

/// Pick a store by file extension
pub fn store_for_path(path: &Path) -> Result<Box<dyn DocumentStore>, StoreError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => Ok(Box::new(JsonStore)),
        Some("md" | "markdown") => Ok(Box::new(MarkdownStore)),
        _ => Err(StoreError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Read the edit requests produced by the instruction source.
///
/// Accepts either a bare JSON array or an object with an `edits` array.
pub fn load_edit_requests(path: &Path) -> Result<Vec<EditRequest>, StoreError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RequestFile {
        List(Vec<EditRequest>),
        Wrapped { edits: Vec<EditRequest> },
    }

    let content = read_file(path)?;
    let file: RequestFile =
        serde_json::from_str(&content).map_err(|err| StoreError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    Ok(match file {
        RequestFile::List(edits) | RequestFile::Wrapped { edits } => edits,
    })
}

/// `<dir>/<stem><suffix>.<ext>` next to the input file
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(file_name)
}

pub(crate) fn read_file(path: &Path) -> Result<String, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(StoreError::Io)
}

/// Write through a temporary file in the destination directory and rename it
/// into place, so a failed save never leaves a truncated file behind.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(StoreError::Io)?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(StoreError::Io)?;
    file.write_all(contents).map_err(StoreError::Io)?;
    file.flush().map_err(StoreError::Io)?;
    file.persist(path).map_err(|err| StoreError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    Ok(())
}
