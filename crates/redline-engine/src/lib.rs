pub mod editing;
pub mod io;
pub mod models;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{EditEngine, EditError, EditOptions, EditOutcome, EditReport};
pub use io::{DocumentStore, JsonStore, MarkdownStore, StoreError};
pub use models::{Document, EditRequest, EditStatus, LogEntry};
