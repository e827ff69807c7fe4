pub mod audit;
pub mod document;
pub mod edit_request;

pub use audit::{EditStatus, LogEntry, ResolvedMatch};
pub use document::{
    Attribution, Comment, CommentId, Document, PARAGRAPH_SEPARATOR, Paragraph, Revision,
    RevisionKind, Run, RunContent, RunFormat,
};
pub use edit_request::EditRequest;
