use serde::{Deserialize, Serialize};

/// What to do when the contextual text occurs more than once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Skip the edit and log it as ambiguous
    #[default]
    Reject,
    /// Use the earliest occurrence and record the ambiguity in the log
    FirstMatch,
}

/// Options consumed by the edit engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditOptions {
    pub case_sensitive: bool,
    pub author_name: String,
    pub add_tracked_changes: bool,
    pub add_comments: bool,
    pub ambiguity_policy: AmbiguityPolicy,
    /// Let any whitespace run in a needle match any whitespace run in the document
    pub normalize_whitespace: bool,
    /// Count context occurrences that span two paragraphs
    pub cross_paragraph_context: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            author_name: "Redline".to_string(),
            add_tracked_changes: true,
            add_comments: false,
            ambiguity_policy: AmbiguityPolicy::Reject,
            normalize_whitespace: false,
            cross_paragraph_context: false,
        }
    }
}
