use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator placed between paragraphs in the flattened visible text
pub const PARAGRAPH_SEPARATOR: char = '\n';

/// A formatted document: an ordered sequence of paragraphs plus the comments
/// anchored into them.
///
/// The document is the single source of truth while edits are applied. Any
/// derived view (see [`crate::editing::VisibleTextMap`]) borrows it and has to
/// be rebuilt after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

impl Document {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            comments: Vec::new(),
        }
    }

    /// Build a document of unformatted single-run paragraphs
    pub fn from_plain_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(paragraphs.into_iter().map(Paragraph::plain).collect())
    }

    /// Visible text of the whole document, paragraphs joined by [`PARAGRAPH_SEPARATOR`]
    pub fn visible_text(&self) -> String {
        let mut text = String::new();
        for (index, paragraph) in self.paragraphs.iter().enumerate() {
            if index > 0 {
                text.push(PARAGRAPH_SEPARATOR);
            }
            paragraph.push_visible_text(&mut text);
        }
        text
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == id)
    }

    /// Next free comment id (one past the highest id in use), or `None` once
    /// the id space is exhausted
    pub fn next_comment_id(&self) -> Option<CommentId> {
        match self.comments.iter().map(|comment| comment.id.0).max() {
            Some(highest) => highest.checked_add(1).map(CommentId),
            None => Some(CommentId::default()),
        }
    }

    pub(crate) fn add_comment(&mut self, id: CommentId, attribution: &Attribution, text: &str) {
        self.comments.push(Comment {
            id,
            author: attribution.author.clone(),
            timestamp: attribution.timestamp,
            text: text.to_string(),
        });
    }
}

/// An ordered sequence of runs. The concatenation of the visible text of its
/// runs is the paragraph's visible text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { style: None, runs }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self::new(vec![Run::text(text)])
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn visible_text(&self) -> String {
        let mut text = String::new();
        self.push_visible_text(&mut text);
        text
    }

    /// Length in bytes of the paragraph's visible text
    pub fn visible_len(&self) -> usize {
        self.runs.iter().map(Run::visible_len).sum()
    }

    fn push_visible_text(&self, out: &mut String) {
        for run in &self.runs {
            out.push_str(run.visible_text());
        }
    }
}

/// A contiguous fragment of a paragraph sharing one formatting attribute set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub content: RunContent,
    #[serde(default, skip_serializing_if = "RunFormat::is_plain")]
    pub format: RunFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<CommentId>,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            format: RunFormat::default(),
            revision: None,
            comments: Vec::new(),
        }
    }

    pub fn object(kind: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: RunContent::Object {
                kind: kind.into(),
                source: source.into(),
            },
            format: RunFormat::default(),
            revision: None,
            comments: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: RunFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Raw text of a text run, including text of tracked deletions
    pub fn raw_text(&self) -> Option<&str> {
        match &self.content {
            RunContent::Text(text) => Some(text),
            RunContent::Object { .. } => None,
        }
    }

    /// Text that a reader sees: empty for objects and tracked deletions
    pub fn visible_text(&self) -> &str {
        if self.is_deleted() {
            return "";
        }
        self.raw_text().unwrap_or("")
    }

    pub fn visible_len(&self) -> usize {
        self.visible_text().len()
    }

    pub fn is_object(&self) -> bool {
        matches!(self.content, RunContent::Object { .. })
    }

    pub fn is_deleted(&self) -> bool {
        matches!(
            self.revision,
            Some(Revision {
                kind: RevisionKind::Deletion,
                ..
            })
        )
    }

    pub fn is_inserted(&self) -> bool {
        matches!(
            self.revision,
            Some(Revision {
                kind: RevisionKind::Insertion,
                ..
            })
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunContent {
    Text(String),
    /// Opaque non-text element (image, line break, field). Has no visible text
    /// and can never be split or removed by an edit.
    Object { kind: String, source: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub code: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
    /// Hyperlink target when the run is the text of a link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl RunFormat {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Tracked-change metadata carried by a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub kind: RevisionKind,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionKind {
    Insertion,
    Deletion,
}

/// Author and time stamped onto the revisions and comments of one edit
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl Attribution {
    pub fn now(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn revision(&self, kind: RevisionKind) -> Revision {
        Revision {
            kind,
            author: self.author.clone(),
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u32);

/// Reviewer comment anchored to every run listing its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}
