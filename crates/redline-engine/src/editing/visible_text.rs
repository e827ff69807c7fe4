//! Flattened, searchable view of a run-fragmented document.
//!
//! A [`VisibleTextMap`] concatenates the visible text of every run, paragraph
//! by paragraph, and keeps a sorted index from any byte offset of that text
//! back to the run that owns it. The map borrows the document, so the borrow
//! checker guarantees it cannot outlive the next mutation: it is rebuilt from
//! scratch before every edit, never patched.

use std::ops::Range;

use crate::models::{Document, PARAGRAPH_SEPARATOR, ResolvedMatch};

/// Position of one byte of visible text inside the run structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPosition {
    pub paragraph_index: usize,
    pub run_index: usize,
    pub offset_in_run: usize,
}

/// A run with non-empty visible text and its global byte range
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    range: Range<usize>,
    paragraph_index: usize,
    run_index: usize,
}

#[derive(Debug)]
pub struct VisibleTextMap<'doc> {
    document: &'doc Document,
    text: String,
    /// Global byte range of each paragraph's text, separator excluded
    paragraphs: Vec<Range<usize>>,
    segments: Vec<Segment>,
}

impl<'doc> VisibleTextMap<'doc> {
    pub fn build(document: &'doc Document) -> Self {
        let mut text = String::new();
        let mut paragraphs = Vec::with_capacity(document.paragraphs.len());
        let mut segments = Vec::new();

        for (paragraph_index, paragraph) in document.paragraphs.iter().enumerate() {
            if paragraph_index > 0 {
                text.push(PARAGRAPH_SEPARATOR);
            }
            let paragraph_start = text.len();
            for (run_index, run) in paragraph.runs.iter().enumerate() {
                let visible = run.visible_text();
                if visible.is_empty() {
                    continue;
                }
                let start = text.len();
                text.push_str(visible);
                segments.push(Segment {
                    range: start..text.len(),
                    paragraph_index,
                    run_index,
                });
            }
            paragraphs.push(paragraph_start..text.len());
        }

        Self {
            document,
            text,
            paragraphs,
            segments,
        }
    }

    pub fn document(&self) -> &'doc Document {
        self.document
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraph_range(&self, paragraph_index: usize) -> Option<Range<usize>> {
        self.paragraphs.get(paragraph_index).cloned()
    }

    /// Paragraph whose text contains `offset`. A paragraph's end offset (where
    /// its trailing separator sits) maps to that paragraph.
    pub fn paragraph_at(&self, offset: usize) -> Option<usize> {
        let index = self
            .paragraphs
            .partition_point(|range| range.start <= offset)
            .checked_sub(1)?;
        (offset <= self.paragraphs[index].end).then_some(index)
    }

    /// Run owning the byte at `offset`
    pub fn locate(&self, offset: usize) -> Option<RunPosition> {
        let index = self
            .segments
            .partition_point(|segment| segment.range.start <= offset)
            .checked_sub(1)?;
        let segment = &self.segments[index];
        segment.range.contains(&offset).then(|| RunPosition {
            paragraph_index: segment.paragraph_index,
            run_index: segment.run_index,
            offset_in_run: offset - segment.range.start,
        })
    }

    /// Whether a global range stays inside a single paragraph
    pub fn within_one_paragraph(&self, range: &Range<usize>) -> bool {
        match self.paragraph_at(range.start) {
            Some(index) => range.end <= self.paragraphs[index].end,
            None => false,
        }
    }

    /// Translate a global range into paragraph-local offsets.
    ///
    /// Returns `None` when the range crosses a paragraph boundary.
    pub fn to_paragraph_local(&self, range: &Range<usize>) -> Option<ResolvedMatch> {
        let paragraph_index = self.paragraph_at(range.start)?;
        let paragraph = &self.paragraphs[paragraph_index];
        if range.end > paragraph.end || range.end < range.start {
            return None;
        }
        Some(ResolvedMatch {
            paragraph_index,
            start_offset: range.start - paragraph.start,
            end_offset: range.end - paragraph.start,
        })
    }
}
