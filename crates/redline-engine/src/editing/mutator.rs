//! Replaces a resolved span of visible text inside a paragraph's runs.
//!
//! The replacement is computed on a copy of the paragraph's run list and only
//! committed when every step succeeded, so a failed edit never leaves a
//! half-mutated paragraph behind. Runs outside the span are never touched.
//!
//! Formatting of the replacement is inherited from the first visible run that
//! overlapped the span (its left edge).

use std::ops::Range;

use crate::editing::EditError;
use crate::models::{Attribution, CommentId, Document, ResolvedMatch, RevisionKind, Run, RunContent};

/// How the replacement should be annotated for a reviewer
#[derive(Debug, Clone, Copy)]
pub struct Annotation<'a> {
    pub attribution: &'a Attribution,
    /// Keep the old text as a tracked deletion and mark the new text as an insertion
    pub track_changes: bool,
    /// Comment text to anchor to the replacement
    pub comment: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSummary {
    /// Number of original runs (or run fragments) the span covered
    pub runs_replaced: usize,
    pub comment: Option<CommentId>,
}

pub fn replace_span(
    document: &mut Document,
    target: &ResolvedMatch,
    new_text: &str,
    annotation: &Annotation<'_>,
) -> Result<MutationSummary, EditError> {
    let paragraph = document
        .paragraphs
        .get(target.paragraph_index)
        .ok_or_else(|| {
            EditError::structural(format!("paragraph {} does not exist", target.paragraph_index))
        })?;

    let range = target.range();
    let visible_len = paragraph.visible_len();
    if range.start >= range.end || range.end > visible_len {
        return Err(EditError::structural(format!(
            "span {}..{} is outside paragraph {} of length {}",
            range.start, range.end, target.paragraph_index, visible_len
        )));
    }

    let mut runs = paragraph.runs.clone();
    split_at(&mut runs, range.start)?;
    split_at(&mut runs, range.end)?;

    let span = span_indices(&runs, &range);
    if let Some(run) = runs[span.clone()].iter().find(|run| run.is_object()) {
        let kind = match &run.content {
            RunContent::Object { kind, .. } => kind.as_str(),
            RunContent::Text(_) => "object",
        };
        return Err(EditError::structural(format!(
            "span {}..{} crosses a non-text element ({kind})",
            range.start, range.end
        )));
    }

    let template = runs[span.clone()]
        .iter()
        .find(|run| run.visible_len() > 0)
        .cloned()
        .ok_or_else(|| EditError::structural("span covers no visible text"))?;
    let runs_replaced = runs[span.clone()]
        .iter()
        .filter(|run| run.visible_len() > 0)
        .count();

    let comment_id = match annotation.comment {
        Some(_) => Some(
            document
                .next_comment_id()
                .ok_or_else(|| EditError::structural("no comment id left to allocate"))?,
        ),
        None => None,
    };

    let mut covered: Vec<Run> = Vec::with_capacity(span.len() + 1);
    let mut anchored_to_deletion = false;
    for mut run in runs[span.clone()].iter().cloned() {
        if run.is_deleted() {
            // Earlier tracked deletions stay where they are
            covered.push(run);
        } else if annotation.track_changes && !run.is_inserted() {
            run.revision = Some(annotation.attribution.revision(RevisionKind::Deletion));
            if new_text.is_empty()
                && let Some(id) = comment_id
            {
                run.comments.push(id);
                anchored_to_deletion = true;
            }
            covered.push(run);
        }
        // Untracked text and unaccepted insertions are dropped
    }

    let mut replacement = None;
    if !new_text.is_empty() {
        let mut run = Run {
            content: RunContent::Text(new_text.to_string()),
            format: template.format.clone(),
            revision: annotation
                .track_changes
                .then(|| annotation.attribution.revision(RevisionKind::Insertion)),
            comments: template.comments.clone(),
        };
        if let Some(id) = comment_id {
            run.comments.push(id);
        }
        replacement = Some(run);
    }
    let anchored = replacement.is_some() || anchored_to_deletion;
    covered.extend(replacement);
    runs.splice(span, covered);

    document.paragraphs[target.paragraph_index].runs = runs;

    let comment = match (annotation.comment, comment_id, anchored) {
        (Some(text), Some(id), true) => {
            document.add_comment(id, annotation.attribution, text);
            Some(id)
        }
        (Some(_), _, false) => {
            log::warn!(
                "no run left to anchor comment in paragraph {}",
                target.paragraph_index
            );
            None
        }
        _ => None,
    };

    Ok(MutationSummary {
        runs_replaced,
        comment,
    })
}

/// Make `offset` fall on a run boundary by splitting the visible run that
/// straddles it. Never produces an empty run.
fn split_at(runs: &mut Vec<Run>, offset: usize) -> Result<(), EditError> {
    let mut position = 0;
    for index in 0..runs.len() {
        let width = runs[index].visible_len();
        if width > 0 && position < offset && offset < position + width {
            let local = offset - position;
            let run = &runs[index];
            let RunContent::Text(text) = &run.content else {
                return Err(EditError::structural("cannot split a non-text element"));
            };
            if !text.is_char_boundary(local) {
                return Err(EditError::structural(format!(
                    "offset {offset} is not on a character boundary"
                )));
            }
            let mut left = run.clone();
            let mut right = run.clone();
            left.content = RunContent::Text(text[..local].to_string());
            right.content = RunContent::Text(text[local..].to_string());
            runs[index] = left;
            runs.insert(index + 1, right);
            return Ok(());
        }
        position += width;
    }
    Ok(())
}

/// Indices of the runs covered by `range` once its ends are run boundaries.
///
/// Zero-width runs sitting exactly on either end lie outside the span.
fn span_indices(runs: &[Run], range: &Range<usize>) -> Range<usize> {
    let mut position = 0;
    let mut first = None;
    for (index, run) in runs.iter().enumerate() {
        let width = run.visible_len();
        if first.is_none() && (position > range.start || (position == range.start && width > 0)) {
            first = Some(index);
        }
        if let Some(first) = first
            && position >= range.end
        {
            return first..index;
        }
        position += width;
    }
    first.unwrap_or(runs.len())..runs.len()
}
