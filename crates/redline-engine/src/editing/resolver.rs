//! Resolves an [`EditRequest`] to the exact span it should replace.
//!
//! Resolution is a pure function of the current [`VisibleTextMap`], the
//! request and the [`EditOptions`]: find the single occurrence of the
//! contextual text, then the specific text inside it, then translate the
//! result into paragraph-local offsets.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::editing::{AmbiguityPolicy, EditError, EditOptions, VisibleTextMap};
use crate::models::{EditRequest, ResolvedMatch};

/// Location of an edit plus remarks worth keeping in the audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub location: ResolvedMatch,
    /// Global byte range of the context occurrence that was used
    pub context: Range<usize>,
    pub notes: Vec<String>,
}

pub fn resolve(
    map: &VisibleTextMap<'_>,
    request: &EditRequest,
    options: &EditOptions,
) -> Result<Resolution, EditError> {
    if request.contextual_old_text.is_empty() {
        return Err(EditError::InvalidRequest(
            "contextual_old_text is empty".to_string(),
        ));
    }
    if request.specific_old_text.is_empty() {
        return Err(EditError::InvalidRequest(
            "specific_old_text is empty".to_string(),
        ));
    }

    let context_pattern = Matcher::new(&request.contextual_old_text, options)?;
    let specific_pattern = Matcher::new(&request.specific_old_text, options)?;

    if specific_pattern
        .find_all(&request.contextual_old_text)
        .is_empty()
    {
        return Err(EditError::OutOfContext(
            "specific text is not part of the contextual text".to_string(),
        ));
    }

    let text = map.text();
    let mut contexts = context_pattern.find_all(text);
    if !options.cross_paragraph_context {
        contexts.retain(|range| map.within_one_paragraph(range));
    }

    let mut notes = Vec::new();
    let context = match contexts.as_slice() {
        [] => return Err(EditError::NotFound),
        [only] => only.clone(),
        [first, ..] => match options.ambiguity_policy {
            AmbiguityPolicy::Reject => {
                return Err(EditError::Ambiguous {
                    occurrences: contexts.len(),
                });
            }
            AmbiguityPolicy::FirstMatch => {
                notes.push(format!(
                    "context occurs {} times; used first occurrence at offset {}",
                    contexts.len(),
                    first.start
                ));
                first.clone()
            }
        },
    };

    let window = &text[context.clone()];
    let specifics = specific_pattern.find_all(window);
    let Some(first_specific) = specifics.first() else {
        return Err(EditError::OutOfContext(format!(
            "specific text not found in context at offset {}",
            context.start
        )));
    };
    if specifics.len() > 1 {
        notes.push(format!(
            "specific text occurs {} times within context; used the first",
            specifics.len()
        ));
    }

    let target = context.start + first_specific.start..context.start + first_specific.end;
    let location = map.to_paragraph_local(&target).ok_or_else(|| {
        EditError::structural(format!(
            "specific text at {}..{} crosses a paragraph boundary",
            target.start, target.end
        ))
    })?;

    Ok(Resolution {
        location,
        context,
        notes,
    })
}

/// Literal needle compiled with the active case and whitespace policy
struct Matcher {
    regex: Regex,
}

impl Matcher {
    fn new(needle: &str, options: &EditOptions) -> Result<Self, EditError> {
        let pattern = if options.normalize_whitespace {
            whitespace_tolerant_pattern(needle, options.cross_paragraph_context)
        } else {
            regex::escape(needle)
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|err| EditError::InvalidRequest(err.to_string()))?;
        Ok(Self { regex })
    }

    /// Every occurrence, overlapping ones included
    fn find_all(&self, haystack: &str) -> Vec<Range<usize>> {
        let mut found = Vec::new();
        let mut at = 0;
        while at <= haystack.len() {
            let Some(m) = self.regex.find_at(haystack, at) else {
                break;
            };
            if m.is_empty() {
                break;
            }
            found.push(m.range());
            // Resume one character after the match start
            let step = haystack[m.start()..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            at = m.start() + step;
        }
        found
    }
}

/// Unless matches may span paragraphs, whitespace runs never take in the
/// paragraph separator.
fn whitespace_tolerant_pattern(needle: &str, cross_paragraph: bool) -> String {
    let whitespace = if cross_paragraph { r"\s+" } else { r"[^\S\n]+" };
    let mut pattern = String::new();
    let mut in_whitespace = false;
    let mut buf = [0u8; 4];
    for ch in needle.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                pattern.push_str(whitespace);
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            pattern.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
        }
    }
    pattern
}
