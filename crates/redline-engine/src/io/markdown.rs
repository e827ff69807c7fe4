//! Markdown document store.
//!
//! Loading maps CommonMark blocks onto paragraphs (headings, list items, block
//! quotes and code blocks keep their kind as the paragraph style) and inline
//! emphasis, strong, code and links onto run formatting. Images, hard breaks,
//! raw HTML and rules become opaque objects so edits can never cut through
//! them. Soft line breaks are read as spaces.
//!
//! List items record their marker and nesting level in the style: `ListItem`
//! or `ListItem<level>` for bullets, `NumberedItem:<n>` or
//! `NumberedItem<level>:<n>` for ordered items.
//!
//! Saving writes Markdown back out and renders review annotations as
//! CriticMarkup: `{++inserted++}`, `{--deleted--}` and `{>>comment<<}`.

use std::path::Path;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::io::{DocumentStore, StoreError, read_file, write_atomic};
use crate::models::{Document, Paragraph, RevisionKind, Run, RunContent, RunFormat};

const LIST_ITEM_STYLE: &str = "ListItem";
const NUMBERED_ITEM_STYLE: &str = "NumberedItem";
const QUOTE_STYLE: &str = "Quote";
const CODE_BLOCK_STYLE: &str = "CodeBlock";
const HTML_STYLE: &str = "Html";

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMarker {
    Bullet,
    Numbered(u64),
}

/// Marker and nesting level of a list item paragraph (level 1 is top level)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListItemStyle {
    marker: ListMarker,
    level: usize,
}

impl ListItemStyle {
    fn parse(style: &str) -> Option<Self> {
        fn level(digits: &str) -> Option<usize> {
            if digits.is_empty() {
                return Some(1);
            }
            digits.parse().ok().filter(|level| *level >= 1)
        }

        if let Some(rest) = style.strip_prefix(NUMBERED_ITEM_STYLE) {
            let (digits, number) = rest.split_once(':')?;
            return Some(Self {
                marker: ListMarker::Numbered(number.parse().ok()?),
                level: level(digits)?,
            });
        }
        let rest = style.strip_prefix(LIST_ITEM_STYLE)?;
        Some(Self {
            marker: ListMarker::Bullet,
            level: level(rest)?,
        })
    }

    fn to_style(self) -> String {
        let level = if self.level > 1 {
            self.level.to_string()
        } else {
            String::new()
        };
        match self.marker {
            ListMarker::Bullet => format!("{LIST_ITEM_STYLE}{level}"),
            ListMarker::Numbered(number) => format!("{NUMBERED_ITEM_STYLE}{level}:{number}"),
        }
    }

    /// Indentation plus marker; four spaces per level nest under either marker
    fn prefix(self) -> String {
        let indent = "    ".repeat(self.level - 1);
        match self.marker {
            ListMarker::Bullet => format!("{indent}- "),
            ListMarker::Numbered(number) => format!("{indent}{number}. "),
        }
    }
}

impl DocumentStore for MarkdownStore {
    fn load(&self, path: &Path) -> Result<Document, StoreError> {
        let content = read_file(path)?;
        Ok(parse_markdown(&content))
    }

    fn save(&self, document: &Document, path: &Path) -> Result<(), StoreError> {
        write_atomic(path, render_markdown(document).as_bytes())
    }
}

pub fn parse_markdown(source: &str) -> Document {
    let mut reader = MarkdownReader::default();
    for event in Parser::new_ext(source, Options::empty()) {
        reader.handle(event);
    }
    reader.finish()
}

#[derive(Debug)]
struct ImageState {
    url: String,
    title: String,
    alt: String,
}

#[derive(Debug, Default)]
struct MarkdownReader {
    paragraphs: Vec<Paragraph>,
    current: Option<Paragraph>,
    /// One entry per open block: whether that block opened `current`
    blocks: Vec<bool>,
    quote_depth: usize,
    /// Next item number of each open list, `None` for bullet lists
    lists: Vec<Option<u64>>,
    emphasis: usize,
    strong: usize,
    links: Vec<String>,
    image: Option<ImageState>,
}

impl MarkdownReader {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_text(&text, RunFormat::default()),
            Event::Code(text) => {
                let code = RunFormat {
                    code: true,
                    ..RunFormat::default()
                };
                self.push_text(&text, code);
            }
            Event::SoftBreak => self.push_text(" ", RunFormat::default()),
            Event::HardBreak => self.push_object(Run::object("break", "\\\n")),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_object(Run::object("html", html.to_string()))
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_object(Run::object("task", marker));
            }
            Event::Rule => {
                self.flush();
                self.paragraphs
                    .push(Paragraph::new(vec![Run::object("rule", "---")]));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open_block(None, false),
            Tag::Heading { level, .. } => {
                self.open_block(Some(format!("Heading{}", level as usize)), true)
            }
            Tag::Item => {
                let style = self.next_item_style().to_style();
                self.open_block(Some(style), true)
            }
            Tag::CodeBlock(_) => self.open_block(Some(CODE_BLOCK_STYLE.to_string()), true),
            Tag::HtmlBlock => self.open_block(Some(HTML_STYLE.to_string()), true),
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Emphasis => self.emphasis += 1,
            Tag::Strong => self.strong += 1,
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(ImageState {
                    url: dest_url.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                })
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::Item
            | TagEnd::CodeBlock
            | TagEnd::HtmlBlock => self.close_block(),
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Link => {
                self.links.pop();
            }
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    let source = if image.title.is_empty() {
                        format!("![{}]({})", image.alt, image.url)
                    } else {
                        format!("![{}]({} \"{}\")", image.alt, image.url, image.title)
                    };
                    self.push_object(Run::object("image", source));
                }
            }
            _ => {}
        }
    }

    fn next_item_style(&mut self) -> ListItemStyle {
        let level = self.lists.len().max(1);
        let marker = match self.lists.last_mut() {
            Some(Some(next)) => {
                let number = *next;
                *next += 1;
                ListMarker::Numbered(number)
            }
            _ => ListMarker::Bullet,
        };
        ListItemStyle { marker, level }
    }

    fn open_block(&mut self, style: Option<String>, starts_paragraph: bool) {
        if starts_paragraph {
            self.flush();
        }
        if self.current.is_some() {
            self.blocks.push(false);
            return;
        }
        let style = style.or_else(|| (self.quote_depth > 0).then(|| QUOTE_STYLE.to_string()));
        self.current = Some(Paragraph { style, runs: Vec::new() });
        self.blocks.push(true);
    }

    fn close_block(&mut self) {
        if self.blocks.pop() == Some(true) {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if let Some(paragraph) = self.current.take() {
            self.paragraphs.push(paragraph);
        }
    }

    fn current_mut(&mut self) -> &mut Paragraph {
        let quoted = self.quote_depth > 0;
        self.current.get_or_insert_with(|| Paragraph {
            style: quoted.then(|| QUOTE_STYLE.to_string()),
            runs: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str, base: RunFormat) {
        if let Some(image) = self.image.as_mut() {
            image.alt.push_str(text);
            return;
        }
        let format = RunFormat {
            bold: self.strong > 0,
            italic: self.emphasis > 0,
            link: self.links.last().cloned(),
            ..base
        };
        let paragraph = self.current_mut();
        if let Some(last) = paragraph.runs.last_mut()
            && last.format == format
            && last.revision.is_none()
            && let RunContent::Text(existing) = &mut last.content
        {
            existing.push_str(text);
            return;
        }
        paragraph.runs.push(Run::text(text).with_format(format));
    }

    fn push_object(&mut self, run: Run) {
        self.current_mut().runs.push(run);
    }

    fn finish(mut self) -> Document {
        self.flush();
        Document::new(self.paragraphs)
    }
}

pub fn render_markdown(document: &Document) -> String {
    let blocks: Vec<String> = document
        .paragraphs
        .iter()
        .map(|paragraph| render_paragraph(paragraph, document))
        .collect();
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn render_paragraph(paragraph: &Paragraph, document: &Document) -> String {
    let style = paragraph.style.as_deref();
    let raw = matches!(style, Some(CODE_BLOCK_STYLE) | Some(HTML_STYLE));
    let mut body = render_runs(&paragraph.runs, document, raw);
    if !raw && paragraph.runs.first().is_some_and(|run| !run.is_object()) {
        body = escape_block_start(body);
    }
    match style {
        Some(CODE_BLOCK_STYLE) => {
            let mut block = format!("```\n{body}");
            if !block.ends_with('\n') {
                block.push('\n');
            }
            block.push_str("```");
            block
        }
        Some(HTML_STYLE) => body.trim_end_matches('\n').to_string(),
        Some(QUOTE_STYLE) => format!("> {body}"),
        Some(other) => {
            if let Some(item) = ListItemStyle::parse(other) {
                format!("{}{body}", item.prefix())
            } else if let Some(level) = heading_level(other) {
                format!("{} {body}", "#".repeat(level))
            } else {
                body
            }
        }
        None => body,
    }
}

fn heading_level(style: &str) -> Option<usize> {
    style
        .strip_prefix("Heading")?
        .parse::<usize>()
        .ok()
        .filter(|level| (1..=6).contains(level))
}

fn render_runs(runs: &[Run], document: &Document, raw: bool) -> String {
    let groups = group_runs(runs);
    let mut out = String::new();
    for (index, group) in groups.iter().enumerate() {
        out.push_str(&render_run(&merge_group(group), raw));
        for id in &group[0].comments {
            let continues = groups
                .get(index + 1)
                .is_some_and(|next| next[0].comments.contains(id));
            if !continues && let Some(comment) = document.comment(*id) {
                out.push_str(&format!("{{>>{}: {}<<}}", comment.author, comment.text));
            }
        }
    }
    out
}

/// Split into maximal stretches of text runs that render identically, so an
/// edit inside a formatted run never leaves back-to-back emphasis markers.
fn group_runs(runs: &[Run]) -> Vec<&[Run]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for index in 1..=runs.len() {
        if index == runs.len() || !renders_together(&runs[index - 1], &runs[index]) {
            groups.push(&runs[start..index]);
            start = index;
        }
    }
    groups
}

fn renders_together(left: &Run, right: &Run) -> bool {
    !left.is_object()
        && !right.is_object()
        && left.format == right.format
        && left.revision == right.revision
        && left.comments == right.comments
}

fn merge_group(group: &[Run]) -> Run {
    let mut merged = group[0].clone();
    if group.len() > 1 {
        merged.content = RunContent::Text(group.iter().filter_map(Run::raw_text).collect());
    }
    merged
}

fn render_run(run: &Run, raw: bool) -> String {
    let body = match &run.content {
        RunContent::Object { source, .. } => source.clone(),
        RunContent::Text(text) if raw => text.clone(),
        RunContent::Text(text) => render_formatted(text, &run.format),
    };
    match run.revision.as_ref().map(|revision| revision.kind) {
        Some(RevisionKind::Insertion) => format!("{{++{body}++}}"),
        Some(RevisionKind::Deletion) => format!("{{--{body}--}}"),
        None => body,
    }
}

fn render_formatted(text: &str, format: &RunFormat) -> String {
    let mut body = if format.code {
        code_span(text)
    } else {
        escape(text)
    };
    if format.italic {
        body = wrap_delimited(&body, "*", "*");
    }
    if format.bold {
        body = wrap_delimited(&body, "**", "**");
    }
    if format.underline {
        body = wrap_delimited(&body, "<u>", "</u>");
    }
    if let Some(url) = &format.link {
        body = format!("[{body}]({url})");
    }
    body
}

/// Wrap in delimiters, keeping surrounding whitespace outside them
fn wrap_delimited(body: &str, open: &str, close: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return body.to_string();
    }
    let start = body.len() - body.trim_start().len();
    let end = start + trimmed.len();
    format!("{}{open}{trimmed}{close}{}", &body[..start], &body[end..])
}

fn code_span(text: &str) -> String {
    if text.contains('`') {
        format!("`` {text} ``")
    } else {
        format!("`{text}`")
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '`' | '[' | ']' | '<' | '&') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Keep paragraph text from reading as a heading, quote, list item or rule
fn escape_block_start(body: String) -> String {
    if body.starts_with(['#', '>', '-', '+', '=']) {
        return format!("\\{body}");
    }
    let digits = body.len() - body.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if (1..=9).contains(&digits) && body[digits..].starts_with(['.', ')']) {
        return format!("{}\\{}", &body[..digits], &body[digits..]);
    }
    body
}
