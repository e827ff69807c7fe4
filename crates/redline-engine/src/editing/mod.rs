/*!
 * # Contextual Edit Engine
 *
 * Locates edit requests inside a run-fragmented document and applies them in
 * place, leaving every unrelated run untouched.
 *
 * ## Architecture Overview
 *
 * ### 1. Visible Text Mapper (`visible_text`)
 * - Flattens paragraphs and runs into one text stream
 * - Keeps a sorted offset index back to (paragraph, run, offset in run)
 * - Borrows the document, so it cannot survive a mutation
 *
 * ### 2. Match Resolver (`resolver`)
 * - Finds the single occurrence of the contextual text, then the specific
 *   text inside it
 * - Applies the case, whitespace and ambiguity policies from `EditOptions`
 * - Never mutates anything
 *
 * ### 3. Run Mutator (`mutator`)
 * - Splits runs so the target span sits on run boundaries
 * - Replaces the span with one run inheriting the left edge's formatting
 * - Optionally records tracked changes and an anchored comment
 * - Commits all or nothing
 *
 * ### 4. Edit Orchestrator (`orchestrator`)
 * - Processes requests strictly in order, rebuilding the map each time
 * - Produces one `LogEntry` per request
 *
 * ## Usage Pattern
 *
 * ```rust
 * use redline_engine::editing::{EditEngine, EditOptions};
 * use redline_engine::models::{Document, EditRequest};
 *
 * let mut doc = Document::from_plain_paragraphs(["The cost would be $101 , to a new number."]);
 * let requests = vec![EditRequest::new(
 *     "cost would be $101 , to a new number",
 *     "$101",
 *     "$208",
 *     "update",
 * )];
 *
 * let report = EditEngine::new(EditOptions::default()).apply_edits(&mut doc, &requests);
 *
 * assert_eq!(report.edits_applied, 1);
 * assert_eq!(doc.visible_text(), "The cost would be $208 , to a new number.");
 * ```
 */

pub mod errors;
pub mod mutator;
pub mod options;
pub mod orchestrator;
pub mod resolver;
pub mod visible_text;

pub use errors::EditError;
pub use mutator::{Annotation, MutationSummary, replace_span};
pub use options::{AmbiguityPolicy, EditOptions};
pub use orchestrator::{EditEngine, EditOutcome, EditReport};
pub use resolver::{Resolution, resolve};
pub use visible_text::{RunPosition, VisibleTextMap};
