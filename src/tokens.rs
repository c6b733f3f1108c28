//! Argument segmenter: from one flat token stream to per-stage groups.
//!
//! The pipeline command line interleaves stage names with their options,
//! separated by the `--pipe` token:
//!
//! ```text
//! textreader -ifile in.txt --pipe linefilter -pattern x --pipe printer
//! ```
//!
//! Segmentation splits on every separator occurrence; tokens before the
//! first separator, and each run between two separators, become one
//! `(stage name, argument tokens)` group. `n` separators always yield
//! exactly `n+1` groups, empty runs included.

use crate::errors::{PipelineError, Result};

/// Token separating one stage's arguments from the next stage's name.
pub const PIPE_SEPARATOR: &str = "--pipe";

/// Reserved literal a user may write in place of a value to be asked for it
/// interactively. The engine confirms once, then rewrites every occurrence
/// to [`PROMPT_MARKER`].
pub const INTERACTIVE_PLACEHOLDER: &str = "ASK";

/// Marker understood by stage argument parsers as "prompt the user for this
/// value at parse time". Substitution happens in the engine; prompting is the
/// stage's business.
pub const PROMPT_MARKER: &str = "PROMPT";

/// One segmented group: a stage name and the raw tokens that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageArgs {
    pub name: String,
    pub tokens: Vec<String>,
}

impl StageArgs {
    fn from_run(mut run: Vec<String>) -> Self {
        if run.is_empty() {
            Self {
                name: String::new(),
                tokens: Vec::new(),
            }
        } else {
            let name = run.remove(0);
            Self { name, tokens: run }
        }
    }
}

/// Re-split a raw string into tokens, honoring double-quoted spans.
///
/// Content inside a quoted span is kept as one token with interior characters
/// untouched; content outside is split on whitespace. An unmatched quote is a
/// fatal tokenization error.
pub fn split_quoted(raw: &str) -> Result<Vec<String>> {
    if raw.matches('"').count() % 2 == 1 {
        return Err(PipelineError::UnmatchedQuote);
    }
    let mut tokens = Vec::new();
    for (i, span) in raw.split('"').enumerate() {
        if i % 2 == 0 {
            tokens.extend(span.split_whitespace().map(str::to_string));
        } else {
            tokens.push(span.to_string());
        }
    }
    Ok(tokens)
}

/// Apply quote handling to an already-tokenized stream.
///
/// Token lists with no quote characters pass through untouched. Otherwise the
/// stream is re-joined and re-split so quoted spans survive as single tokens.
pub fn normalize(tokens: &[String]) -> Result<Vec<String>> {
    if tokens.iter().any(|t| t.contains('"')) {
        split_quoted(&tokens.join(" "))
    } else {
        Ok(tokens.to_vec())
    }
}

/// Split the token stream into per-stage groups at every separator.
pub fn segment(tokens: &[String]) -> Vec<StageArgs> {
    let mut groups = Vec::new();
    let mut run: Vec<String> = Vec::new();
    for token in tokens {
        if token == PIPE_SEPARATOR {
            groups.push(StageArgs::from_run(std::mem::take(&mut run)));
        } else {
            run.push(token.clone());
        }
    }
    groups.push(StageArgs::from_run(run));
    groups
}

/// Rebuild the token stream from segmented groups, separators included.
pub fn rejoin(groups: &[StageArgs]) -> Vec<String> {
    let mut tokens = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            tokens.push(PIPE_SEPARATOR.to_string());
        }
        if !group.name.is_empty() {
            tokens.push(group.name.clone());
        }
        tokens.extend(group.tokens.iter().cloned());
    }
    tokens
}

/// True when the interactive placeholder appears anywhere in the stream.
pub fn has_placeholder(tokens: &[String]) -> bool {
    tokens.iter().any(|t| t == INTERACTIVE_PLACEHOLDER)
}

/// Rewrite every placeholder occurrence to the prompt marker.
pub fn substitute_placeholder(tokens: &mut [String]) {
    for token in tokens.iter_mut() {
        if token == INTERACTIVE_PLACEHOLDER {
            *token = PROMPT_MARKER.to_string();
        }
    }
}
