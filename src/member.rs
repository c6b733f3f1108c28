//! Member schema: the declared input/output slots of a stage.
//!
//! Stages declare their wireable surface as ordered lists of [`MemberEntry`].
//! The wiring components depend only on this schema, never on stage
//! internals. The schema is populated by the stage's own argument parsing
//! before any wiring happens; the engine then mutates the pipe-related fields
//! (`explicit_pipe`, `member_pipe`, `has_value`) on its snapshot of the
//! entries.

use crate::errors::{PipelineError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Cancellation literal: an explicit pipe value of `None` un-wires and
/// un-sets the member it is applied to.
pub const CANCEL_PIPE: &str = "None";

/// Type tags that are never considered by the auto-wirer. References and
/// handles are only ever connected manually.
const MANUAL_ONLY_TYPES: [&str; 2] = ["id", "handle"];

/// Arity of a member: a single scalar, a fixed-length tuple, or a variable
/// length list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemberLength {
    Scalar,
    Fixed(usize),
    Variable,
}

/// One declared input or output slot of a stage.
#[derive(Debug, Clone, Serialize)]
pub struct MemberEntry {
    /// Semantic field identifier, used for wiring and member access.
    pub member_name: String,
    /// CLI flag (without the leading dash); empty means not CLI-settable.
    pub option_name: String,
    /// Type tag used for compatibility matching ("image", "surface", "str", …).
    pub member_type: String,
    /// Arity of the member.
    pub length: MemberLength,
    /// Whether the auto-wirer may consider this member at all.
    pub auto_pipe: bool,
    /// Input members only: the value was forced by the caller rather than by
    /// a prior stage. Pushed inputs are also eligible as producers for
    /// downstream auto-wiring.
    pub pushed: bool,
    /// Raw unparsed reference (sigil already stripped), or the cancellation
    /// literal, as captured by the stage's own argument parsing.
    pub explicit_pipe: Option<String>,
    /// Resolved source address once wiring decides one; stays `None`
    /// permanently if no source is found.
    pub member_pipe: Option<PipeAddress>,
    /// A literal value has been assigned, which suppresses wiring entirely.
    pub has_value: bool,
}

impl MemberEntry {
    /// Declare an input member (scalar, auto-wirable by default).
    pub fn input(
        member_name: impl Into<String>,
        option_name: impl Into<String>,
        member_type: impl Into<String>,
    ) -> Self {
        Self {
            member_name: member_name.into(),
            option_name: option_name.into(),
            member_type: member_type.into(),
            length: MemberLength::Scalar,
            auto_pipe: true,
            pushed: false,
            explicit_pipe: None,
            member_pipe: None,
            has_value: false,
        }
    }

    /// Declare an output member (scalar, auto-wirable by default).
    pub fn output(
        member_name: impl Into<String>,
        option_name: impl Into<String>,
        member_type: impl Into<String>,
    ) -> Self {
        Self::input(member_name, option_name, member_type)
    }

    /// Override the arity.
    pub fn with_length(mut self, length: MemberLength) -> Self {
        self.length = length;
        self
    }

    /// Exclude this member from automatic wiring.
    pub fn no_auto(mut self) -> Self {
        self.auto_pipe = false;
        self
    }

    /// True when the auto-wirer may try to find a source for this member.
    pub fn auto_wirable(&self) -> bool {
        self.auto_pipe && !MANUAL_ONLY_TYPES.contains(&self.member_type.as_str())
    }

    /// True when this member can act as a producer for downstream wiring:
    /// outputs always, inputs only when their value was pushed by the caller.
    pub fn is_producer(&self, is_output: bool) -> bool {
        is_output || self.pushed
    }
}

/// Resolved source address of a wired member, in the exact form
/// `name-id.memberName`, always referencing a stage strictly earlier in the
/// pipeline than the member's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeAddress {
    pub stage_name: String,
    pub stage_id: u32,
    pub member_name: String,
}

impl PipeAddress {
    pub fn new(stage_name: impl Into<String>, stage_id: u32, member_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            stage_id,
            member_name: member_name.into(),
        }
    }
}

impl fmt::Display for PipeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}.{}", self.stage_name, self.stage_id, self.member_name)
    }
}

impl FromStr for PipeAddress {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let (slot, member_name) = s
            .split_once('.')
            .ok_or_else(|| PipelineError::invalid_pipe(s))?;
        let (stage_name, id) = slot
            .rsplit_once('-')
            .ok_or_else(|| PipelineError::invalid_pipe(s))?;
        let stage_id = id
            .parse::<u32>()
            .map_err(|_| PipelineError::invalid_pipe(s))?;
        if stage_name.is_empty() || member_name.is_empty() {
            return Err(PipelineError::invalid_pipe(s));
        }
        Ok(Self::new(stage_name, stage_id, member_name))
    }
}

impl Serialize for PipeAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Target half of a user-written explicit pipe reference, before the option
/// name is resolved against the target's member lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeTarget {
    /// `.option` — the most recently instantiated stage.
    Previous,
    /// `name.option` — the last stage with this name.
    Named(String),
    /// `name-id.option` — the unique stage with this exact name and id.
    NamedId(String, u32),
}

/// Split a raw explicit reference (sigil already stripped) into its target
/// and option halves.
///
/// The reference is split on the first `.`; exactly two segments are
/// required, otherwise this is a fatal invalid-piping error. A left segment
/// containing `-` must end in a numeric id.
pub fn parse_reference(raw: &str) -> Result<(PipeTarget, &str)> {
    let (left, option) = raw
        .split_once('.')
        .ok_or_else(|| PipelineError::invalid_pipe(raw))?;
    if option.is_empty() {
        return Err(PipelineError::invalid_pipe(raw));
    }
    let target = if left.is_empty() {
        PipeTarget::Previous
    } else if left.contains('-') {
        let (name, id) = left.rsplit_once('-').expect("checked for '-' above");
        let id = id
            .parse::<u32>()
            .map_err(|_| PipelineError::invalid_pipe(raw))?;
        if name.is_empty() {
            return Err(PipelineError::invalid_pipe(raw));
        }
        PipeTarget::NamedId(name.to_string(), id)
    } else {
        PipeTarget::Named(left.to_string())
    };
    Ok((target, option))
}
