//! stagepipe: a command-line dataflow pipeline orchestrator.
//!
//! A pipeline is one flat token stream of independently-authored stages:
//!
//! ```text
//! textreader -ifile in.txt --pipe linefilter -patterns error --pipe printer
//! ```
//!
//! The engine splits the stream into per-stage argument groups, wires each
//! stage's declared inputs to compatible values produced by earlier stages
//! (automatically by member name + type, or explicitly via
//! `-option @stage[-id].option` references), transfers the values, and
//! drives every stage through a fixed lifecycle with one deferred teardown
//! pass at the end of the run.
//!
//! Processing content lives entirely in [`Stage`] implementations; the
//! engine sees them only through the member schema and lifecycle hooks.

pub mod cli;
pub mod errors;
pub mod launcher;
pub mod member;
pub mod pipeline;
pub mod registry;
pub mod stage;
pub mod stages;
pub mod tokens;
pub mod transfer;
pub mod value;
pub mod wiring;

pub use crate::errors::{PipelineError, Result};
pub use crate::launcher::{extract_control_flags, ControlFlags};
pub use crate::member::{MemberEntry, MemberLength, PipeAddress};
pub use crate::pipeline::{Pipeline, PipelineOptions, RunOutcome, RunStatus, WiringReport};
pub use crate::registry::{FactoryRegistry, StageFactory, StageRegistry};
pub use crate::stage::{Proceed, Stage, StageSlot};
pub use crate::value::{StageData, Value};

/// Embedded entry point: run a full launcher-style command line against a
/// registry.
///
/// The leading launcher token and `--` global flags, when present, are
/// extracted per [`launcher::extract_control_flags`]; `--help` prints the
/// usage string and stops without executing anything. Errors are returned,
/// never printed-and-exited; that behavior belongs to the standalone binary.
pub fn run(registry: &dyn StageRegistry, argv: &[String]) -> Result<RunOutcome> {
    let (flags, tokens) = launcher::extract_control_flags(argv);
    if flags.help {
        println!("{}", launcher::usage());
        return Ok(RunOutcome {
            status: RunStatus::Stopped,
            stages_run: 0,
            plan: WiringReport::default(),
        });
    }
    Pipeline::new(registry, flags.into()).execute(&tokens)
}
