//! The stage contract and the pipeline-owned slot wrapping each instance.
//!
//! A [`Stage`] is one independently implemented processing unit. The engine
//! never looks inside one: it drives the lifecycle hooks and reads the member
//! schema, nothing else. Name-indexed member access (`get_member` /
//! `set_member` / `clear_member`) replaces the reflection-style field access
//! of dynamic collaborators with an explicit contract every implementation
//! provides.
//!
//! A [`StageSlot`] binds an instantiated stage to its position in the
//! pipeline: registry name, per-name id, the member-schema snapshot the
//! wiring phases mutate, and the raw argument tokens the stage parsed.

use crate::errors::Result;
use crate::member::MemberEntry;
use crate::value::Value;

/// Outcome of the stage-local option callback: carry on, or cleanly stop the
/// whole pipeline. `Stop` is not an error; it is used when a stage decides
/// nothing further should happen (help requested, preview mode, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proceed {
    Continue,
    Stop,
}

/// Contract every pipeline stage implements.
pub trait Stage {
    /// Ordered input member schema, valid after `parse_arguments`.
    fn input_members(&self) -> Vec<MemberEntry>;

    /// Ordered output member schema, valid after `parse_arguments`.
    fn output_members(&self) -> Vec<MemberEntry>;

    /// Stage-local parsing of the stage's own argument tokens. Populates the
    /// member schema (literals, pushed flags, explicit pipe references) and
    /// may set the disabled flag.
    fn parse_arguments(&mut self, args: &[String]) -> Result<()>;

    /// Set during `parse_arguments`; a disabled stage is skipped (not run,
    /// not torn down) but stays addressable for wiring.
    fn disabled(&self) -> bool {
        false
    }

    /// Callback after auto-wiring; may abort the whole pipeline by returning
    /// [`Proceed::Stop`].
    fn apply_options(&mut self) -> Result<Proceed> {
        Ok(Proceed::Continue)
    }

    /// Fetch the current value of a named member, if one is set.
    fn get_member(&self, name: &str) -> Option<Value>;

    /// Assign a value onto the field named by an input member.
    fn set_member(&mut self, name: &str, value: Value) -> Result<()>;

    /// Un-set the field named by an input member.
    fn clear_member(&mut self, name: &str);

    /// External-read hook: acquire inputs from outside the pipeline.
    fn read_inputs(&mut self) -> Result<()> {
        Ok(())
    }

    /// The stage's processing step.
    fn run(&mut self) -> Result<()>;

    /// External-write hook: emit outputs outside the pipeline.
    fn write_outputs(&mut self) -> Result<()> {
        Ok(())
    }

    /// Resource release, called once at end of the whole pipeline run.
    fn teardown(&mut self) {}
}

/// One pipeline element: an instantiated stage plus its wiring metadata.
pub struct StageSlot {
    /// Registry key the stage was loaded under.
    pub name: String,
    /// Per-name sequence number (0, 1, 2, …) disambiguating same-named
    /// stages; assigned by position among them.
    pub id: u32,
    /// Input member snapshot; the wiring phases mutate the pipe fields here.
    pub inputs: Vec<MemberEntry>,
    /// Output member snapshot.
    pub outputs: Vec<MemberEntry>,
    /// The tokens handed to this stage's own parser.
    pub raw_arguments: Vec<String>,
    /// Set by the stage during its own argument parsing.
    pub disabled: bool,
    stage: Box<dyn Stage>,
}

impl StageSlot {
    pub fn new(name: impl Into<String>, id: u32, stage: Box<dyn Stage>) -> Self {
        Self {
            name: name.into(),
            id,
            inputs: Vec::new(),
            outputs: Vec::new(),
            raw_arguments: Vec::new(),
            disabled: false,
            stage,
        }
    }

    /// The slot's `name-id` label, as used in pipe addresses and logs.
    pub fn label(&self) -> String {
        format!("{}-{}", self.name, self.id)
    }

    /// Run the stage's own argument parsing, then snapshot its member schema
    /// and disabled flag.
    pub fn parse_arguments(&mut self, tokens: &[String]) -> Result<()> {
        self.raw_arguments = tokens.to_vec();
        self.stage.parse_arguments(tokens)?;
        self.inputs = self.stage.input_members();
        self.outputs = self.stage.output_members();
        self.disabled = self.stage.disabled();
        Ok(())
    }

    pub fn apply_options(&mut self) -> Result<Proceed> {
        self.stage.apply_options()
    }

    pub fn get_member(&self, name: &str) -> Option<Value> {
        self.stage.get_member(name)
    }

    pub fn set_member(&mut self, name: &str, value: Value) -> Result<()> {
        self.stage.set_member(name, value)
    }

    pub fn clear_member(&mut self, name: &str) {
        self.stage.clear_member(name)
    }

    pub fn read_inputs(&mut self) -> Result<()> {
        self.stage.read_inputs()
    }

    pub fn run(&mut self) -> Result<()> {
        self.stage.run()
    }

    pub fn write_outputs(&mut self) -> Result<()> {
        self.stage.write_outputs()
    }

    pub fn teardown(&mut self) {
        self.stage.teardown()
    }

    /// Last producer member compatible with the given name and type tag:
    /// pushed inputs and outputs are considered, in that order, and the last
    /// match wins so an output beats a same-named pushed input.
    pub fn last_compatible_producer(
        &self,
        member_name: &str,
        member_type: &str,
    ) -> Option<&MemberEntry> {
        let pushed = self.inputs.iter().filter(|m| m.pushed);
        let producers = pushed.chain(self.outputs.iter());
        producers
            .filter(|m| m.member_name == member_name && m.member_type == member_type)
            .last()
    }

    /// Resolve an option name against this slot's members, outputs first,
    /// falling back to inputs. Members without a CLI option never match.
    pub fn find_option(&self, option_name: &str) -> Option<&MemberEntry> {
        self.outputs
            .iter()
            .chain(self.inputs.iter())
            .filter(|m| !m.option_name.is_empty())
            .find(|m| m.option_name == option_name)
    }
}
