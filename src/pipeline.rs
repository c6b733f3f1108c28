//! The executor: pipeline assembly, per-stage lifecycle, deferred teardown.
//!
//! One [`Pipeline`] value is one run. `execute` consumes it, driving every
//! stage through a fixed sequence: instantiate → parse own arguments →
//! auto-wire → options callback → (skip if disabled) → explicit-wire →
//! transfer → external-read → run → external-write → append to the executed
//! list. The run is strictly sequential: slot *k* finishes every step before
//! slot *k+1* starts, so wiring for *k+1* can only ever see slots 0..k.
//!
//! Teardown is one pass at the very end, over executed slots in their
//! original order, and happens whether the run completed, stopped cleanly,
//! or aborted on a fatal error. Values shared across slots stay alive until
//! then; a producer is never torn down before its consumers.

use crate::errors::Result;
use crate::launcher::ControlFlags;
use crate::registry::StageRegistry;
use crate::stage::{Proceed, StageSlot};
use crate::{tokens, transfer, wiring};
use serde::Serialize;

/// Pipeline-global execution options.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Run the auto-wirer for each stage (off with `--no-auto`).
    pub auto_pipe: bool,
    /// Suppress informational log output.
    pub quiet: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            auto_pipe: true,
            quiet: false,
        }
    }
}

impl From<ControlFlags> for PipelineOptions {
    fn from(flags: ControlFlags) -> Self {
        Self {
            auto_pipe: flags.auto_pipe,
            quiet: flags.quiet,
        }
    }
}

/// How a run ended, when it did not abort with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every stage ran.
    Completed,
    /// A stage signaled "do not proceed", or the operator declined the
    /// interactive-placeholder confirmation. Not an error.
    Stopped,
}

/// Result of a finished run.
#[derive(Debug)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Stages that reached the executed list (ran and were torn down).
    pub stages_run: usize,
    /// The resolved wiring plan, for reporting.
    pub plan: WiringReport,
}

/// Serializable view of the resolved wiring, one entry per slot.
#[derive(Debug, Default, Serialize)]
pub struct WiringReport {
    pub stages: Vec<SlotReport>,
}

#[derive(Debug, Serialize)]
pub struct SlotReport {
    pub name: String,
    pub id: u32,
    pub disabled: bool,
    pub executed: bool,
    pub inputs: Vec<InputReport>,
}

#[derive(Debug, Serialize)]
pub struct InputReport {
    pub member_name: String,
    pub member_type: String,
    /// Resolved source address, if wiring found one.
    pub source: Option<String>,
    /// A caller-supplied literal suppressed wiring for this input.
    pub literal: bool,
}

/// One pipeline run over a registry.
pub struct Pipeline<'a> {
    registry: &'a dyn StageRegistry,
    options: PipelineOptions,
    confirm: Option<Box<dyn FnMut() -> bool + 'a>>,
    slots: Vec<StageSlot>,
    executed: Vec<usize>,
}

impl<'a> Pipeline<'a> {
    pub fn new(registry: &'a dyn StageRegistry, options: PipelineOptions) -> Self {
        Self {
            registry,
            options,
            confirm: None,
            slots: Vec::new(),
            executed: Vec::new(),
        }
    }

    /// Install the operator-confirmation callback used when the interactive
    /// placeholder appears in the token stream. Without one, substitution
    /// proceeds unasked.
    pub fn with_confirm(mut self, confirm: impl FnMut() -> bool + 'a) -> Self {
        self.confirm = Some(Box::new(confirm));
        self
    }

    /// Run the whole pipeline. Consumes the run; teardown of every executed
    /// stage happens before this returns, error or not.
    pub fn execute(mut self, raw_tokens: &[String]) -> Result<RunOutcome> {
        let result = self.run_stages(raw_tokens);
        self.teardown_executed();
        let status = result?;
        Ok(RunOutcome {
            status,
            stages_run: self.executed.len(),
            plan: self.report(),
        })
    }

    fn run_stages(&mut self, raw_tokens: &[String]) -> Result<RunStatus> {
        let mut stream = tokens::normalize(raw_tokens)?;
        if tokens::has_placeholder(&stream) {
            if let Some(confirm) = self.confirm.as_mut() {
                if !confirm() {
                    self.log("run declined at interactive placeholder");
                    return Ok(RunStatus::Stopped);
                }
            }
            tokens::substitute_placeholder(&mut stream);
        }

        let groups = tokens::segment(&stream);
        self.log(&format!("pipeline of {} stage(s)", groups.len()));

        for group in groups {
            let stage = self.registry.create(&group.name)?;
            let id = self.slots.iter().filter(|s| s.name == group.name).count() as u32;
            let mut slot = StageSlot::new(&group.name, id, stage);

            slot.parse_arguments(&group.tokens)?;
            if self.options.auto_pipe {
                wiring::auto_wire(&mut slot, &self.slots);
            }
            if slot.apply_options()? == Proceed::Stop {
                self.log(&format!("{} requested stop", slot.label()));
                self.slots.push(slot);
                return Ok(RunStatus::Stopped);
            }
            if slot.disabled {
                self.log(&format!("{} disabled, skipping", slot.label()));
                self.slots.push(slot);
                continue;
            }
            wiring::explicit_wire(&mut slot, &self.slots)?;
            transfer::transfer_inputs(&mut slot, &self.slots)?;

            self.log(&format!("running {}", slot.label()));
            slot.read_inputs()?;
            slot.run()?;
            slot.write_outputs()?;

            self.slots.push(slot);
            self.executed.push(self.slots.len() - 1);
        }
        Ok(RunStatus::Completed)
    }

    /// One teardown call per executed slot, in original execution order.
    fn teardown_executed(&mut self) {
        for i in 0..self.executed.len() {
            let index = self.executed[i];
            let label = self.slots[index].label();
            log::debug!("tearing down {label}");
            self.slots[index].teardown();
        }
    }

    fn report(&self) -> WiringReport {
        WiringReport {
            stages: self
                .slots
                .iter()
                .enumerate()
                .map(|(index, slot)| SlotReport {
                    name: slot.name.clone(),
                    id: slot.id,
                    disabled: slot.disabled,
                    executed: self.executed.contains(&index),
                    inputs: slot
                        .inputs
                        .iter()
                        .map(|input| InputReport {
                            member_name: input.member_name.clone(),
                            member_type: input.member_type.clone(),
                            source: input.member_pipe.as_ref().map(|a| a.to_string()),
                            literal: input.has_value,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn log(&self, message: &str) {
        if !self.options.quiet {
            log::info!("{message}");
        }
    }
}
