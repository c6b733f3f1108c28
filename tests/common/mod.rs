#![allow(dead_code)]

//! Shared test collaborator: a stage that records every lifecycle hook it
//! passes through and can be configured to produce values, stop the
//! pipeline, or fail in a chosen hook.

use stagepipe::errors::{PipelineError, Result};
use stagepipe::member::MemberEntry;
use stagepipe::stage::{Proceed, Stage};
use stagepipe::stages::StageBase;
use stagepipe::value::Value;
use std::sync::{Arc, Mutex};

/// Append-only event log shared between the test and its stages.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count_of(&self, suffix: &str) -> usize {
        self.snapshot()
            .iter()
            .filter(|e| e.ends_with(suffix))
            .count()
    }
}

/// Which hook a [`RecorderStage`] should fail in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Read,
    Run,
    Write,
}

/// Configurable recording stage built on the same option-parsing base as the
/// shipped stages, so `@` references, `None` and literals all work from raw
/// tokens.
pub struct RecorderStage {
    base: StageBase,
    log: EventLog,
    produce: Vec<(String, Value)>,
    stop_in_apply: bool,
    fail_in: Option<Hook>,
}

impl RecorderStage {
    pub fn new(name: &'static str, log: EventLog) -> Self {
        Self {
            base: StageBase::new(name, Vec::new(), Vec::new()),
            log,
            produce: Vec::new(),
            stop_in_apply: false,
            fail_in: None,
        }
    }

    pub fn with_input(mut self, entry: MemberEntry) -> Self {
        self.base.inputs.push(entry);
        self
    }

    pub fn with_output(mut self, entry: MemberEntry) -> Self {
        self.base.outputs.push(entry);
        self
    }

    /// Set a member value during `run`.
    pub fn producing(mut self, member: impl Into<String>, value: Value) -> Self {
        self.produce.push((member.into(), value));
        self
    }

    pub fn stopping(mut self) -> Self {
        self.stop_in_apply = true;
        self
    }

    pub fn failing_in(mut self, hook: Hook) -> Self {
        self.fail_in = Some(hook);
        self
    }

    fn record(&self, hook: &str) {
        self.log.push(format!("{}:{hook}", self.base.name));
    }

    fn maybe_fail(&self, hook: Hook) -> Result<()> {
        if self.fail_in == Some(hook) {
            return Err(PipelineError::stage(self.base.name, "induced failure"));
        }
        Ok(())
    }
}

impl Stage for RecorderStage {
    fn input_members(&self) -> Vec<MemberEntry> {
        self.base.inputs.clone()
    }

    fn output_members(&self) -> Vec<MemberEntry> {
        self.base.outputs.clone()
    }

    fn parse_arguments(&mut self, args: &[String]) -> Result<()> {
        self.record("parse");
        self.base.parse_arguments(args)
    }

    fn disabled(&self) -> bool {
        self.base.disabled
    }

    fn apply_options(&mut self) -> Result<Proceed> {
        self.record("apply");
        if self.stop_in_apply {
            return Ok(Proceed::Stop);
        }
        Ok(Proceed::Continue)
    }

    fn get_member(&self, name: &str) -> Option<Value> {
        self.base.get(name)
    }

    fn set_member(&mut self, name: &str, value: Value) -> Result<()> {
        // Transfers are the only caller; record them for assertions.
        self.log.push(format!(
            "{}:set:{name}={}",
            self.base.name,
            value.as_str().unwrap_or("<non-str>")
        ));
        self.base.set(name, value);
        Ok(())
    }

    fn clear_member(&mut self, name: &str) {
        self.base.clear(name)
    }

    fn read_inputs(&mut self) -> Result<()> {
        self.record("read");
        self.maybe_fail(Hook::Read)
    }

    fn run(&mut self) -> Result<()> {
        self.record("run");
        self.maybe_fail(Hook::Run)?;
        for (member, value) in &self.produce {
            self.base.set(member, value.clone());
        }
        Ok(())
    }

    fn write_outputs(&mut self) -> Result<()> {
        self.record("write");
        self.maybe_fail(Hook::Write)
    }

    fn teardown(&mut self) {
        self.record("teardown");
    }
}

/// An output member named `Image` of type `image`, addressable as `-oimage`.
pub fn image_output() -> MemberEntry {
    MemberEntry::output("Image", "oimage", "image")
}

/// An input member named `Image` of type `image`, addressable as `-image`.
pub fn image_input() -> MemberEntry {
    MemberEntry::input("Image", "image", "image")
}

pub fn toks(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}
