//! Built-in text processing stages.
//!
//! A deliberately small family that exercises every part of the stage
//! contract: `textreader` acquires data in the external-read hook,
//! `linefilter` transforms it in `run`, `textwriter` emits it in the
//! external-write hook, and `printer` is a terminal sink. Text flows between
//! them as a `str` member named `Text`, so a plain
//! `textreader -ifile in.txt --pipe linefilter -patterns x --pipe printer`
//! wires itself.

use crate::errors::{PipelineError, Result};
use crate::member::{MemberEntry, MemberLength};
use crate::stage::Stage;
use crate::stages::base::StageBase;
use crate::value::Value;
use std::fs;

macro_rules! delegate_base {
    () => {
        fn input_members(&self) -> Vec<MemberEntry> {
            self.base.inputs.clone()
        }
        fn output_members(&self) -> Vec<MemberEntry> {
            self.base.outputs.clone()
        }
        fn parse_arguments(&mut self, args: &[String]) -> Result<()> {
            self.base.parse_arguments(args)
        }
        fn disabled(&self) -> bool {
            self.base.disabled
        }
        fn get_member(&self, name: &str) -> Option<Value> {
            self.base.get(name)
        }
        fn set_member(&mut self, name: &str, value: Value) -> Result<()> {
            self.base.set(name, value);
            Ok(())
        }
        fn clear_member(&mut self, name: &str) {
            self.base.clear(name)
        }
    };
}

/// Reads a text file into the pipeline.
pub struct TextReader {
    base: StageBase,
}

impl TextReader {
    pub fn new() -> Self {
        Self {
            base: StageBase::new(
                "textreader",
                vec![MemberEntry::input("Filename", "ifile", "str").no_auto()],
                vec![MemberEntry::output("Text", "otext", "str")],
            ),
        }
    }

    pub fn boxed() -> Box<dyn Stage> {
        Box::new(Self::new())
    }
}

impl Default for TextReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for TextReader {
    delegate_base!();

    fn read_inputs(&mut self) -> Result<()> {
        let filename = self.base.require_str("Filename")?;
        let text = fs::read_to_string(&filename).map_err(|e| {
            PipelineError::stage("textreader", format!("cannot read {filename}: {e}"))
        })?;
        log::info!("textreader: {} bytes from {filename}", text.len());
        self.base.set("Text", Value::Str(text));
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps or drops lines by substring patterns.
pub struct LineFilter {
    base: StageBase,
}

impl LineFilter {
    pub fn new() -> Self {
        Self {
            base: StageBase::new(
                "linefilter",
                vec![
                    MemberEntry::input("Text", "text", "str"),
                    MemberEntry::input("Patterns", "patterns", "str")
                        .with_length(MemberLength::Variable)
                        .no_auto(),
                    MemberEntry::input("Invert", "invert", "bool").no_auto(),
                ],
                vec![MemberEntry::output("Text", "otext", "str")],
            ),
        }
    }

    pub fn boxed() -> Box<dyn Stage> {
        Box::new(Self::new())
    }
}

impl Default for LineFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for LineFilter {
    delegate_base!();

    fn run(&mut self) -> Result<()> {
        let text = self.base.require_str("Text")?;
        let patterns: Vec<String> = match self.base.get("Patterns") {
            Some(Value::List(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        let invert = self
            .base
            .get("Invert")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let kept: Vec<&str> = text
            .lines()
            .filter(|line| {
                let hit = patterns.is_empty() || patterns.iter().any(|p| line.contains(p.as_str()));
                hit != invert
            })
            .collect();
        log::info!("linefilter: kept {} of {} lines", kept.len(), text.lines().count());

        let mut out = kept.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        self.base.set("Text", Value::Str(out));
        Ok(())
    }
}

/// Writes the piped text to a file.
pub struct TextWriter {
    base: StageBase,
}

impl TextWriter {
    pub fn new() -> Self {
        Self {
            base: StageBase::new(
                "textwriter",
                vec![
                    MemberEntry::input("Text", "text", "str"),
                    MemberEntry::input("Filename", "ofile", "str").no_auto(),
                ],
                vec![],
            ),
        }
    }

    pub fn boxed() -> Box<dyn Stage> {
        Box::new(Self::new())
    }
}

impl Default for TextWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for TextWriter {
    delegate_base!();

    fn run(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_outputs(&mut self) -> Result<()> {
        let filename = self.base.require_str("Filename")?;
        let text = self.base.require_str("Text")?;
        fs::write(&filename, &text).map_err(|e| {
            PipelineError::stage("textwriter", format!("cannot write {filename}: {e}"))
        })?;
        log::info!("textwriter: {} bytes to {filename}", text.len());
        Ok(())
    }
}

/// Prints the piped text to stdout.
pub struct Printer {
    base: StageBase,
}

impl Printer {
    pub fn new() -> Self {
        Self {
            base: StageBase::new(
                "printer",
                vec![
                    MemberEntry::input("Text", "text", "str"),
                    MemberEntry::input("Prefix", "prefix", "str").no_auto(),
                ],
                vec![],
            ),
        }
    }

    pub fn boxed() -> Box<dyn Stage> {
        Box::new(Self::new())
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Printer {
    delegate_base!();

    fn run(&mut self) -> Result<()> {
        let text = self.base.require_str("Text")?;
        let prefix = self
            .base
            .get("Prefix")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        for line in text.lines() {
            println!("{prefix}{line}");
        }
        Ok(())
    }
}
