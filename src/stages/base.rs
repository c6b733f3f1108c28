//! Shared plumbing for the built-in stages.
//!
//! [`StageBase`] owns the member schema and the name-indexed field store,
//! and implements the collaborator side of the option grammar so concrete
//! stages only declare members and implement their hooks:
//!
//! - `-option value ...` assigns a literal, converted per the member's type
//!   tag and arity; the member is marked pushed, which also makes it a
//!   producer for downstream auto-wiring;
//! - `-option @target.opt` captures an explicit pipe reference (sigil
//!   stripped) for the wiring phase;
//! - `-option None` captures the cancellation literal;
//! - a value of `PROMPT` asks the operator for the real value on the spot;
//! - `-off` disables the whole stage;
//! - a `bool` scalar given with no value tokens acts as a flag.

use crate::errors::{PipelineError, Result};
use crate::member::{MemberEntry, MemberLength, CANCEL_PIPE};
use crate::tokens::PROMPT_MARKER;
use crate::value::Value;
use std::collections::HashMap;
use std::io::{BufRead, Write};

/// Member schema plus field storage for a built-in stage.
pub struct StageBase {
    pub name: &'static str,
    pub inputs: Vec<MemberEntry>,
    pub outputs: Vec<MemberEntry>,
    pub disabled: bool,
    fields: HashMap<String, Value>,
}

impl StageBase {
    pub fn new(name: &'static str, inputs: Vec<MemberEntry>, outputs: Vec<MemberEntry>) -> Self {
        Self {
            name,
            inputs,
            outputs,
            disabled: false,
            fields: HashMap::new(),
        }
    }

    pub fn get(&self, member_name: &str) -> Option<Value> {
        self.fields.get(member_name).cloned()
    }

    pub fn set(&mut self, member_name: &str, value: Value) {
        self.fields.insert(member_name.to_string(), value);
    }

    pub fn clear(&mut self, member_name: &str) {
        self.fields.remove(member_name);
    }

    /// Fetch a string field, or fail with a stage error naming the member.
    pub fn require_str(&self, member_name: &str) -> Result<String> {
        self.fields
            .get(member_name)
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| PipelineError::stage(self.name, format!("no {member_name} set")))
    }

    fn fail(&self, message: impl Into<String>) -> PipelineError {
        PipelineError::stage(self.name, message)
    }

    /// Parse the stage's own argument tokens against the declared inputs.
    pub fn parse_arguments(&mut self, args: &[String]) -> Result<()> {
        let mut i = 0;
        while i < args.len() {
            let token = &args[i];
            let option = token
                .strip_prefix('-')
                .filter(|_| is_option_token(token))
                .ok_or_else(|| self.fail(format!("expected an option, got '{token}'")))?;
            i += 1;

            if option == "off" {
                self.disabled = true;
                continue;
            }

            let start = i;
            while i < args.len() && !is_option_token(&args[i]) {
                i += 1;
            }
            self.apply_option(option, &args[start..i])?;
        }
        Ok(())
    }

    fn apply_option(&mut self, option: &str, values: &[String]) -> Result<()> {
        let index = self
            .inputs
            .iter()
            .position(|m| !m.option_name.is_empty() && m.option_name == option)
            .ok_or_else(|| self.fail(format!("unknown option -{option}")))?;

        // Wiring directives take exactly one token and bypass conversion.
        if let [single] = values {
            if let Some(reference) = single.strip_prefix('@') {
                self.inputs[index].explicit_pipe = Some(reference.to_string());
                return Ok(());
            }
            if single == CANCEL_PIPE {
                self.inputs[index].explicit_pipe = Some(CANCEL_PIPE.to_string());
                return Ok(());
            }
        }

        let prompted;
        let values = if values.len() == 1 && values[0] == PROMPT_MARKER {
            prompted = vec![self.prompt_value(option)?];
            &prompted[..]
        } else {
            values
        };

        let entry = &self.inputs[index];
        let value = convert(entry, values).map_err(|msg| self.fail(msg))?;
        let member_name = entry.member_name.clone();
        self.inputs[index].has_value = true;
        self.inputs[index].pushed = true;
        self.fields.insert(member_name, value);
        Ok(())
    }

    /// Ask the operator for a value at parse time (the `PROMPT` marker).
    fn prompt_value(&self, option: &str) -> Result<String> {
        eprint!("{}: value for -{option}: ", self.name);
        std::io::stderr().flush().ok();
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| self.fail(format!("cannot read value for -{option}: {e}")))?;
        let line = line.trim();
        if line.is_empty() {
            return Err(self.fail(format!("no value given for -{option}")));
        }
        Ok(line.to_string())
    }
}

/// Option tokens start with a dash but are not negative numbers.
fn is_option_token(token: &str) -> bool {
    token.starts_with('-') && token.len() > 1 && token.parse::<f64>().is_err()
}

fn convert(entry: &MemberEntry, values: &[String]) -> std::result::Result<Value, String> {
    match entry.length {
        MemberLength::Scalar => {
            if entry.member_type == "bool" && values.is_empty() {
                return Ok(Value::Bool(true));
            }
            match values {
                [single] => convert_scalar(&entry.member_type, single),
                _ => Err(format!(
                    "-{} takes exactly one value, got {}",
                    entry.option_name,
                    values.len()
                )),
            }
        }
        MemberLength::Fixed(arity) => {
            if values.len() != arity {
                return Err(format!(
                    "-{} takes exactly {arity} values, got {}",
                    entry.option_name,
                    values.len()
                ));
            }
            collect_list(entry, values)
        }
        MemberLength::Variable => {
            if values.is_empty() {
                return Err(format!("-{} takes at least one value", entry.option_name));
            }
            collect_list(entry, values)
        }
    }
}

fn collect_list(entry: &MemberEntry, values: &[String]) -> std::result::Result<Value, String> {
    let items = values
        .iter()
        .map(|v| convert_scalar(&entry.member_type, v))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Value::List(items))
}

fn convert_scalar(member_type: &str, raw: &str) -> std::result::Result<Value, String> {
    match member_type {
        "int" => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| format!("'{raw}' is not an integer")),
        "float" => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format!("'{raw}' is not a number")),
        "bool" => match raw {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            _ => Err(format!("'{raw}' is not a boolean")),
        },
        _ => Ok(Value::Str(raw.to_string())),
    }
}
