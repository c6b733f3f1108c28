//! clap front-end for the standalone binary.
//!
//! The binary's own interface is deliberately thin: a few pipeline-global
//! flags, then the raw token stream handed to the engine untouched. Embedded
//! callers that route a full launcher command line instead go through
//! [`crate::launcher::extract_control_flags`].

use crate::pipeline::PipelineOptions;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "stagepipe")]
#[command(about = "Compose processing stages into one pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Disable automatic input wiring
    #[arg(long = "no-auto")]
    pub no_auto: bool,

    /// Suppress informational output
    #[arg(long)]
    pub quiet: bool,

    /// Print the resolved wiring plan as JSON after the run
    #[arg(long = "dump-plan")]
    pub dump_plan: bool,

    /// List registered stages and exit
    #[arg(long = "list")]
    pub list: bool,

    /// Pipeline tokens: stage [-option value ...] [--pipe stage ...]
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}

impl Cli {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            auto_pipe: !self.no_auto,
            quiet: self.quiet,
        }
    }
}
