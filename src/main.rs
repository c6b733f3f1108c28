use clap::Parser;
use stagepipe::cli::Cli;
use stagepipe::errors::Result;
use stagepipe::pipeline::Pipeline;
use stagepipe::registry::{self, StageRegistry};
use std::io::{BufRead, Write};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);
    if let Err(err) = run(cli) {
        eprintln!("stagepipe: {} error: {err}", err.category());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let registry = registry::builtin();

    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }
    if cli.tokens.is_empty() {
        println!("{}", stagepipe::launcher::usage());
        return Ok(());
    }

    let quiet = cli.quiet;
    let pipeline = Pipeline::new(registry, cli.pipeline_options())
        .with_confirm(move || quiet || confirm_placeholder());
    let outcome = pipeline.execute(&cli.tokens)?;

    if cli.dump_plan {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.plan)
                .expect("wiring plan is always serializable")
        );
    }
    Ok(())
}

/// Ask the operator whether to continue a run that contains the interactive
/// placeholder. Quiet runs skip the question and just substitute.
fn confirm_placeholder() -> bool {
    eprint!("interactive placeholder found; continue and prompt for values? [y/N] ");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
