use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use commands::GlobalArgs;

mod commands;
mod output;

use commands::{run, version};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "xrun")]
#[command(version = VERSION)]
#[command(about = "Run a command template once per record of a CSV, JSON or JSON Lines file")]
#[command(
    arg_required_else_help = true,
    subcommand_negates_reqs = true,
    args_conflicts_with_subcommands = true,
    after_help = "Template syntax: use {{.field_name}} to substitute values from data fields.\n\
                  File formats: .json (array of objects), .jsonl (one object per line), anything else is read as CSV with headers.\n\
                  Log files: output is saved to xrun-<data-file-name>-<timestamp>.logs unless --dry-run or --no-log-files is given."
)]
#[command(group(ArgGroup::new("template").required(true)))]
struct Cli {
    #[command(flatten)]
    run: run::RunArgs,

    /// Config file selecting the shell that runs each command
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information
    Version(version::VersionArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    xrun::telemetry::init_tracing();

    let global = GlobalArgs { config: cli.config };

    let exit_code = match cli.command {
        Some(Commands::Version(args)) => output::map_cmd_result(version::run(args, &global)),
        None => output::map_cmd_result(run::run(cli.run, &global)),
    };

    std::process::ExitCode::from(output::exit_code_to_u8(exit_code))
}
