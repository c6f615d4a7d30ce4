use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::IoParameters;
use commands::{info, renumber};

#[derive(Parser, Debug)]
#[command(
    name = "hetforge",
    about = "A command-line tool for inspecting PDB heterogens and rewriting them with renumbered HETATM/CONECT records.",
    version,
    author,
    arg_required_else_help = true
)]
struct Cli {
    /// Input PDB file path. When omitted, stdin is used.
    #[arg(short, long, value_name = "FILE", global = true)]
    input: Option<PathBuf>,
    /// Output PDB file path. When omitted, stdout is used.
    #[arg(short, long, value_name = "FILE", global = true)]
    output: Option<PathBuf>,
    /// Log debug diagnostics to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the heterogens found in the input.
    Info(info::InfoArgs),
    /// Write heterogens with fresh serial numbers and CONECT records.
    Renumber(renumber::RenumberArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let io_params = IoParameters {
        input: cli.input.clone(),
        output: cli.output.clone(),
    };

    match cli.command {
        Command::Info(args) => {
            let entries = commands::load_input(&io_params)?;
            info::run(&entries, &args)?;
        }
        Command::Renumber(args) => {
            commands::ensure_noninteractive_stdout("renumber", &io_params)?;
            let mut entries = commands::load_input(&io_params)?;
            renumber::run(&mut entries, &args)?;
            commands::save_output(&mut entries, args.start_serial, &io_params)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
