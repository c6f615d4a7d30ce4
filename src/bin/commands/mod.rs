use std::collections::HashSet;
use std::fs::File;
use std::io::{self as stdio, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;

use het_forge::io::{HeterogenEntry, read_pdb_heterogens, write_pdb_heterogens};

pub mod info;
pub mod renumber;

/// IO parameters shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct IoParameters {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Reads every heterogen from the configured input source.
pub fn load_input(params: &IoParameters) -> Result<Vec<HeterogenEntry>> {
    if let Some(path) = &params.input {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;
        read_pdb_heterogens(BufReader::new(file))
            .with_context(|| format!("Failed to parse PDB input from {}", path.display()))
    } else {
        let stdin = stdio::stdin();
        if stdin.is_terminal() {
            bail!(
                "No --input provided and stdin is a TTY. Provide -i/--input or pipe a PDB file into hetforge."
            );
        }
        read_pdb_heterogens(BufReader::new(stdin.lock()))
            .context("Failed to parse PDB input from stdin")
    }
}

/// Writes heterogens to the configured output, numbering atoms from `start_serial`.
pub fn save_output(
    entries: &mut [HeterogenEntry],
    start_serial: usize,
    params: &IoParameters,
) -> Result<usize> {
    match params.output.as_deref() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let next = write_entries(&mut writer, entries, start_serial, Some(path))?;
            writer.flush().context("Failed to flush output writer")?;
            Ok(next)
        }
        None => {
            let stdout = stdio::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            let next = write_entries(&mut writer, entries, start_serial, None)?;
            writer.flush().context("Failed to flush stdout")?;
            Ok(next)
        }
    }
}

fn write_entries<W: Write>(
    writer: &mut W,
    entries: &mut [HeterogenEntry],
    start_serial: usize,
    path: Option<&Path>,
) -> Result<usize> {
    write_pdb_heterogens(writer, entries, start_serial).with_context(|| match path {
        Some(path) => format!("Failed to write PDB output to {}", path.display()),
        None => "Failed to write PDB output to stdout".to_string(),
    })
}

/// Wraps long-running operations with a spinner rendered to stderr.
pub fn run_with_spinner<T, F>(message: &str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let result = work();

    match &result {
        Ok(_) => spinner.finish_with_message(format!("{} ✓", message)),
        Err(_) => spinner.abandon_with_message(format!("{} ✗", message)),
    }

    result
}

/// Normalizes residue name lists to uppercase hash sets.
pub fn build_name_set(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_ascii_uppercase())
        .collect()
}

/// Returns true when stdout is a TTY and no explicit output file was supplied.
pub fn interactive_stdout_requested(params: &IoParameters) -> bool {
    params.output.is_none() && stdio::stdout().is_terminal()
}

/// Ensures commands do not dump PDB records directly into an interactive terminal.
pub fn ensure_noninteractive_stdout(command: &str, params: &IoParameters) -> Result<()> {
    if interactive_stdout_requested(params) {
        bail!(
            "Refusing to stream {command} results to an interactive terminal. Use -o/--output or pipe the command into a file."
        );
    }
    Ok(())
}
