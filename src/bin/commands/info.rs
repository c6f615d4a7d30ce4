use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use het_forge::io::HeterogenEntry;

use crate::commands::run_with_spinner;

/// Report-only command listing the heterogens of a PDB file.
#[derive(Debug, Default, Args)]
pub struct InfoArgs {
    /// Also list every bond by atom name.
    #[arg(long)]
    pub bonds: bool,
}

/// Prints per-heterogen statistics to stderr.
pub fn run(entries: &[HeterogenEntry], args: &InfoArgs) -> Result<()> {
    let reports = run_with_spinner("Analyzing heterogens", || Ok(collect_reports(entries)))?;

    print_tables(&reports, entries, args.bonds)
}

fn collect_reports(entries: &[HeterogenEntry]) -> Vec<HeterogenReport> {
    entries
        .iter()
        .map(|entry| {
            let het = &entry.heterogen;
            HeterogenReport {
                chain: het.chain(),
                residue_id: entry.residue_id,
                name: het.type_name().to_string(),
                atoms: het.atom_count(),
                bonds: het.bond_count(),
                centroid: het
                    .centroid()
                    .map(|c| format!("{:.3}, {:.3}, {:.3}", c.x, c.y, c.z))
                    .unwrap_or_else(|| "-".to_string()),
            }
        })
        .collect()
}

fn print_tables(reports: &[HeterogenReport], entries: &[HeterogenEntry], bonds: bool) -> Result<()> {
    let mut stderr = io::stderr().lock();

    print_boxed_label(&mut stderr, "HetForge Heterogen Report")?;
    writeln!(&mut stderr)?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Chain", "Residue", "Name", "Atoms", "Bonds", "Centroid (Å)"]);
    for report in reports {
        table.add_row(row![
            report.chain,
            report.residue_id,
            report.name,
            report.atoms,
            report.bonds,
            report.centroid
        ]);
    }
    table
        .print(&mut stderr)
        .context("Failed to render heterogen summary")?;

    if bonds {
        writeln!(&mut stderr)?;
        print_boxed_label(&mut stderr, "Bonds")?;

        let mut bond_table = Table::new();
        bond_table.set_format(*format::consts::FORMAT_BOX_CHARS);
        bond_table.set_titles(row!["Residue", "Atom 1", "Atom 2", "Length (Å)"]);
        for entry in entries {
            let het = &entry.heterogen;
            for bond in het.bonds() {
                let length = match (bond.first().resolve(het), bond.second().resolve(het)) {
                    (Some(a), Some(b)) => format!("{:.3}", a.distance(b)),
                    _ => "-".to_string(),
                };
                bond_table.add_row(row![
                    format!("{} {}{}", het.type_name(), het.chain(), entry.residue_id),
                    bond.first().key(),
                    bond.second().key(),
                    length
                ]);
            }
        }
        bond_table
            .print(&mut stderr)
            .context("Failed to render bond table")?;
    }

    let total_atoms: usize = reports.iter().map(|r| r.atoms).sum();
    let total_bonds: usize = reports.iter().map(|r| r.bonds).sum();
    writeln!(
        &mut stderr,
        "{} heterogens, {} atoms, {} bonds",
        reports.len(),
        total_atoms,
        total_bonds
    )?;

    Ok(())
}

fn print_boxed_label<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    let inner = format!(" {title} ");
    let width = inner.chars().count();
    writeln!(writer, "╭{}╮", "─".repeat(width))?;
    writeln!(writer, "│{}│", inner)?;
    writeln!(writer, "╰{}╯", "─".repeat(width))?;
    Ok(())
}

#[derive(Debug)]
struct HeterogenReport {
    chain: char,
    residue_id: i32,
    name: String,
    atoms: usize,
    bonds: usize,
    centroid: String,
}
