use crate::io::HeterogenEntry;
use crate::io::error::Error;
use crate::model::atom::Atom;
use crate::model::heterogen::Heterogen;
use crate::model::types::Point;
use log::debug;
use std::collections::HashMap;
use std::io::BufRead;
use std::str::FromStr;

const FORMAT: &str = "PDB";
const CONECT_FIELD_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResKey {
    chain_id: char,
    res_seq: i32,
    res_name: String,
}

/// Reads every HETATM residue of a PDB stream as a heterogen.
///
/// Atoms keep their file serial as positional index so that CONECT records can be replayed
/// through [`Heterogen::connect`] once all atoms are known. Residues appear in the order of
/// their first HETATM record; ATOM records and every other record type are ignored.
pub fn read<R: BufRead>(reader: R) -> Result<Vec<HeterogenEntry>, Error> {
    let mut entries: Vec<HeterogenEntry> = Vec::new();
    let mut entry_index: HashMap<ResKey, usize> = HashMap::new();
    let mut pending_links: Vec<(usize, usize)> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_num = i + 1;
        let line = line?;

        if line.starts_with("HETATM") {
            parse_hetatm_record(&line, line_num, &mut entries, &mut entry_index)?;
        } else if line.starts_with("CONECT") {
            let serials = parse_conect_record(&line, line_num)?;
            let base = serials[0];
            pending_links.extend(serials[1..].iter().map(|&target| (base, target)));
        }
    }

    apply_links(&mut entries, &pending_links);

    Ok(entries)
}

fn parse_hetatm_record(
    line: &str,
    line_num: usize,
    entries: &mut Vec<HeterogenEntry>,
    entry_index: &mut HashMap<ResKey, usize>,
) -> Result<(), Error> {
    if line.len() < 54 {
        return Err(Error::parse(FORMAT, line_num, "HETATM record too short"));
    }

    let serial: usize = parse_field(line, 6, 11, line_num, "atom serial")?;
    let atom_name = field(line, 12, 16).trim();
    if atom_name.is_empty() {
        return Err(Error::parse(FORMAT, line_num, "missing atom name"));
    }
    let res_name = field(line, 17, 20).trim().to_string();
    let chain_id = field(line, 21, 22).chars().next().unwrap_or(' ');
    let res_seq: i32 = parse_field(line, 22, 26, line_num, "residue sequence number")?;

    let x: f64 = parse_field(line, 30, 38, line_num, "X coordinate")?;
    let y: f64 = parse_field(line, 38, 46, line_num, "Y coordinate")?;
    let z: f64 = parse_field(line, 46, 54, line_num, "Z coordinate")?;

    let occupancy = parse_optional_field(line, 54, 60, line_num, "occupancy")?.unwrap_or(1.0);
    let temperature_factor =
        parse_optional_field(line, 60, 66, line_num, "temperature factor")?.unwrap_or(0.0);

    let element = resolve_element(line, atom_name);

    let atom = Atom::new(serial, &element, Point::new(x, y, z))
        .with_occupancy(occupancy)
        .with_temperature_factor(temperature_factor);

    let key = ResKey {
        chain_id,
        res_seq,
        res_name,
    };
    let position = *entry_index.entry(key.clone()).or_insert_with(|| {
        let mut heterogen = Heterogen::new(&key.res_name);
        heterogen.set_chain(key.chain_id);
        entries.push(HeterogenEntry::new(key.res_seq, heterogen));
        entries.len() - 1
    });
    let heterogen = &mut entries[position].heterogen;

    match heterogen.atom_mut(atom_name) {
        Some(existing) => {
            if atom.occupancy > existing.occupancy {
                *existing = atom;
            }
        }
        None => heterogen.add_atom(atom_name, atom),
    }

    Ok(())
}

/// Parses the serial list of a CONECT record.
///
/// Whitespace-separated tokens are read as serials. Fixed five-column fields are only used
/// when a token is wider than one field, which happens when adjacent serials run together.
fn parse_conect_record(line: &str, line_num: usize) -> Result<Vec<usize>, Error> {
    let body = line.get(6..).unwrap_or("");
    let tokens: Vec<&str> = body.split_whitespace().collect();

    let serials = if tokens.iter().any(|token| token.len() > CONECT_FIELD_WIDTH) {
        parse_fixed_serials(body).ok_or_else(|| {
            Error::parse(FORMAT, line_num, "malformed fixed-column CONECT serials")
        })?
    } else {
        tokens
            .iter()
            .map(|token| {
                token.parse::<usize>().map_err(|_| {
                    Error::parse(
                        FORMAT,
                        line_num,
                        format!("invalid CONECT serial '{}'", token),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    if serials.is_empty() {
        return Err(Error::parse(FORMAT, line_num, "CONECT record without serials"));
    }

    Ok(serials)
}

fn parse_fixed_serials(body: &str) -> Option<Vec<usize>> {
    let mut serials = Vec::new();
    let mut start = 0;
    while start < body.len() {
        let end = (start + CONECT_FIELD_WIDTH).min(body.len());
        let slot = body.get(start..end)?.trim();
        if !slot.is_empty() {
            serials.push(slot.parse::<usize>().ok()?);
        }
        start = end;
    }
    Some(serials)
}

fn apply_links(entries: &mut [HeterogenEntry], links: &[(usize, usize)]) {
    let mut owner: HashMap<usize, usize> = HashMap::new();
    for (position, entry) in entries.iter().enumerate() {
        for (_, atom) in entry.heterogen.iter_atoms() {
            owner.insert(atom.index, position);
        }
    }

    for &(a, b) in links {
        match (owner.get(&a), owner.get(&b)) {
            (Some(&pa), Some(&pb)) if pa == pb => {
                entries[pa].heterogen.connect(a, b);
            }
            (Some(_), Some(_)) => {
                debug!("CONECT {}-{} spans two heterogens; skipped", a, b);
            }
            _ => debug!(
                "CONECT {}-{} names an atom outside any heterogen; skipped",
                a, b
            ),
        }
    }
}

fn resolve_element(line: &str, atom_name: &str) -> String {
    let symbol = field(line, 76, 78).trim();
    if !symbol.is_empty() {
        return symbol.to_string();
    }
    let legacy = field(line, 72, 76).trim();
    if !legacy.is_empty() {
        return legacy.to_string();
    }
    atom_name
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

fn field(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("")
}

fn parse_field<T: FromStr>(
    line: &str,
    start: usize,
    end: usize,
    line_num: usize,
    what: &str,
) -> Result<T, Error> {
    let raw = field(line, start, end).trim();
    raw.parse::<T>()
        .map_err(|_| Error::parse(FORMAT, line_num, format!("invalid {} '{}'", what, raw)))
}

fn parse_optional_field<T: FromStr>(
    line: &str,
    start: usize,
    end: usize,
    line_num: usize,
    what: &str,
) -> Result<Option<T>, Error> {
    if field(line, start, end).trim().is_empty() {
        return Ok(None);
    }
    parse_field(line, start, end, line_num, what).map(Some)
}
