use crate::io::HeterogenEntry;
use crate::io::error::Error;
use crate::model::heterogen::{BondEndpoint, Heterogen};
use log::trace;
use std::collections::BTreeMap;
use std::io::Write;

const FORMAT: &str = "PDB";

const SERIAL_WIDTH: usize = 5;
const ATOM_NAME_WIDTH: usize = 4;
const RESIDUE_NAME_WIDTH: usize = 3;
const RESIDUE_NUMBER_WIDTH: usize = 4;
const ELEMENT_WIDTH: usize = 4;
const COORDINATE_WIDTH: usize = 8;
const COORDINATE_PRECISION: usize = 3;
const FACTOR_WIDTH: usize = 6;
const FACTOR_PRECISION: usize = 2;

/// Writes one heterogen as HETATM records followed by its CONECT records.
///
/// Every atom's index is overwritten with its output serial. Field widths are checked before
/// anything is written or renumbered.
///
/// # Returns
///
/// `start_serial` plus the number of atoms written.
pub fn write_heterogen<W: Write>(
    writer: W,
    heterogen: &mut Heterogen,
    residue_name: &str,
    residue_number: i32,
    start_serial: usize,
) -> Result<usize, Error> {
    validate_fields(heterogen, residue_name, residue_number, start_serial)?;

    let mut ctx = WriterContext::new(writer, start_serial);

    ctx.write_hetatms(heterogen, residue_name, residue_number)?;

    ctx.write_connects(heterogen)?;

    trace!(
        "Wrote heterogen '{}' as serials {}..{}",
        heterogen.type_name(),
        start_serial,
        ctx.current_serial
    );

    Ok(ctx.current_serial)
}

/// Writes several heterogens into one serial space, each under its own type name and
/// residue id, and terminates the file with `END`.
///
/// # Returns
///
/// The first serial not used by any written atom.
pub fn write_heterogens<W: Write>(
    mut writer: W,
    entries: &mut [HeterogenEntry],
    start_serial: usize,
) -> Result<usize, Error> {
    let mut next_serial = start_serial;

    for entry in entries.iter_mut() {
        let residue_name = entry.heterogen.type_name().to_string();
        next_serial = write_heterogen(
            &mut writer,
            &mut entry.heterogen,
            &residue_name,
            entry.residue_id,
            next_serial,
        )?;
    }

    writeln!(writer, "END")?;

    Ok(next_serial)
}

fn validate_fields(
    heterogen: &Heterogen,
    residue_name: &str,
    residue_number: i32,
    start_serial: usize,
) -> Result<(), Error> {
    if residue_name.chars().count() > RESIDUE_NAME_WIDTH {
        return Err(Error::field_too_wide(
            "residue name",
            residue_name,
            RESIDUE_NAME_WIDTH,
        ));
    }

    if residue_number.to_string().len() > RESIDUE_NUMBER_WIDTH {
        return Err(Error::field_too_wide(
            "residue number",
            residue_number,
            RESIDUE_NUMBER_WIDTH,
        ));
    }

    if !heterogen.is_empty() {
        let last_serial = start_serial
            .checked_add(heterogen.atom_count() - 1)
            .ok_or_else(|| Error::field_too_wide("serial", start_serial, SERIAL_WIDTH))?;
        if last_serial.to_string().len() > SERIAL_WIDTH {
            return Err(Error::field_too_wide("serial", last_serial, SERIAL_WIDTH));
        }
    }

    for (key, atom) in heterogen.iter_atoms() {
        if key.chars().count() > ATOM_NAME_WIDTH {
            return Err(Error::field_too_wide("atom name", key, ATOM_NAME_WIDTH));
        }
        if atom.element.chars().count() > ELEMENT_WIDTH {
            return Err(Error::field_too_wide(
                "element",
                &atom.element,
                ELEMENT_WIDTH,
            ));
        }

        check_real("x coordinate", atom.pos.x, COORDINATE_WIDTH, COORDINATE_PRECISION)?;
        check_real("y coordinate", atom.pos.y, COORDINATE_WIDTH, COORDINATE_PRECISION)?;
        check_real("z coordinate", atom.pos.z, COORDINATE_WIDTH, COORDINATE_PRECISION)?;
        check_real("occupancy", atom.occupancy, FACTOR_WIDTH, FACTOR_PRECISION)?;
        check_real(
            "temperature factor",
            atom.temperature_factor,
            FACTOR_WIDTH,
            FACTOR_PRECISION,
        )?;
    }

    Ok(())
}

/// Rejects a real value whose fixed-precision rendering would not fit its column.
fn check_real(
    field: &'static str,
    value: f64,
    width: usize,
    precision: usize,
) -> Result<(), Error> {
    let rendered = format!("{:.*}", precision, value);
    if !value.is_finite() || rendered.len() > width {
        return Err(Error::field_too_wide(field, rendered, width));
    }
    Ok(())
}

struct WriterContext<W> {
    writer: W,
    current_serial: usize,
}

impl<W: Write> WriterContext<W> {
    fn new(writer: W, start_serial: usize) -> Self {
        Self {
            writer,
            current_serial: start_serial,
        }
    }

    fn write_hetatms(
        &mut self,
        heterogen: &mut Heterogen,
        residue_name: &str,
        residue_number: i32,
    ) -> Result<(), Error> {
        for (key, atom) in heterogen.iter_atoms_mut() {
            let serial = self.current_serial;
            atom.index = serial;

            writeln!(
                self.writer,
                "HETATM{:>5} {:>4} {:>3}  {:>4}    {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}      {:>4}{:2}",
                serial,
                key.as_str(),
                residue_name,
                residue_number,
                atom.pos.x,
                atom.pos.y,
                atom.pos.z,
                atom.occupancy,
                atom.temperature_factor,
                atom.element.as_str(),
                ""
            )?;

            self.current_serial += 1;
        }
        Ok(())
    }

    fn write_connects(&mut self, heterogen: &Heterogen) -> Result<(), Error> {
        let mut adjacency: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

        for bond in heterogen.bonds() {
            let s1 = serial_of(heterogen, bond.first())?;
            let s2 = serial_of(heterogen, bond.second())?;

            adjacency.entry(s1).or_default().push(s2);
            adjacency.entry(s2).or_default().push(s1);
        }

        for (src_serial, targets) in &adjacency {
            write!(self.writer, "CONECT {}", src_serial)?;
            for target in targets {
                write!(self.writer, " {}", target)?;
            }
            writeln!(self.writer)?;
        }

        Ok(())
    }
}

fn serial_of(heterogen: &Heterogen, endpoint: &BondEndpoint) -> Result<usize, Error> {
    endpoint.resolve(heterogen).map(|atom| atom.index).ok_or_else(|| {
        Error::inconsistent_data(
            FORMAT,
            format!(
                "bond in heterogen '{}' references atom '{}' that was not written",
                heterogen.type_name(),
                endpoint.key()
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::types::Point;

    fn heme_pair() -> Heterogen {
        let mut het = Heterogen::new("HEM");
        het.add_atom("FE", Atom::new(10, "FE", Point::new(1.0, -2.5, 0.0)));
        het.add_atom(
            "N1",
            Atom::new(11, "N", Point::new(12.3456, -0.25, 100.0))
                .with_occupancy(0.5)
                .with_temperature_factor(23.45),
        );
        het
    }

    fn water(index: usize) -> Heterogen {
        let mut het = Heterogen::new("HOH");
        het.add_atom("O", Atom::new(index, "O", Point::new(0.0, 0.0, 0.0)));
        het.add_atom("H1", Atom::new(index + 1, "H", Point::new(0.957, 0.0, 0.0)));
        het.add_atom("H2", Atom::new(index + 2, "H", Point::new(-0.24, 0.927, 0.0)));
        het.connect(index, index + 1);
        het.connect(index, index + 2);
        het
    }

    fn write_to_string(het: &mut Heterogen, name: &str, num: i32, start: usize) -> (usize, String) {
        let mut buffer = Vec::new();
        let next = write_heterogen(&mut buffer, het, name, num, start).expect("write succeeds");
        (next, String::from_utf8(buffer).expect("valid UTF-8"))
    }

    fn assert_hetatm_line(
        line: &str,
        serial: usize,
        atom_name: &str,
        res_name: &str,
        res_seq: i32,
        coords: (f64, f64, f64),
        element: &str,
    ) {
        assert_eq!(line.len(), 78, "unexpected width: {line:?}");
        assert_eq!(&line[0..6], "HETATM");
        assert_eq!(line[6..11].trim(), serial.to_string());
        assert_eq!(line[12..16].trim(), atom_name);
        assert_eq!(line[17..20].trim(), res_name);
        assert_eq!(&line[20..22], "  ");
        assert_eq!(line[22..26].trim(), res_seq.to_string());
        assert!((parse_float(&line[30..38]) - coords.0).abs() < 1e-3);
        assert!((parse_float(&line[38..46]) - coords.1).abs() < 1e-3);
        assert!((parse_float(&line[46..54]) - coords.2).abs() < 1e-3);
        assert_eq!(line[72..76].trim(), element);
        assert_eq!(&line[76..78], "  ");
    }

    fn conect_map(output: &str) -> BTreeMap<usize, Vec<usize>> {
        output
            .lines()
            .filter(|line| line.starts_with("CONECT"))
            .map(|line| {
                let mut tokens = line[6..]
                    .split_whitespace()
                    .map(|tok| tok.parse::<usize>().expect("numeric serial"));
                let base = tokens.next().expect("base serial");
                (base, tokens.collect())
            })
            .collect()
    }

    fn parse_float(slice: &str) -> f64 {
        slice.trim().parse::<f64>().expect("valid float")
    }

    #[test]
    fn write_emits_hetatm_and_conect_records_for_heme_pair() {
        let mut het = heme_pair();
        assert!(het.connect(10, 11));

        let (next, output) = write_to_string(&mut het, "HEM", 1, 501);

        assert_eq!(next, 503);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4, "unexpected lines: {lines:?}");
        assert_eq!(
            lines[0],
            "HETATM  501   FE HEM     1       1.000  -2.500   0.000  1.00  0.00        FE  "
        );
        assert_eq!(
            lines[1],
            "HETATM  502   N1 HEM     1      12.346  -0.250 100.000  0.50 23.45         N  "
        );
        assert_eq!(lines[2], "CONECT 501 502");
        assert_eq!(lines[3], "CONECT 502 501");
    }

    #[test]
    fn write_field_layout_matches_fixed_columns() {
        let mut het = Heterogen::new("LIG");
        het.add_atom("CA", Atom::new(1, "C", Point::new(-11.125, 0.0, 3.25)));

        let (_, output) = write_to_string(&mut het, "LIG", 12, 1);
        let line = output.lines().next().unwrap();

        assert_eq!(
            line,
            "HETATM    1   CA LIG    12     -11.125   0.000   3.250  1.00  0.00         C  "
        );
        assert_hetatm_line(line, 1, "CA", "LIG", 12, (-11.125, 0.0, 3.25), "C");
    }

    #[test]
    fn write_right_aligns_short_fields() {
        let mut het = Heterogen::new("K");
        het.add_atom("K", Atom::new(1, "K", Point::new(0.5, 0.5, 0.5)));

        let (_, output) = write_to_string(&mut het, "K", -7, 99);
        let line = output.lines().next().unwrap();

        assert_eq!(&line[6..11], "   99");
        assert_eq!(&line[12..16], "   K");
        assert_eq!(&line[17..20], "  K");
        assert_eq!(&line[22..26], "  -7");
        assert_hetatm_line(line, 99, "K", "K", -7, (0.5, 0.5, 0.5), "K");
    }

    #[test]
    fn write_stamps_output_serials_onto_atoms() {
        let mut het = heme_pair();

        write_to_string(&mut het, "HEM", 1, 40);

        assert_eq!(het.atom("FE").unwrap().index, 40);
        assert_eq!(het.atom("N1").unwrap().index, 41);
    }

    #[test]
    fn repeated_writes_restamp_indices_and_keep_content() {
        let mut het = water(1);

        let (_, first) = write_to_string(&mut het, "HOH", 5, 1);
        let (_, again) = write_to_string(&mut het, "HOH", 5, 1);
        assert_eq!(first, again);

        let (next, shifted) = write_to_string(&mut het, "HOH", 5, 10);
        assert_eq!(next, 13);
        assert_eq!(het.atom("O").unwrap().index, 10);
        assert!(shifted.contains("CONECT 10 11 12"));
    }

    #[test]
    fn conect_lists_neighbors_in_bond_insertion_order() {
        let mut het = Heterogen::new("EDO");
        het.add_atom("C1", Atom::new(1, "C", Point::origin()));
        het.add_atom("O1", Atom::new(2, "O", Point::origin()));
        het.add_atom("C2", Atom::new(3, "C", Point::origin()));
        het.connect(1, 3);
        het.connect(1, 2);

        let (_, output) = write_to_string(&mut het, "EDO", 1, 1);
        let conect: Vec<&str> = output
            .lines()
            .filter(|line| line.starts_with("CONECT"))
            .collect();

        assert_eq!(conect, vec!["CONECT 1 3 2", "CONECT 2 1", "CONECT 3 1"]);
    }

    #[test]
    fn conect_records_are_symmetric() {
        let mut het = water(20);

        let (_, output) = write_to_string(&mut het, "HOH", 1, 7);
        let map = conect_map(&output);

        for bond in het.bonds() {
            let x = het.atom(bond.first().key()).unwrap().index;
            let y = het.atom(bond.second().key()).unwrap().index;
            assert!(map[&x].contains(&y));
            assert!(map[&y].contains(&x));
        }
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn unbonded_heterogen_emits_no_conect() {
        let mut het = heme_pair();

        let (_, output) = write_to_string(&mut het, "HEM", 1, 1);

        assert!(!output.contains("CONECT"));
    }

    #[test]
    fn empty_heterogen_returns_start_serial() {
        let mut het = Heterogen::new("UNL");

        let (next, output) = write_to_string(&mut het, "UNL", 1, 42);

        assert_eq!(next, 42);
        assert!(output.is_empty());
    }

    #[test]
    fn chained_writes_continue_numbering_without_overlap() {
        let mut first = heme_pair();
        first.connect(10, 11);
        let mut second = water(1);
        let mut buffer = Vec::new();

        let next = write_heterogen(&mut buffer, &mut first, "HEM", 1, 1).unwrap();
        let last = write_heterogen(&mut buffer, &mut second, "HOH", 2, next).unwrap();

        assert_eq!(next, 3);
        assert_eq!(last, 6);
        let output = String::from_utf8(buffer).unwrap();
        let serials: Vec<usize> = output
            .lines()
            .filter(|line| line.starts_with("HETATM"))
            .map(|line| line[6..11].trim().parse().unwrap())
            .collect();
        assert_eq!(serials, vec![1, 2, 3, 4, 5]);
        assert!(output.contains("CONECT 3 4 5"));
    }

    #[test]
    fn write_heterogens_uses_entry_names_and_appends_end() {
        let mut entries = vec![
            HeterogenEntry::new(301, heme_pair()),
            HeterogenEntry::new(302, water(1)),
        ];

        let mut buffer = Vec::new();
        let next = write_heterogens(&mut buffer, &mut entries, 100).unwrap();

        assert_eq!(next, 105);
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_hetatm_line(lines[0], 100, "FE", "HEM", 301, (1.0, -2.5, 0.0), "FE");
        assert_hetatm_line(lines[2], 102, "O", "HOH", 302, (0.0, 0.0, 0.0), "O");
        assert_eq!(lines.last().copied(), Some("END"));
    }

    #[test]
    fn overlong_atom_key_is_rejected_without_side_effects() {
        let mut het = heme_pair();
        het.add_atom("C100A", Atom::new(12, "C", Point::origin()));
        let mut buffer = Vec::new();

        let err = write_heterogen(&mut buffer, &mut het, "HEM", 1, 1).unwrap_err();

        match err {
            Error::FieldTooWide { field, value, width } => {
                assert_eq!(field, "atom name");
                assert_eq!(value, "C100A");
                assert_eq!(width, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(buffer.is_empty());
        assert_eq!(het.atom("FE").unwrap().index, 10);
    }

    #[test]
    fn overlong_residue_name_is_rejected() {
        let mut het = heme_pair();

        let err = write_heterogen(Vec::new(), &mut het, "HEME", 1, 1).unwrap_err();

        assert!(matches!(
            err,
            Error::FieldTooWide {
                field: "residue name",
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let mut het = heme_pair();

        let err = write_heterogen(Vec::new(), &mut het, "HEM", 10000, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::FieldTooWide {
                field: "residue number",
                ..
            }
        ));

        let err = write_heterogen(Vec::new(), &mut het, "HEM", 1, 99_999).unwrap_err();
        assert!(matches!(err, Error::FieldTooWide { field: "serial", .. }));

        assert!(write_heterogen(Vec::new(), &mut het, "HEM", -999, 99_998).is_ok());
    }

    fn single_atom(pos: Point, occupancy: f64, temperature_factor: f64) -> Heterogen {
        let mut het = Heterogen::new("LIG");
        het.add_atom(
            "C1",
            Atom::new(7, "C", pos)
                .with_occupancy(occupancy)
                .with_temperature_factor(temperature_factor),
        );
        het
    }

    fn rejected_field(mut het: Heterogen) -> &'static str {
        let mut buffer = Vec::new();
        let err = write_heterogen(&mut buffer, &mut het, "LIG", 1, 1).unwrap_err();
        assert!(buffer.is_empty());
        assert_eq!(het.atom("C1").unwrap().index, 7);
        match err {
            Error::FieldTooWide { field, .. } => field,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn coordinates_wider_than_their_columns_are_rejected() {
        assert_eq!(
            rejected_field(single_atom(Point::new(-1000.5, 0.0, 0.0), 1.0, 0.0)),
            "x coordinate"
        );
        assert_eq!(
            rejected_field(single_atom(Point::new(0.0, 10000.0, 0.0), 1.0, 0.0)),
            "y coordinate"
        );
        assert_eq!(
            rejected_field(single_atom(Point::new(0.0, 0.0, -999.9996), 1.0, 0.0)),
            "z coordinate"
        );
    }

    #[test]
    fn occupancy_and_temperature_factor_wider_than_their_columns_are_rejected() {
        assert_eq!(
            rejected_field(single_atom(Point::origin(), 1000.0, 0.0)),
            "occupancy"
        );
        assert_eq!(
            rejected_field(single_atom(Point::origin(), 1.0, 1000.0)),
            "temperature factor"
        );
        assert_eq!(
            rejected_field(single_atom(Point::origin(), -100.0, 0.0)),
            "occupancy"
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert_eq!(
            rejected_field(single_atom(Point::new(f64::NAN, 0.0, 0.0), 1.0, 0.0)),
            "x coordinate"
        );
        assert_eq!(
            rejected_field(single_atom(Point::origin(), 1.0, f64::INFINITY)),
            "temperature factor"
        );
    }

    #[test]
    fn values_at_column_limits_keep_fixed_width() {
        let mut het = single_atom(Point::new(-999.999, 9999.999, 0.0), -99.99, 999.99);

        let (_, output) = write_to_string(&mut het, "LIG", 1, 1);
        let line = output.lines().next().unwrap();

        assert_eq!(
            line,
            "HETATM    1   C1 LIG     1    -999.9999999.999   0.000-99.99999.99         C  "
        );
        assert_hetatm_line(line, 1, "C1", "LIG", 1, (-999.999, 9999.999, 0.0), "C");
    }

    #[test]
    fn start_serial_overflow_is_rejected() {
        let mut het = heme_pair();

        let err = write_heterogen(Vec::new(), &mut het, "HEM", 1, usize::MAX).unwrap_err();

        assert!(matches!(err, Error::FieldTooWide { field: "serial", .. }));
        assert_eq!(het.atom("FE").unwrap().index, 10);
    }
}
