//! Tab-separated numeric tables.
//!
//! Format:
//! - one sample per line; field 0 is the row name, the rest are numbers
//! - a line starting with `#` is a header; the fields after the first one
//!   name the columns
//! - the column count is fixed by the header, or by the first data row when
//!   there is no header; rows of a different width are skipped, and a
//!   header of a different width after data rows is an error
//! - gzip-compressed input is accepted (see `stream::open_reader`)
use std::io::BufRead;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::data::stream::open_reader;
use crate::error::{Result, SannError};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub row_names: Vec<String>,
    /// Column names from the `#` header, if the table has one.
    pub col_names: Option<Vec<String>>,
    pub rows: Vec<Vec<f64>>,
    n_cols: usize,
}

impl Table {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reads a table from `path`; `-` reads stdin.
pub fn read_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let table = parse_table(open_reader(path)?)?;
    debug!(path = %path.display(), rows = table.n_rows(), cols = table.n_cols(), "read table");
    Ok(table)
}

/// Parses a table from any buffered reader.
pub fn parse_table<R: BufRead>(reader: R) -> Result<Table> {
    let mut table = Table::default();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        let line_no = line_idx + 1;
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('#') {
            let mut fields = header.split('\t');
            fields.next();
            let names: Vec<String> = fields.map(str::to_owned).collect();
            if names.is_empty() {
                continue;
            }
            if !table.rows.is_empty() && names.len() != table.n_cols {
                return Err(SannError::parse(format!(
                    "line {line_no}: header names {} columns but earlier rows have {}",
                    names.len(),
                    table.n_cols
                )));
            }
            table.n_cols = names.len();
            table.col_names = Some(names);
            continue;
        }

        let n_fields = line.split('\t').count() - 1;
        if table.n_cols == 0 && table.rows.is_empty() {
            table.n_cols = n_fields;
        }
        if n_fields != table.n_cols {
            warn!(line = line_no, found = n_fields, expected = table.n_cols, "skipping row with wrong column count");
            continue;
        }

        let mut fields = line.split('\t');
        let name = fields.next().unwrap_or_default().to_owned();
        let values = fields
            .enumerate()
            .map(|(col, cell)| parse_cell(cell, line_no, col + 1))
            .collect::<Result<Vec<f64>>>()?;

        table.row_names.push(name);
        table.rows.push(values);
    }

    Ok(table)
}

/// Shuffles the samples of `x`, and of `y` in the same order when given.
pub fn shuffle_together<R: Rng + ?Sized>(
    x: &mut Table,
    y: Option<&mut Table>,
    rng: &mut R,
) -> Result<()> {
    if let Some(y) = y.as_ref() {
        check_same_rows(x, y)?;
    }
    let mut order: Vec<usize> = (0..x.n_rows()).collect();
    order.shuffle(rng);

    permute(&mut x.rows, &order);
    permute(&mut x.row_names, &order);
    if let Some(y) = y {
        permute(&mut y.rows, &order);
        permute(&mut y.row_names, &order);
    }
    Ok(())
}

/// Errors unless the two tables hold the same number of samples.
pub fn check_same_rows(x: &Table, y: &Table) -> Result<()> {
    if x.n_rows() != y.n_rows() {
        return Err(SannError::shape(format!(
            "input has {} rows but output has {}",
            x.n_rows(),
            y.n_rows()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn parse_cell(cell: &str, line_no: usize, col: usize) -> Result<f64> {
    cell.trim().parse::<f64>().map_err(|_| {
        SannError::parse(format!("line {line_no}, column {col}: '{cell}' is not a valid number"))
    })
}

fn permute<T: Clone>(items: &mut Vec<T>, order: &[usize]) {
    let permuted: Vec<T> = order.iter().map(|&i| items[i].clone()).collect();
    *items = permuted;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Table> {
        parse_table(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn reads_header_names_and_rows() {
        let t = parse("#sample\ta\tb\nr1\t1\t2.5\nr2\t-3\t1e-2\n").unwrap();
        assert_eq!(t.col_names, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(t.row_names, vec!["r1", "r2"]);
        assert_eq!(t.rows, vec![vec![1.0, 2.5], vec![-3.0, 0.01]]);
        assert_eq!(t.n_cols(), 2);
    }

    #[test]
    fn width_comes_from_first_row_without_header() {
        let t = parse("r1\t1\t2\nr2\t3\nr3\t4\t5\n").unwrap();
        assert_eq!(t.col_names, None);
        assert_eq!(t.row_names, vec!["r1", "r3"]);
        assert_eq!(t.n_cols(), 2);
    }

    #[test]
    fn header_without_tabs_is_a_comment() {
        let t = parse("# just a comment\nr1\t0\n").unwrap();
        assert_eq!(t.col_names, None);
        assert_eq!(t.n_rows(), 1);
    }

    #[test]
    fn strips_carriage_returns() {
        let t = parse("r1\t1\r\nr2\t2\r\n").unwrap();
        assert_eq!(t.rows, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn bad_number_reports_position() {
        let err = parse("r1\t1\tx\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 1, column 2"), "{msg}");
    }

    #[test]
    fn shuffle_keeps_pairs_aligned() {
        let mut x = parse("a\t1\nb\t2\nc\t3\nd\t4\ne\t5\n").unwrap();
        let mut y = parse("a\t10\nb\t20\nc\t30\nd\t40\ne\t50\n").unwrap();
        shuffle_together(&mut x, Some(&mut y), &mut StdRng::seed_from_u64(11)).unwrap();
        for (xr, yr) in x.rows.iter().zip(y.rows.iter()) {
            assert_eq!(xr[0] * 10.0, yr[0]);
        }
        assert_eq!(x.row_names, y.row_names);
    }

    #[test]
    fn shuffle_rejects_mismatched_tables() {
        let mut x = parse("a\t1\nb\t2\n").unwrap();
        let mut y = parse("a\t1\n").unwrap();
        let res = shuffle_together(&mut x, Some(&mut y), &mut StdRng::seed_from_u64(1));
        assert!(matches!(res, Err(SannError::Shape(_))));
    }

    #[test]
    fn late_header_must_match_row_width() {
        let err = parse("r1\t1\t2\n#s\ta\tb\tc\nr2\t1\t2\t3\n").unwrap_err();
        assert!(matches!(err, SannError::Parse(_)));
        assert!(err.to_string().contains("line 2"), "{err}");

        let t = parse("r1\t1\t2\n#s\ta\tb\nr2\t3\t4\n").unwrap();
        assert_eq!(t.col_names, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(t.rows.iter().all(|r| r.len() == t.n_cols()));
    }
}
