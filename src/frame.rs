use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use anyhow::{bail, ensure, Context, Result};
use ndarray::Array2;

/// A single thermal frame: per-pixel temperatures indexed
/// by `(row, col)`.
///
/// Missing readings are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalFrame {
    values: Array2<f64>,
}

impl ThermalFrame {
    pub fn new(values: Array2<f64>) -> Self {
        ThermalFrame { values }
    }

    /// Read a frame from a comma separated file, one image
    /// row per line.
    ///
    /// Exporters (FLIR Tools, ResearchIR) prepend free-form
    /// header lines and may suffix each cell with a unit; lines
    /// without a single numeric cell are skipped and the
    /// leading float of each cell is used. Empty cells (and
    /// `nan`) read as `NaN`.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("could not open thermal csv `{}`", path.display()))?;
        Self::from_csv_reader(file)
            .with_context(|| format!("could not parse thermal csv `{}`", path.display()))
    }

    pub fn from_csv_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut width = None;
        let mut height = 0;
        let mut data = vec![];

        for (idx, line) in BufReader::new(rdr).lines().enumerate() {
            let line = line?;
            let cells: Vec<Cell> = line.split(',').map(parse::cell).collect();
            if !cells.iter().any(|c| matches!(c, Cell::Value(_))) {
                continue;
            }

            let row_width = cells.len();
            match width {
                None => width = Some(row_width),
                Some(w) => ensure!(
                    w == row_width,
                    "line {}: expected {} columns, found {}",
                    idx + 1,
                    w,
                    row_width
                ),
            }

            for (col, cell) in cells.into_iter().enumerate() {
                data.push(match cell {
                    Cell::Value(v) => v,
                    Cell::Missing => f64::NAN,
                    Cell::Invalid(s) => {
                        bail!("line {}, column {}: not a number: {:?}", idx + 1, col + 1, s)
                    }
                });
            }
            height += 1;
        }

        let width = match width {
            Some(w) => w,
            None => bail!("no data rows found"),
        };
        Ok(ThermalFrame {
            values: Array2::from_shape_vec((height, width), data)?,
        })
    }

    /// `(height, width)` of the frame.
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Smallest non-`NaN` value, if any.
    pub fn min(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
    }

    /// Largest non-`NaN` value, if any.
    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }
}

#[derive(Debug, PartialEq)]
enum Cell<'a> {
    Value(f64),
    Missing,
    Invalid(&'a str),
}

mod parse {
    use lazy_static::lazy_static;
    use regex::Regex;

    use super::Cell;

    pub(super) fn cell(raw: &str) -> Cell<'_> {
        lazy_static! {
            static ref RE: Regex =
                Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?").unwrap();
        }

        let s = raw.trim().trim_matches('"').trim();
        if s.is_empty() || s.eq_ignore_ascii_case("nan") {
            return Cell::Missing;
        }
        match RE.find(s).and_then(|m| m.as_str().parse().ok()) {
            Some(v) => Cell::Value(v),
            None => Cell::Invalid(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn reads_plain_grid() -> Result<()> {
        let frame = ThermalFrame::from_csv_reader("1,2,3\n4,5,6\n".as_bytes())?;
        assert_eq!(frame.dim(), (2, 3));
        assert_eq!(frame.values()[(1, 0)], 4.);
        assert_eq!(frame.min(), Some(1.));
        assert_eq!(frame.max(), Some(6.));
        Ok(())
    }

    #[test]
    fn skips_header_and_reads_suffixed_cells() -> Result<()> {
        let csv = "Frame 1\nTemperature,Unit\n\n 20.5C, 21°C ,-3.25e1\n22,23,24\n";
        let frame = ThermalFrame::from_csv_reader(csv.as_bytes())?;
        assert_eq!(frame.dim(), (2, 3));
        assert_eq!(frame.values()[(0, 0)], 20.5);
        assert_eq!(frame.values()[(0, 1)], 21.);
        assert_eq!(frame.values()[(0, 2)], -32.5);
        Ok(())
    }

    #[test]
    fn empty_cells_are_nan() -> Result<()> {
        let frame = ThermalFrame::from_csv_reader("1,,3\nnan,5,6\n".as_bytes())?;
        assert!(frame.values()[(0, 1)].is_nan());
        assert!(frame.values()[(1, 0)].is_nan());
        assert_eq!(frame.min(), Some(1.));
        Ok(())
    }

    #[test]
    fn ragged_rows_fail() {
        let err = ThermalFrame::from_csv_reader("1,2,3\n4,5\n".as_bytes()).unwrap_err();
        assert!(format!("{err}").contains("line 2"));
    }

    #[test]
    fn garbage_cell_in_data_row_fails() {
        assert!(ThermalFrame::from_csv_reader("1,abc,3\n".as_bytes()).is_err());
    }

    #[test]
    fn no_data_fails() {
        assert!(ThermalFrame::from_csv_reader("header only\n".as_bytes()).is_err());
        assert!(ThermalFrame::from_csv_reader("".as_bytes()).is_err());
    }

    #[test]
    fn all_nan_frame_has_no_range() {
        let frame = ThermalFrame::new(Array2::from_elem((2, 2), f64::NAN));
        assert_eq!(frame.min(), None);
        assert_eq!(frame.max(), None);
    }
}
