//! Row sources for the import pipeline.
//!
//! A [`RowSource`] yields every data row of its input in order. The
//! spreadsheet source reads the workbook exported from the chord archive:
//! a header row followed by rows of title, artist, original key and chord
//! sheet, always in that column order.

use std::path::PathBuf;

use calamine::{Data, Range, Reader, open_workbook_auto};
use tracing::{debug, info};

use crate::error::{Error, Result, ResultExt};
use crate::model::RawRow;

/// Number of leading columns that carry song data.
pub const SONG_COLUMNS: usize = 4;

/// Something that can produce raw song rows.
pub trait RowSource {
    /// Read all rows in source order.
    fn read_rows(&mut self) -> Result<Vec<RawRow>>;
}

impl RowSource for Vec<RawRow> {
    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        Ok(std::mem::take(self))
    }
}

/// Reads rows from the first (or a named) worksheet of a workbook.
///
/// Supports every format `calamine` understands (xlsx, xlsm, xls, ods).
#[derive(Debug, Clone)]
pub struct SpreadsheetSource {
    path: PathBuf,
    sheet: Option<String>,
}

impl SpreadsheetSource {
    pub fn new(path: impl Into<PathBuf>, sheet: Option<String>) -> Self {
        Self {
            path: path.into(),
            sheet,
        }
    }
}

impl RowSource for SpreadsheetSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>> {
        if !self.path.is_file() {
            return Err(Error::not_found(&self.path));
        }

        let mut workbook = open_workbook_auto(&self.path)
            .map_err(Error::from)
            .with_context(format!("opening {}", self.path.display()))?;

        let range = match &self.sheet {
            Some(name) => workbook.worksheet_range(name).map_err(Error::from)?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| Error::invalid_format(&self.path, "workbook has no sheets"))?
                .map_err(Error::from)?,
        };

        let rows = rows_from_range(&range);
        info!(
            target: "source",
            path = %self.path.display(),
            rows = rows.len(),
            "Read spreadsheet"
        );
        Ok(rows)
    }
}

/// Convert a worksheet range into rows, dropping the header row.
///
/// A range only covers the used cells, so it may start below the first
/// sheet row or right of the first column. Rows and columns are resolved
/// against absolute sheet positions: sheet row 0 is the header and sheet
/// column 0 is the title.
pub fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let leading = start_col as usize;

    range
        .rows()
        .enumerate()
        .filter(|(offset, cells)| {
            let is_header = start_row as usize + offset == 0;
            if is_header {
                debug!(target: "source", columns = cells.len(), "Discarding header row");
            }
            !is_header
        })
        .map(|(_, cells)| {
            let cells = std::iter::repeat_n(None, leading).chain(cells.iter().map(cell_text));
            RawRow::from_cells(cells.take(SONG_COLUMNS))
        })
        .collect()
}

/// Text of a single cell, or `None` when the cell holds nothing usable.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
