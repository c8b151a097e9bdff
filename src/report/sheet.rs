use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// A rectangular table lifted from the first worksheet: the first populated
/// row is the header, every row is exactly `header.len()` columns wide.
#[derive(Debug, PartialEq, Eq)]
pub struct SheetTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn load_table(path: &Path) -> Result<SheetTable, String> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| format!("could not open spreadsheet: {}", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "spreadsheet has no sheets".to_string())?
        .map_err(|e| format!("could not read sheet: {}", e))?;

    let raw: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    normalize_rows(raw).ok_or_else(|| "spreadsheet has no populated rows".to_string())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Drop fully blank rows, measure each retained row up to its last non-blank
/// cell, and cut/pad every row to the widest retained width. `None` when no
/// populated row exists.
pub fn normalize_rows(raw: Vec<Vec<String>>) -> Option<SheetTable> {
    let retained: Vec<(Vec<String>, usize)> = raw
        .into_iter()
        .filter_map(|row| {
            let width = row.iter().rposition(|cell| !cell.is_empty())? + 1;
            Some((row, width))
        })
        .collect();

    let width = retained.iter().map(|(_, w)| *w).max()?;

    let mut rows = retained.into_iter().map(move |(mut row, _)| {
        row.truncate(width);
        row.resize(width, String::new());
        row
    });

    let header = rows.next()?;
    Some(SheetTable {
        header,
        rows: rows.collect(),
    })
}
