// A1-notation range parsing.
//
// Accepted shapes:
//   A1:E100          cells on the default sheet
//   Sheet1!A1:E100   cells on a named sheet
//   'My Sheet'!B2    quoted sheet name, single cell
//   A:E              whole columns (rows run to UNBOUNDED_END_ROW)

use super::column_address;
use super::pivot_models::PivotError;

/// End row used when a reference has no row digits ("A:E").
///
/// This is a fixed stand-in for "to the end of the data", not the real sheet
/// extent.
pub const UNBOUNDED_END_ROW: u32 = 1000;

/// A parsed rectangle. Starts are inclusive, ends exclusive, all zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    /// Empty when the range did not name a sheet.
    pub sheet_name: String,
    pub start_col: u32,
    pub start_row: u32,
    pub end_col: u32,
    pub end_row: u32,
}

/// A single `A12`-style reference: column index plus optional 1-based row.
struct CellRef {
    col: u32,
    row: Option<u32>,
}

pub fn parse(range: &str) -> Result<RangeSpec, PivotError> {
    let (sheet_name, cells) = match range.rsplit_once('!') {
        Some((sheet, cells)) => (strip_quotes(sheet.trim()), cells.trim()),
        None => (String::new(), range.trim()),
    };
    if sheet_name.is_empty() && range.contains('!') {
        return Err(PivotError::InvalidFormat(format!(
            "range '{}' has an empty sheet name",
            range
        )));
    }

    let (start_ref, end_ref) = cells.split_once(':').unwrap_or((cells, cells));

    let start = parse_cell_ref(start_ref, range)?;
    let end = parse_cell_ref(end_ref, range)?;

    let start_row = match start.row {
        Some(row) => row - 1,
        None => 0,
    };
    let end_row = end.row.unwrap_or(UNBOUNDED_END_ROW);
    let end_col = end.col + 1;

    // Reversed bounds are rejected rather than swapped.
    if end_col <= start.col || end_row <= start_row {
        return Err(PivotError::InvalidFormat(format!(
            "range '{}' ends before it starts",
            range
        )));
    }

    Ok(RangeSpec {
        sheet_name,
        start_col: start.col,
        start_row,
        end_col,
        end_row,
    })
}

fn strip_quotes(sheet: &str) -> String {
    let sheet = sheet.strip_prefix('\'').unwrap_or(sheet);
    let sheet = sheet.strip_suffix('\'').unwrap_or(sheet);
    sheet.to_string()
}

/// Matches `^([A-Za-z]+)(\d*)$`.
fn parse_cell_ref(reference: &str, range: &str) -> Result<CellRef, PivotError> {
    let invalid = || {
        PivotError::InvalidFormat(format!(
            "invalid cell reference '{}' in range '{}'",
            reference, range
        ))
    };

    let split_at = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(reference.len());
    let (letters, digits) = reference.split_at(split_at);

    if letters.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let col = column_address::to_index(letters)?;
    let row = if digits.is_empty() {
        None
    } else {
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }
        Some(row)
    };

    Ok(CellRef { col, row })
}
