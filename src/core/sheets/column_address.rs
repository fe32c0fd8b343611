// Column letters <-> zero-based column index.
//
// Spreadsheet columns count in base 26 with no zero digit: A=1 .. Z=26,
// AA=27, and so on. Everything downstream works with zero-based indices.

use super::pivot_models::{ColumnRef, PivotError};

/// Converts column letters (`"A"`, `"az"`, ...) to a zero-based index.
pub fn to_index(letters: &str) -> Result<u32, PivotError> {
    if letters.is_empty() {
        return Err(PivotError::InvalidFormat(
            "column letters must not be empty".to_string(),
        ));
    }

    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(PivotError::InvalidFormat(format!(
                "invalid column letters '{}'",
                letters
            )));
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .ok_or_else(|| {
                PivotError::InvalidFormat(format!("column letters '{}' are too long", letters))
            })?;
    }

    Ok(index - 1)
}

/// Converts a zero-based index back to upper-case column letters.
pub fn to_letters(index: u32) -> String {
    let mut n = index as u64 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Normalizes any column reference to a zero-based index.
///
/// No upper bound is enforced; the spreadsheet service rejects columns
/// beyond the sheet's grid.
pub fn resolve(column: &ColumnRef) -> Result<u32, PivotError> {
    match column {
        ColumnRef::Index(index) => Ok(*index),
        ColumnRef::Letters(letters) => to_index(letters),
    }
}
