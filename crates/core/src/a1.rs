//! A1 range addressing for spreadsheet reads and writes.
//!
//! Records are addressed by their zero-based index below the header row, so
//! record `i` lives on spreadsheet row `i + 2`. Column letters are single
//! letters only: `A` is column 0 and `Z` is the last addressable column.
//! Sheet names are always quoted, so a tab named like a cell (`Q1`) is never
//! read as a cell reference.

use crate::error::{StoreError, StoreResult};
use std::fmt;

/// Number of spreadsheet rows above the first record (the header row), plus
/// one for 1-based row numbering.
pub const RECORD_ROW_OFFSET: usize = 2;

/// Highest column count a single-letter range can span.
pub const MAX_COLUMNS: usize = 26;

/// Convert a 0-based column index to its column letter.
/// 0=A, 1=B, ... 25=Z. Anything wider is rejected.
pub fn column_letter(index: usize) -> StoreResult<char> {
    if index >= MAX_COLUMNS {
        return Err(StoreError::ColumnOutOfRange { index });
    }
    Ok(char::from(b'A' + index as u8))
}

/// Spreadsheet row number (1-based) of the record at `row_index`.
pub fn record_row(row_index: usize) -> usize {
    row_index + RECORD_ROW_OFFSET
}

/// Quote a sheet name for use in a range. Embedded quotes are doubled.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Range covering a whole sheet (e.g. `'Gelirler'`).
pub fn sheet_range(sheet: &str) -> String {
    quote_sheet_name(sheet)
}

/// Range covering only the header row (e.g. `'Gelirler'!1:1`).
pub fn header_range(sheet: &str) -> String {
    format!("{}!1:1", quote_sheet_name(sheet))
}

/// Range of whole columns `first..=last` (e.g. `'Gelirler'!A:E`).
pub fn columns_range(sheet: &str, first: usize, last: usize) -> StoreResult<String> {
    Ok(format!(
        "{}!{}:{}",
        quote_sheet_name(sheet),
        column_letter(first)?,
        column_letter(last)?
    ))
}

/// Single-cell range (e.g. `'Gelirler'!A1`), `row` being 1-based.
pub fn cell_range(sheet: &str, col: usize, row: usize) -> StoreResult<String> {
    Ok(format!(
        "{}!{}{}",
        quote_sheet_name(sheet),
        column_letter(col)?,
        row
    ))
}

/// Range of the record at `row_index` spanning `width` columns starting at A
/// (e.g. record 3 with 5 values is `'Gelirler'!A5:E5`).
pub fn record_range(sheet: &str, row_index: usize, width: usize) -> StoreResult<String> {
    if width == 0 {
        return Err(StoreError::invalid_input("record range must span at least one column"));
    }
    let row = record_row(row_index);
    Ok(format!(
        "{}!A{row}:{}{row}",
        quote_sheet_name(sheet),
        column_letter(width - 1)?
    ))
}

/// One end of a parsed range. Either part may be open (`A` or `5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    /// 0-based row, `None` for a whole-column bound.
    pub row: Option<usize>,
    /// 0-based column, `None` for a whole-row bound.
    pub col: Option<usize>,
}

/// A parsed `Sheet!A1:B2` style range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    /// `None` when the range names the whole sheet.
    pub start: Option<Bound>,
    pub end: Option<Bound>,
}

impl A1Range {
    /// Parse a range string as produced by the helpers in this module.
    pub fn parse(notation: &str) -> StoreResult<Self> {
        let (sheet, rest) = split_sheet_name(notation)?;
        let Some(cells) = rest else {
            return Ok(A1Range {
                sheet,
                start: None,
                end: None,
            });
        };

        let (start, end) = match cells.split_once(':') {
            Some((a, b)) => (parse_bound(a)?, Some(parse_bound(b)?)),
            None => (parse_bound(cells)?, None),
        };

        Ok(A1Range {
            sheet,
            start: Some(start),
            end,
        })
    }

    /// First 0-based column covered by the range.
    pub fn first_col(&self) -> usize {
        self.start.and_then(|b| b.col).unwrap_or(0)
    }

    /// First 0-based row covered by the range.
    pub fn first_row(&self) -> usize {
        self.start.and_then(|b| b.row).unwrap_or(0)
    }

    /// Last 0-based row covered, `None` when the range is open downwards.
    pub fn last_row(&self) -> Option<usize> {
        match (self.start, self.end) {
            (_, Some(end)) => end.row,
            (Some(start), None) => start.row,
            (None, None) => None,
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_sheet_name(&self.sheet))?;
        if let Some(start) = self.start {
            write!(f, "!{}", format_bound(start))?;
            if let Some(end) = self.end {
                write!(f, ":{}", format_bound(end))?;
            }
        }
        Ok(())
    }
}

fn format_bound(bound: Bound) -> String {
    let mut out = String::new();
    if let Some(col) = bound.col {
        out.push_str(&column_index_to_letters(col));
    }
    if let Some(row) = bound.row {
        out.push_str(&(row + 1).to_string());
    }
    out
}

fn split_sheet_name(notation: &str) -> StoreResult<(String, Option<&str>)> {
    let invalid = || StoreError::invalid_input(format!("invalid range: {notation}"));

    if let Some(quoted) = notation.strip_prefix('\'') {
        let mut name = String::new();
        let mut chars = quoted.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '\'' {
                name.push(c);
                continue;
            }
            if matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                name.push('\'');
                continue;
            }
            let rest = &quoted[i + 1..];
            return match rest.strip_prefix('!') {
                Some(cells) => Ok((name, Some(cells))),
                None if rest.is_empty() => Ok((name, None)),
                None => Err(invalid()),
            };
        }
        return Err(invalid());
    }

    match notation.split_once('!') {
        Some((name, cells)) if !name.is_empty() => Ok((name.to_string(), Some(cells))),
        Some(_) => Err(invalid()),
        None if notation.is_empty() => Err(invalid()),
        None => Ok((notation.to_string(), None)),
    }
}

/// Parse `A`, `5`, or `A5` into a bound (0-based).
fn parse_bound(notation: &str) -> StoreResult<Bound> {
    let invalid = || StoreError::invalid_input(format!("invalid cell reference: {notation}"));

    let upper = notation.to_ascii_uppercase();
    let split_pos = upper
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(upper.len());
    let (col_part, row_part) = upper.split_at(split_pos);

    if col_part.is_empty() && row_part.is_empty() {
        return Err(invalid());
    }

    let col = if col_part.is_empty() {
        None
    } else {
        Some(parse_column_letters(col_part).ok_or_else(invalid)?)
    };
    let row = if row_part.is_empty() {
        None
    } else {
        let n = row_part.parse::<usize>().map_err(|_| invalid())?;
        if n == 0 {
            return Err(invalid());
        }
        Some(n - 1)
    };

    Ok(Bound { row, col })
}

/// Convert column letters to a 0-based column index.
/// A=0, B=1, ... Z=25, AA=26, ...
fn parse_column_letters(col_str: &str) -> Option<usize> {
    let mut col = 0usize;
    for b in col_str.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        col = col * 26 + (b - b'A') as usize + 1;
    }
    col.checked_sub(1)
}

/// Convert a 0-based column index to column letters for display of parsed
/// ranges. Writes always go through [`column_letter`].
fn column_index_to_letters(mut col: usize) -> String {
    let mut result = String::new();
    col += 1;
    while col > 0 {
        col -= 1;
        result.insert(0, ((col % 26) as u8 + b'A') as char);
        col /= 26;
    }
    result
}
