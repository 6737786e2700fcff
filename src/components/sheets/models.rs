use serde::{Deserialize, Serialize};

/// 1-based cell position, as shown in the spreadsheet UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub column: u32,
}

impl CellRef {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Cell `offset` columns to the right
    pub fn right(self, offset: u32) -> Self {
        Self::new(self.row, self.column + offset)
    }
}

/// Value written to a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellInput {
    /// Stored verbatim, never interpreted as a formula or number
    Raw(String),
    /// Parsed as if typed into the UI, so dates become date cells
    Parsed(String),
}

impl CellInput {
    pub fn text(&self) -> &str {
        match self {
            CellInput::Raw(text) | CellInput::Parsed(text) => text,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, CellInput::Parsed(_))
    }
}

/// Letters of a 1-based column: 1 → A, 26 → Z, 27 → AA
pub fn column_letter(column: u32) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Sheet name quoted for A1 notation
pub fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// A1 range of a single cell
pub fn cell_range(sheet: &str, cell: CellRef) -> String {
    format!(
        "{}!{}{}",
        quote_sheet(sheet),
        column_letter(cell.column),
        cell.row
    )
}

/// A1 range of `width` cells in `row`, starting at column A
pub fn row_range(sheet: &str, row: u32, width: u32) -> String {
    format!(
        "{}!A{}:{}{}",
        quote_sheet(sheet),
        row,
        column_letter(width.max(1)),
        row
    )
}

/// Open-ended A1 range of one column from `first_row` down
pub fn column_range(sheet: &str, column: u32, first_row: u32) -> String {
    let letter = column_letter(column);
    format!("{}!{}{}:{}", quote_sheet(sheet), letter, first_row, letter)
}
