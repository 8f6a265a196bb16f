//! Test-data workbook: row source and result sink.
//!
//! The first worksheet (or a named one) holds two header rows, then data.
//! Header names on the header row identify the input columns; results go to
//! fixed note columns addressed by letter. Every write reopens the file,
//! patches the cells and saves the whole workbook back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use umya_spreadsheet::{Border, Spreadsheet, Style, Worksheet};

use crate::outcome::{Highlight, NoteColumn};
use crate::result::{MarkcheckError, MarkcheckResult};
use crate::row::TestRow;
use crate::sink::{merge_note, Note, ResultSink};

/// Highest column Excel addresses (XFD)
pub const MAX_COLUMN: u32 = 16_384;

const GOOD_FILL_ARGB: &str = "FF00FF00";
const BORDER_ARGB: &str = "FF000000";

/// Header names of the input columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderNames {
    /// Expected product name
    pub product_name: String,
    /// Expected color
    pub color: String,
    /// Expected sizes
    pub sizes: String,
    /// Expected regular price
    pub regular_price: String,
    /// Expected markdown price
    pub markdown_price: String,
    /// Category class
    pub class: String,
    /// Fallback product ID
    pub product_id: String,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            product_name: "Product Name".to_string(),
            color: "Color".to_string(),
            sizes: "Sizes".to_string(),
            regular_price: "Regular Price".to_string(),
            markdown_price: "Markdown Price".to_string(),
            class: "Class".to_string(),
            product_id: "Markdown Product ID".to_string(),
        }
    }
}

/// Column letters of the note columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteColumns {
    /// General comments
    pub comment: String,
    /// Catalog operations
    pub catalog_ops: String,
    /// Size notes
    pub size_notes: String,
    /// Price notes
    pub price_notes: String,
    /// Photo notes
    pub photo_notes: String,
}

impl Default for NoteColumns {
    fn default() -> Self {
        Self {
            comment: "M".to_string(),
            catalog_ops: "N".to_string(),
            size_notes: "O".to_string(),
            price_notes: "P".to_string(),
            photo_notes: "Q".to_string(),
        }
    }
}

impl NoteColumns {
    /// Letter for `column`
    #[must_use]
    pub fn letter(&self, column: NoteColumn) -> &str {
        match column {
            NoteColumn::Comment => &self.comment,
            NoteColumn::CatalogOps => &self.catalog_ops,
            NoteColumn::SizeNotes => &self.size_notes,
            NoteColumn::PriceNotes => &self.price_notes,
            NoteColumn::PhotoNotes => &self.photo_notes,
        }
    }
}

/// Where things live in the workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookLayout {
    /// Path to the .xlsx file
    pub path: PathBuf,
    /// Worksheet name (first sheet when absent)
    pub sheet: Option<String>,
    /// Row holding the header names
    pub header_row: u32,
    /// First data row
    pub first_data_row: u32,
    /// Input column headers
    pub headers: HeaderNames,
    /// Note column letters
    pub columns: NoteColumns,
    /// Column of the price cell that gets highlighted
    pub highlight_column: String,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        Self {
            path: PathBuf::from("testdata/markdown.xlsx"),
            sheet: None,
            header_row: 2,
            first_data_row: 3,
            headers: HeaderNames::default(),
            columns: NoteColumns::default(),
            highlight_column: "H".to_string(),
        }
    }
}

impl WorkbookLayout {
    /// Reject layouts that cannot address cells
    pub fn validate(&self) -> MarkcheckResult<()> {
        if self.header_row == 0 || self.first_data_row <= self.header_row {
            return Err(MarkcheckError::config(format!(
                "data rows must start after the header row (header {}, data {})",
                self.header_row, self.first_data_row
            )));
        }
        for column in NoteColumn::ALL {
            column_number(self.columns.letter(column))?;
        }
        column_number(&self.highlight_column)?;
        Ok(())
    }
}

/// Convert a column letter ("E", "AA") to its 1-based number, capped at XFD
pub fn column_number(letters: &str) -> MarkcheckResult<u32> {
    if letters.is_empty() {
        return Err(MarkcheckError::config("empty column letter"));
    }
    let mut n: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_uppercase() {
            return Err(MarkcheckError::config(format!(
                "invalid column letter: {letters:?}"
            )));
        }
        n = n.saturating_mul(26).saturating_add(u32::from(c) - u32::from('A') + 1);
    }
    Ok(n.min(MAX_COLUMN))
}

fn open(path: &Path) -> MarkcheckResult<Spreadsheet> {
    umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| MarkcheckError::workbook(format!("cannot read {}: {e}", path.display())))
}

fn save(book: &Spreadsheet, path: &Path) -> MarkcheckResult<()> {
    umya_spreadsheet::writer::xlsx::write(book, path)
        .map_err(|e| MarkcheckError::workbook(format!("cannot write {}: {e}", path.display())))
}

fn worksheet<'a>(book: &'a Spreadsheet, name: Option<&str>) -> MarkcheckResult<&'a Worksheet> {
    match name {
        Some(name) => book.get_sheet_by_name(name),
        None => book.get_sheet(&0),
    }
    .ok_or_else(|| MarkcheckError::workbook(format!("worksheet not found: {}", name.unwrap_or("#0"))))
}

fn worksheet_mut<'a>(
    book: &'a mut Spreadsheet,
    name: Option<&str>,
) -> MarkcheckResult<&'a mut Worksheet> {
    match name {
        Some(name) => book.get_sheet_by_name_mut(name),
        None => book.get_sheet_mut(&0),
    }
    .ok_or_else(|| MarkcheckError::workbook(format!("worksheet not found: {}", name.unwrap_or("#0"))))
}

fn cell_text(sheet: &Worksheet, col: u32, row: u32) -> String {
    sheet
        .get_cell((col, row))
        .map(|c| c.get_value().trim().to_string())
        .unwrap_or_default()
}

// =============================================================================
// READER
// =============================================================================

/// Reads test rows from the data region
#[derive(Debug, Clone)]
pub struct WorkbookReader {
    layout: WorkbookLayout,
}

impl WorkbookReader {
    /// Create a reader
    pub fn new(layout: WorkbookLayout) -> MarkcheckResult<Self> {
        layout.validate()?;
        Ok(Self { layout })
    }

    /// Raw value of the cell under `header` on data row `row_number` (1-based)
    pub fn read_cell(&self, header: &str, row_number: u32) -> MarkcheckResult<Option<String>> {
        let book = open(&self.layout.path)?;
        let sheet = worksheet(&book, self.layout.sheet.as_deref())?;
        let headers = self.header_map(sheet);
        Ok(headers.get(header).map(|col| {
            cell_text(sheet, *col, self.layout.first_data_row + row_number - 1)
        }))
    }

    /// Every non-empty data row
    pub fn rows(&self) -> MarkcheckResult<Vec<TestRow>> {
        let book = open(&self.layout.path)?;
        let sheet = worksheet(&book, self.layout.sheet.as_deref())?;
        let columns = self.input_columns(sheet)?;
        let last = sheet.get_highest_row();
        let rows: Vec<TestRow> = (self.layout.first_data_row..=last)
            .filter_map(|sheet_row| {
                let row = columns.read(sheet, sheet_row, sheet_row - self.layout.first_data_row + 1);
                (!row.expected_product_name.is_empty() || !row.markdown_product_id.is_empty())
                    .then_some(row)
            })
            .collect();
        info!(path = %self.layout.path.display(), rows = rows.len(), "loaded test rows");
        Ok(rows)
    }

    /// One data row, `None` when it is empty or past the end
    pub fn row(&self, row_number: u32) -> MarkcheckResult<Option<TestRow>> {
        Ok(self
            .rows()?
            .into_iter()
            .find(|r| r.row_number == row_number))
    }

    fn header_map(&self, sheet: &Worksheet) -> HashMap<String, u32> {
        (1..=sheet.get_highest_column())
            .map(|col| (cell_text(sheet, col, self.layout.header_row), col))
            .filter(|(name, _)| !name.is_empty())
            .collect()
    }

    fn input_columns(&self, sheet: &Worksheet) -> MarkcheckResult<InputColumns> {
        let map = self.header_map(sheet);
        let h = &self.layout.headers;
        let find = |name: &str| {
            map.get(name).copied().ok_or_else(|| {
                MarkcheckError::workbook(format!(
                    "header {name:?} not found on row {}",
                    self.layout.header_row
                ))
            })
        };
        Ok(InputColumns {
            product_name: find(&h.product_name)?,
            color: find(&h.color)?,
            sizes: find(&h.sizes)?,
            regular_price: find(&h.regular_price)?,
            markdown_price: find(&h.markdown_price)?,
            class: find(&h.class)?,
            product_id: find(&h.product_id)?,
        })
    }
}

struct InputColumns {
    product_name: u32,
    color: u32,
    sizes: u32,
    regular_price: u32,
    markdown_price: u32,
    class: u32,
    product_id: u32,
}

impl InputColumns {
    fn read(&self, sheet: &Worksheet, sheet_row: u32, row_number: u32) -> TestRow {
        TestRow {
            row_number,
            expected_product_name: cell_text(sheet, self.product_name, sheet_row),
            expected_color: cell_text(sheet, self.color, sheet_row),
            expected_sizes: cell_text(sheet, self.sizes, sheet_row),
            expected_regular_price: cell_text(sheet, self.regular_price, sheet_row),
            expected_markdown_price: cell_text(sheet, self.markdown_price, sheet_row),
            category_class: cell_text(sheet, self.class, sheet_row),
            markdown_product_id: cell_text(sheet, self.product_id, sheet_row),
        }
    }
}

// =============================================================================
// SINK
// =============================================================================

/// Result sink writing notes back into the workbook
#[derive(Debug, Clone)]
pub struct WorkbookSink {
    layout: WorkbookLayout,
}

impl WorkbookSink {
    /// Create a sink
    pub fn new(layout: WorkbookLayout) -> MarkcheckResult<Self> {
        layout.validate()?;
        Ok(Self { layout })
    }

    /// Clear the note columns and the price highlight of every data row
    pub fn reset(&self) -> MarkcheckResult<u32> {
        let mut book = open(&self.layout.path)?;
        let sheet = worksheet_mut(&mut book, self.layout.sheet.as_deref())?;
        let note_cols: Vec<u32> = NoteColumn::ALL
            .iter()
            .map(|c| column_number(self.layout.columns.letter(*c)))
            .collect::<MarkcheckResult<_>>()?;
        let highlight_col = column_number(&self.layout.highlight_column)?;
        let last = sheet.get_highest_row();
        let mut cleared = 0;
        for row in self.layout.first_data_row..=last {
            for col in &note_cols {
                if sheet.get_cell((*col, row)).is_some() {
                    sheet.get_cell_mut((*col, row)).set_value("");
                }
            }
            if sheet.get_cell((highlight_col, row)).is_some() {
                sheet.get_cell_mut((highlight_col, row)).set_style(Style::default());
            }
            cleared += 1;
        }
        save(&book, &self.layout.path)?;
        info!(rows = cleared, "cleared previous results");
        Ok(cleared)
    }
}

impl ResultSink for WorkbookSink {
    fn record(&mut self, sheet_row: u32, note: &Note) -> MarkcheckResult<()> {
        let letter = self.layout.columns.letter(note.column);
        let col = column_number(letter)?;
        let mut book = open(&self.layout.path)?;
        let sheet = worksheet_mut(&mut book, self.layout.sheet.as_deref())?;

        let existing = cell_text(sheet, col, sheet_row);
        sheet
            .get_cell_mut((col, sheet_row))
            .set_value(merge_note(&existing, &note.message));

        if let Some(highlight) = note.highlight {
            let price_col = column_number(&self.layout.highlight_column)?;
            apply_highlight(sheet, price_col, sheet_row, highlight);
        }

        save(&book, &self.layout.path)?;
        debug!(cell = %format!("{letter}{sheet_row}"), "note written");
        Ok(())
    }
}

fn apply_highlight(sheet: &mut Worksheet, col: u32, row: u32, highlight: Highlight) {
    sheet.get_cell_mut((col, row)).set_style(Style::default());
    let style = sheet.get_style_mut((col, row));
    let borders = style.get_borders_mut();
    for side in 0..4 {
        let border = match side {
            0 => borders.get_top_mut(),
            1 => borders.get_bottom_mut(),
            2 => borders.get_left_mut(),
            _ => borders.get_right_mut(),
        };
        border.set_border_style(Border::BORDER_THICK);
        border.get_color_mut().set_argb(BORDER_ARGB);
    }
    if highlight == Highlight::Good {
        style.set_background_color(GOOD_FILL_ARGB);
        style.get_font_mut().set_bold(true);
    }
}
