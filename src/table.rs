use std::sync::LazyLock;

use regex::Regex;

use crate::fields::known_size;
use crate::record::classify_header;
use crate::text::{clean, clean_cell};

/// One table as handed over by a PDF table extractor: rows of optional cells.
pub type RawTable = Vec<Vec<Option<String>>>;

static CELL_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t+| {2,}").unwrap());

/// First-column labels the nutrition PDF uses as section dividers inside its tables.
pub const SECTION_LABELS: &[&str] = &[
    "Espresso Drinks",
    "Cold Coffee",
    "Hot Chocolates",
    "Frappuccino",
    "Refreshment",
    "Hot Teas",
    "Tea Latte",
];

const HEADER_KEYWORDS: &[&str] = &["kcal", "energy"];

pub fn is_header_row(row: &[Option<String>]) -> bool {
    row.iter().flatten().any(|cell| {
        let lower = cell.to_lowercase();
        HEADER_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
    })
}

/// Index of the first row that looks like a nutrition header, if any.
pub fn find_header_row(table: &[Vec<Option<String>>]) -> Option<usize> {
    table.iter().position(|row| is_header_row(row))
}

/// Cleaned header cells of the row at `header_index`.
pub fn header_cells(table: &[Vec<Option<String>>], header_index: usize) -> Vec<String> {
    table
        .get(header_index)
        .map(|row| row.iter().map(|cell| clean_cell(cell.as_deref())).collect())
        .unwrap_or_default()
}

/// Rows after the header that can carry a drink, with every cell cleaned.
pub fn select_data_rows(table: &[Vec<Option<String>>], header_index: usize) -> Vec<Vec<String>> {
    table
        .iter()
        .skip(header_index + 1)
        .filter_map(|row| {
            let cells: Vec<String> = row.iter().map(|cell| clean_cell(cell.as_deref())).collect();
            if cells.iter().all(|cell| cell.is_empty()) {
                return None;
            }
            let first = cells.first()?;
            if first.chars().count() < 3 || SECTION_LABELS.contains(&first.as_str()) {
                return None;
            }
            Some(cells)
        })
        .collect()
}

/// Whether a line is a column header row rather than a drink that happens to
/// mention energy: it must name at least two nutrients and no cup size.
pub fn is_column_header(row: &[Option<String>]) -> bool {
    if !is_header_row(row) {
        return false;
    }
    let cells: Vec<&str> = row.iter().flatten().map(String::as_str).collect();
    let nutrients = cells.iter().filter(|cell| classify_header(cell).is_some()).count();
    nutrients >= 2 && !cells.iter().any(|cell| known_size(cell).is_some())
}

fn split_line(line: &str) -> Vec<Option<String>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    CELL_SEPARATOR_RE
        .split(trimmed)
        .map(|cell| {
            let cell = clean(cell);
            (!cell.is_empty()).then_some(cell)
        })
        .collect()
}

/// Rebuild tables from the plain text of one PDF page.
///
/// Cells are separated by tabs or runs of two or more spaces. Every column
/// header line opens a new table, so the repeated per-section headers of the
/// document split a page into its sections. Lines before the first header end
/// up in a headerless table that the classifier skips.
pub fn tables_from_page_text(text: &str) -> Vec<RawTable> {
    let mut tables: Vec<RawTable> = Vec::new();
    for line in text.lines() {
        let row = split_line(line);
        if is_column_header(&row) || tables.is_empty() {
            tables.push(Vec::new());
        }
        if let Some(table) = tables.last_mut() {
            table.push(row);
        }
    }
    tables
}
