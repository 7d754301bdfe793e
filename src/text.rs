/// Collapse every run of whitespace (newlines included) into one space and trim.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Like [`clean`], for cells the table extractor left empty.
pub fn clean_cell(cell: Option<&str>) -> String {
    cell.map(clean).unwrap_or_default()
}
