use std::path::PathBuf;

use beverage_nutrition::source::pdf_page_texts;
use beverage_nutrition::{find_header_row, tables_from_page_text};

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("starbucks_nutrition.pdf"));
    let pages = pdf_page_texts(&path)?;

    for (page_idx, text) in pages.iter().enumerate() {
        let tables = tables_from_page_text(text);
        println!("=== Page {} ({} table(s)) ===", page_idx + 1, tables.len());
        for (table_idx, table) in tables.iter().enumerate() {
            match find_header_row(table) {
                Some(header) => println!("  Table {}: header at row {header}", table_idx + 1),
                None => println!("  Table {}: no header, skipped", table_idx + 1),
            }
            for row in table.iter().filter(|row| !row.is_empty()) {
                let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
                println!("    {:?}", cells);
            }
        }
    }

    Ok(())
}
